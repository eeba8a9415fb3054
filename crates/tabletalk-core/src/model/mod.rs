pub mod answer;
pub mod dataset;
pub mod turn;

pub use answer::{Answer, AnswerKind, Table};
pub use dataset::Dataset;
pub use turn::{Message, Turn};
