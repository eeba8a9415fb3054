pub mod conversation;
pub mod session_file;

pub use conversation::{flatten, ConversationStore};
pub use session_file::{SessionFile, SessionId};
