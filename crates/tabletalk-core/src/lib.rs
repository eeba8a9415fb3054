//! Core data model for tabletalk.
//!
//! Holds the conversation log, the tagged answer types produced by the agent
//! boundary, the question/answer classifiers, dataset loading and settings.

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use error::CoreError;
