//! Clients for the external collaborators tabletalk talks to: an
//! OpenAI-compatible text-completion endpoint (used to write report
//! headings) and a remote data-analysis agent.
//!
//! Every call is a single blocking request/response. Failures are returned
//! as [`LlmError`] and never discarded.

pub mod agent;
pub mod completion;
pub mod error;
pub mod heading;

pub use agent::{Agent, AgentRequest, HttpAgent, ANALYST_INSTRUCTIONS};
pub use completion::{ChatCompletionClient, Completion};
pub use error::LlmError;
pub use heading::HeadingGenerator;
