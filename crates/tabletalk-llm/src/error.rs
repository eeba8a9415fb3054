use tabletalk_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Network error talking to {service}: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {service}: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
