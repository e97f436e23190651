use thiserror::Error;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Channel closed before a terminal event arrived")]
    PrematureClose,

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Failed to encode event: {0}")]
    Encode(serde_json::Error),

    #[error("Malformed JSON in response: {0}")]
    MalformedJson(serde_json::Error),

    #[error("Response does not match the {schema} schema: {problems}")]
    SchemaViolation {
        schema: &'static str,
        problems: String,
    },

    #[error("Empty response from remote")]
    EmptyResponse,

    #[error("Session cannot {op} while {state}")]
    BadState {
        op: &'static str,
        state: &'static str,
    },

    #[error("All {attempts} attempts failed; last error: {last}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: Box<WireError>,
    },
}

pub type WireResult<T> = Result<T, WireError>;
