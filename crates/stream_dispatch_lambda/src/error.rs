use stream_dispatch_core::attributes::AttributeError;
use stream_dispatch_core::envelope::EnvelopeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to query index {index} on table {table}: {message}")]
    Query {
        table: String,
        index: String,
        message: String,
    },
    #[error("cannot bind {placeholder} in query: {message}")]
    Binding {
        placeholder: String,
        message: String,
    },
    #[error("query returned an unsupported attribute `{attribute}`")]
    UnsupportedAttribute { attribute: String },
    #[error("query returned an undecodable item: {0}")]
    Decode(#[from] AttributeError),
}

/// Failure raised by a mutation handler or the scheduled-item processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("handler failed: {0}")]
    Handler(#[from] HandlerError),
    #[error("failed to serialize response: {0}")]
    Response(#[from] serde_json::Error),
}
