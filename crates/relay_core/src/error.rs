use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("provider error: {0}")]
    Provider(#[from] mistral_client::ClientError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, RelayError>;
