use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid frequency rule: {0}")]
    InvalidRule(String),

    #[error("invalid form '{form_id}': {reason}")]
    InvalidForm { form_id: String, reason: String },

    #[error("invalid protocol '{protocol_id}': {reason}")]
    InvalidProtocol { protocol_id: String, reason: String },
}
