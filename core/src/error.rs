use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Campaign reply contained no JSON object")]
    CampaignReplyMissingJson,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ChurnResult<T> = Result<T, ChurnError>;
