use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForfettarioError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown ATECO activity code: {code}")]
    UnknownActivityCode { code: String },

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ForfettarioError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ForfettarioError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// The input field a form should attach this error to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ForfettarioError::InvalidInput { field, .. } => Some(field),
            ForfettarioError::UnknownActivityCode { .. } => Some("ateco_code"),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ForfettarioError {
    fn from(e: serde_json::Error) -> Self {
        ForfettarioError::SerializationError(e.to_string())
    }
}

impl From<serde_yaml::Error> for ForfettarioError {
    fn from(e: serde_yaml::Error) -> Self {
        ForfettarioError::SerializationError(e.to_string())
    }
}
