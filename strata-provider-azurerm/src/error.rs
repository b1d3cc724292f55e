//! Error types for the Azure provider

use strata_core::provider::ProviderError;
use thiserror::Error;

use crate::ids::IdParseError;
use crate::services::dynatrace::helper::ExpandError;

/// Errors raised while talking to Azure Resource Manager
#[derive(Debug, Error)]
pub enum AzureError {
    /// Provider configuration is incomplete or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource Manager returned a non-success status
    #[error("{method} {url} returned {status}: {code}: {message}")]
    Api {
        method: String,
        url: String,
        status: u16,
        code: String,
        message: String,
    },

    /// A long-running operation ended unsuccessfully
    #[error("Operation {status}: {message}")]
    OperationFailed { status: String, message: String },

    /// A long-running operation did not finish in time
    #[error("Operation did not complete after {attempts} status checks")]
    OperationTimedOut { attempts: u32 },

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Identifier could not be parsed
    #[error(transparent)]
    InvalidId(#[from] IdParseError),

    /// Configuration could not be expanded into a request
    #[error(transparent)]
    Expand(#[from] ExpandError),

    /// Resource attributes are missing or malformed
    #[error("Invalid attribute '{name}': {message}")]
    InvalidAttribute { name: String, message: String },
}

impl AzureError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            AzureError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the remote object does not exist
    pub fn was_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn invalid_attribute(name: impl Into<String>, message: impl Into<String>) -> Self {
        AzureError::InvalidAttribute {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Wrap into a ProviderError with a short context message
    pub fn into_provider_error(self, context: impl Into<String>) -> ProviderError {
        ProviderError::new(context).with_cause(self)
    }
}

impl From<AzureError> for ProviderError {
    fn from(e: AzureError) -> Self {
        let context = match &e {
            AzureError::Config(_)
            | AzureError::InvalidId(_)
            | AzureError::Expand(_)
            | AzureError::InvalidAttribute { .. } => "invalid configuration",
            _ => "Azure Resource Manager request failed",
        };
        e.into_provider_error(context)
    }
}

pub type AzureResult<T> = Result<T, AzureError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16) -> AzureError {
        AzureError::Api {
            method: "GET".to_string(),
            url: "https://management.azure.com/x".to_string(),
            status,
            code: "ResourceNotFound".to_string(),
            message: "not here".to_string(),
        }
    }

    #[test]
    fn test_was_not_found() {
        assert!(api_error(404).was_not_found());
        assert!(!api_error(409).was_not_found());
        assert!(!AzureError::Config("x".to_string()).was_not_found());
    }

    #[test]
    fn test_into_provider_error_keeps_cause() {
        let err = api_error(500).into_provider_error("retrieving monitor");
        assert!(err.cause.is_some());
        assert!(err.to_string().starts_with("retrieving monitor: GET"));
    }

    #[test]
    fn test_from_azure_error_picks_context() {
        let err: ProviderError = AzureError::invalid_attribute("name", "is required").into();
        assert!(err.to_string().starts_with("invalid configuration"));

        let err: ProviderError = api_error(500).into();
        assert!(err.to_string().starts_with("Azure Resource Manager request failed"));
    }
}
