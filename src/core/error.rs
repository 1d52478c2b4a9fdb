use thiserror::Error;

use crate::core::model::ModelError;

/// Request-level failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{0}")]
    Validation(String),
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Language model error: {0}")]
    ModelFailure(String),
}

impl From<ModelError> for AssistantError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Unavailable(msg) => AssistantError::ModelUnavailable(msg),
            other => AssistantError::ModelFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_displays_validation_message_verbatim() {
        let e = AssistantError::Validation("No query provided".into());
        assert_eq!(e.to_string(), "No query provided");
    }

    #[test]
    fn unreachable_model_maps_to_unavailable() {
        let e: AssistantError = ModelError::Unavailable("connection refused".into()).into();
        assert!(matches!(e, AssistantError::ModelUnavailable(_)));
    }

    #[test]
    fn bad_model_status_maps_to_failure() {
        let e: AssistantError = ModelError::Upstream(404, "model not found".into()).into();
        assert!(matches!(e, AssistantError::ModelFailure(_)));
        assert!(e.to_string().contains("404"));
    }
}
