//! Mapping of request and job failures onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use faceswap_core::{JobError, ValidationError};
use serde::Serialize;

/// Error body returned by every failing swap route.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid: Vec<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            missing: Vec::new(),
            invalid: Vec::new(),
        }
    }
}

/// A swap request that did not produce outputs.
#[derive(Debug)]
pub enum ApiError {
    /// The body was not a JSON document.
    MalformedBody(String),
    /// Required fields were missing or malformed.
    Validation(ValidationError),
    /// The job ran and failed, or was never admitted.
    Job(JobError),
    /// The job succeeded but did not yield the outputs the route promises.
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        Self::Job(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Job(err) if err.is_busy() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Job(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            Self::MalformedBody(reason) => ErrorBody {
                details: Some(reason.clone()),
                ..ErrorBody::new("Invalid JSON body")
            },
            Self::Validation(err) => ErrorBody {
                missing: err.missing.clone(),
                invalid: err.invalid.clone(),
                ..ErrorBody::new(err.message())
            },
            Self::Job(err) => ErrorBody {
                details: err.details(),
                ..ErrorBody::new(err.user_message())
            },
            Self::Internal(reason) => ErrorBody {
                details: Some(reason.clone()),
                ..ErrorBody::new("Internal server error")
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faceswap_core::{JobErrorKind, JobId, Stage, ToolError};

    #[test]
    fn test_validation_is_bad_request() {
        let err = ApiError::Validation(ValidationError {
            missing: vec!["target_url".to_string()],
            invalid: vec![],
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(json["error"], "Missing required fields: target_url");
        assert_eq!(json["missing"][0], "target_url");
        assert!(json.get("invalid").is_none());
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_busy_is_service_unavailable() {
        let err = ApiError::Job(JobError::new(JobId::new(), Stage::Admission, JobErrorKind::Busy));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.body().error, "Server is busy, try again later");
    }

    #[test]
    fn test_tool_failure_carries_stderr() {
        let err = ApiError::Job(JobError::new(
            JobId::new(),
            Stage::Processing,
            JobErrorKind::Tool {
                variant: faceswap_core::JobVariant::SingleImage,
                pass: 1,
                total: 1,
                source: ToolError::Exited {
                    exit_code: Some(1),
                    stderr: "No face detected".to_string(),
                },
            },
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = err.body();
        assert_eq!(body.error, "Face swap tool failed");
        assert_eq!(body.details.as_deref(), Some("No face detected"));
    }
}
