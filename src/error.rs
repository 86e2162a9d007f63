use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::client::UpstreamError;
use crate::dto::ErrorDto;
use crate::validate::UploadRejection;

/// Errors returned by the HTTP endpoint, each mapped to one status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Rejected(#[from] UploadRejection),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Rejected(UploadRejection::EmptyFile) => StatusCode::BAD_REQUEST,
            Self::Rejected(UploadRejection::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Rejected(UploadRejection::UnsupportedType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorDto {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (ApiError::BadRequest("no file".into()), 400),
            (UploadRejection::EmptyFile.into(), 400),
            (
                UploadRejection::TooLarge {
                    size: 30 << 20,
                    limit: 25 << 20,
                }
                .into(),
                413,
            ),
            (UploadRejection::UnsupportedType("text/plain".into()).into(), 415),
            (
                UpstreamError::Provider {
                    status: 401,
                    message: "bad key".into(),
                }
                .into(),
                502,
            ),
            (UpstreamError::Transport("timed out".into()).into(), 502),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code().as_u16(), expected, "{error}");
        }
    }

    #[test]
    fn upstream_message_is_passed_through() {
        let error = ApiError::from(UpstreamError::Provider {
            status: 500,
            message: "The server had an error".into(),
        });
        assert_eq!(
            error.to_string(),
            "Transcription provider returned 500: The server had an error"
        );
    }
}
