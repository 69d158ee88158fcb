use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::borrow::Cow;

use crate::constants::ConfigError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());

        match self {
            // Has Message
            Error::NotFound(msg) | Error::BadRequest(msg) => {
                res.json(ErrorBody { message: msg.clone() })
            }
            // No Message
            Error::InternalServer => {
                res.json(ErrorBody { message: "Internal Server Error".into() })
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // actor mailbox errors
    #[error("Relay mailbox error: {0}")]
    Mailbox(#[from] actix::MailboxError),
    // serde errors
    #[error("JSON Serialization/Deserialization Error")]
    JsonError(#[from] serde_json::Error),
    // config errors
    #[error(transparent)]
    Config(#[from] ConfigError),
    // Custom Errors
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::NotFound(msg) => Error::NotFound(msg),
            _ => {
                tracing::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

impl From<actix::MailboxError> for Error {
    fn from(value: actix::MailboxError) -> Self {
        SystemError::from(value).into()
    }
}

impl SystemError {
    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::InternalServer.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_system_error_keeps_not_found() {
        let err: Error = SystemError::not_found("Session not found").into();
        assert!(matches!(err, Error::NotFound(msg) if msg == "Session not found"));
    }

    #[test]
    fn test_json_error_is_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = SystemError::from(json_err).into();
        assert!(matches!(err, Error::InternalServer));
    }

    #[test]
    fn test_mailbox_error_is_internal() {
        let err: Error = actix::MailboxError::Closed.into();
        assert!(matches!(err, Error::InternalServer));
    }

    #[actix_web::test]
    async fn test_error_response_body() {
        let res = Error::NotFound("Session lobby-1 not found".into()).error_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(res.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Session lobby-1 not found");
    }
}
