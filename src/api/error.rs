//! API error taxonomy

use thiserror::Error;

use super::types::{ApiResponse, ErrorBody};

/// Failures of the persisted score table
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt score table: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Everything a handler can reject a request with
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Method Not Allowed")]
    MethodNotAllowed { allow: &'static str },
    #[error("Invalid JSON body")]
    InvalidBody,
    #[error("Invalid playerId (2~20 chars)")]
    InvalidPlayerId,
    #[error("Invalid score")]
    InvalidScore,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MethodNotAllowed { .. } => 405,
            ApiError::InvalidBody | ApiError::InvalidPlayerId | ApiError::InvalidScore => 400,
            ApiError::Store(_) => 500,
        }
    }

    /// Message safe to show to callers; backend detail never leaks
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Store(_) => "Server Error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn into_response(self) -> ApiResponse {
        if let ApiError::Store(err) = &self {
            log::error!("Score store failure: {}", err);
        }
        let mut response = ApiResponse::json(
            self.status(),
            &ErrorBody {
                ok: false,
                error: self.public_message(),
            },
        );
        if let ApiError::MethodNotAllowed { allow } = self {
            response.headers.push(("Allow".to_string(), allow.to_string()));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MethodNotAllowed { allow: "GET" }.status(), 405);
        assert_eq!(ApiError::InvalidPlayerId.status(), 400);
        assert_eq!(ApiError::InvalidScore.status(), 400);
        assert_eq!(ApiError::InvalidBody.status(), 400);
        assert_eq!(
            ApiError::Store(StoreError::Unavailable("down".into())).status(),
            500
        );
    }

    #[test]
    fn test_store_detail_not_leaked() {
        let err = ApiError::Store(StoreError::Unavailable("db password wrong".into()));
        let response = err.into_response();
        assert_eq!(response.status, 500);
        assert!(!response.body.contains("password"));
        assert!(response.body.contains("Server Error"));
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let response = ApiError::MethodNotAllowed { allow: "POST" }.into_response();
        assert_eq!(response.header("Allow"), Some("POST"));
        assert!(response.body.contains("Method Not Allowed"));
    }
}
