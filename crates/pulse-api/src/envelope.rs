//! The response envelope wrapped around every Pulse endpoint body.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// `{success, data, message, error}` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload.  `success = false` becomes
    /// [`ApiError::Rejected`] carrying the server's `error` (falling back to
    /// `message`); a successful envelope without data is [`ApiError::MissingData`].
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(self.failure_message()));
        }
        self.data.ok_or(ApiError::MissingData)
    }

    /// Unwrap an acknowledgement-only response, discarding any payload.
    pub fn into_ack(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Rejected(self.failure_message()))
        }
    }

    fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "request failed".to_string())
    }
}

/// Paginated listing body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_data_unwraps_success() {
        let resp = ApiResponse {
            success: true,
            data: Some(7),
            message: None,
            error: None,
        };
        assert_eq!(resp.into_data().unwrap(), 7);
    }

    #[test]
    fn into_data_prefers_error_over_message() {
        let resp: ApiResponse<i32> = ApiResponse {
            success: false,
            data: None,
            message: Some("context".to_string()),
            error: Some("not found".to_string()),
        };
        match resp.into_data() {
            Err(ApiError::Rejected(msg)) => assert_eq!(msg, "not found"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn successful_envelope_without_data_is_an_error() {
        let resp: ApiResponse<i32> = ApiResponse {
            success: true,
            data: None,
            message: None,
            error: None,
        };
        assert!(matches!(resp.into_data(), Err(ApiError::MissingData)));
    }

    #[test]
    fn ack_ignores_payload() {
        let resp: ApiResponse<serde_json::Value> = ApiResponse {
            success: true,
            data: None,
            message: Some("ok".to_string()),
            error: None,
        };
        assert!(resp.into_ack().is_ok());
    }
}
