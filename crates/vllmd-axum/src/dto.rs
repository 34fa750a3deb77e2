//! Success response envelope.

use serde::Serialize;

/// Uniform success body: `{"status": "success", "message": ..., "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success("ok", json!({"pid": 7}))).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "ok");
        assert_eq!(body["data"]["pid"], 7);
    }

    #[test]
    fn data_is_omitted_when_absent() {
        let body = serde_json::to_value(ApiResponse::message_only("done")).unwrap();
        assert!(body.get("data").is_none());
    }
}
