use serde::{Deserialize, Serialize};

pub const STREAM_SUCCESS_MESSAGE: &str = "Processing completed successfully";
pub const SCHEDULED_SUCCESS_MESSAGE: &str = "Scheduled processing completed successfully";

/// Value returned to the Lambda runtime on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

/// JSON document carried as a string in [`DispatchResponse::body`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_count: Option<usize>,
}

impl DispatchSummary {
    pub fn stream_completed() -> Self {
        Self {
            message: STREAM_SUCCESS_MESSAGE.to_string(),
            processed_count: None,
        }
    }

    pub fn scheduled_completed(processed_count: usize) -> Self {
        Self {
            message: SCHEDULED_SUCCESS_MESSAGE.to_string(),
            processed_count: Some(processed_count),
        }
    }
}

impl DispatchResponse {
    pub fn ok(summary: &DispatchSummary) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(summary)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn stream_body_has_message_only() {
        let response =
            DispatchResponse::ok(&DispatchSummary::stream_completed()).expect("should serialize");
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body,
            r#"{"message":"Processing completed successfully"}"#
        );
    }

    #[test]
    fn scheduled_body_reports_processed_count() {
        let response = DispatchResponse::ok(&DispatchSummary::scheduled_completed(3))
            .expect("should serialize");
        let value = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(value["statusCode"], json!(200));
        let body: serde_json::Value =
            serde_json::from_str(value["body"].as_str().expect("body is a string"))
                .expect("body is JSON");
        assert_eq!(body["processedCount"], json!(3));
    }
}
