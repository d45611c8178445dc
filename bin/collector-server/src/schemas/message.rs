use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Incoming submission for `POST /api/message`.
///
/// The string fields default to empty when absent, so a missing field and a
/// blank one fail validation the same way.  `receivedDateTime` accepts
/// ISO-8601 with or without a UTC offset; offset-less values are read as UTC.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveMessageRequest {
    #[serde(default)]
    pub group_or_user_name: String,
    #[serde(default)]
    pub message_content: String,
    #[serde(deserialize_with = "deserialize_received_at")]
    #[schema(value_type = String, example = "2025-07-13T10:30:00")]
    pub received_date_time: DateTime<Utc>,
}

/// Body of the 200 response: confirmation plus the generated id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveMessageResponse {
    pub success: bool,
    pub message_id: i64,
    pub message: String,
}

fn deserialize_received_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc())
        })
        .map_err(|_| serde::de::Error::custom(format!("`{raw}` is not an ISO-8601 timestamp")))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_timestamp_without_offset_as_utc() {
        let req: SaveMessageRequest = serde_json::from_str(
            r#"{"groupOrUserName":"WorkGroup","messageContent":"Meeting at 9am","receivedDateTime":"2025-07-13T10:30:00"}"#,
        )
        .expect("deserializes");
        assert_eq!(
            req.received_date_time,
            Utc.with_ymd_and_hms(2025, 7, 13, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn parses_rfc3339_timestamp_with_offset() {
        let req: SaveMessageRequest = serde_json::from_str(
            r#"{"groupOrUserName":"g","messageContent":"m","receivedDateTime":"2025-07-13T18:30:00+08:00"}"#,
        )
        .expect("deserializes");
        // +08:00 is normalised to UTC.
        assert_eq!(
            req.received_date_time,
            Utc.with_ymd_and_hms(2025, 7, 13, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn missing_string_fields_default_to_empty() {
        let req: SaveMessageRequest =
            serde_json::from_str(r#"{"receivedDateTime":"2025-07-13T10:30:00Z"}"#)
                .expect("deserializes");
        assert!(req.group_or_user_name.is_empty());
        assert!(req.message_content.is_empty());
    }

    #[test]
    fn rejects_non_timestamp_received_date_time() {
        let result = serde_json::from_str::<SaveMessageRequest>(
            r#"{"groupOrUserName":"g","messageContent":"m","receivedDateTime":"yesterday"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn response_uses_camel_case_field_names() {
        let body = serde_json::to_value(SaveMessageResponse {
            success: true,
            message_id: 7,
            message: "message saved".to_owned(),
        })
        .expect("serializes");
        assert_eq!(body["messageId"], 7);
        assert_eq!(body["success"], true);
    }
}
