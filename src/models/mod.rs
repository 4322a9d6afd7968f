use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_FILE_NAME: &str = "unnamed-file";

/// Metadata entry for one uploaded file. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_id: String,
    pub file_name: String,
    pub storage_key: String,
    pub content_type: String,
    pub size: i64,
    pub owner_id: String,
    pub owner_email: String,
    pub owner_role: String,
    pub uploaded_at: DateTime<Utc>,
}

/// `{ownerId}/{fileId}-{fileName}`
pub fn storage_key(owner_id: &str, file_id: &str, file_name: &str) -> String {
    format!("{}/{}-{}", owner_id, file_id, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_layout() {
        assert_eq!(
            storage_key("user-1", "f-9", "report.pdf"),
            "user-1/f-9-report.pdf"
        );
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let record = FileRecord {
            file_id: "1".into(),
            file_name: "a.txt".into(),
            storage_key: "u/1-a.txt".into(),
            content_type: "text/plain".into(),
            size: 3,
            owner_id: "u".into(),
            owner_email: "u@example.com".into(),
            owner_role: "user".into(),
            uploaded_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fileId"], "1");
        assert_eq!(json["storageKey"], "u/1-a.txt");
        assert_eq!(json["ownerEmail"], "u@example.com");
        assert!(json.get("uploadedAt").is_some());
    }
}
