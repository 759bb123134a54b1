use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::TierId;

/// A finished report. Immutable once created; owned by the report store thereafter.
///
/// Serialized field names are the persisted layout shared with clients:
/// `{id, createdAt, tierId, tierLabel, sourceFileName, bodyText}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub tier_id: TierId,
    pub tier_label: String,
    pub source_file_name: String,
    pub body_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_layout_uses_camel_case() {
        let report = GeneratedReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            tier_id: TierId::Core,
            tier_label: "Core".to_string(),
            source_file_name: "genome.txt".to_string(),
            body_text: "## Summary".to_string(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["tierId"], "core");
        assert_eq!(value["sourceFileName"], "genome.txt");
        assert_eq!(value["bodyText"], "## Summary");
        assert!(value["createdAt"].as_str().unwrap().contains('T'));

        let recovered: GeneratedReport = serde_json::from_value(value).unwrap();
        assert_eq!(recovered, report);
    }
}
