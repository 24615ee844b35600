use serde::{Deserialize, Serialize};

/// Salesperson reference as the remote store encodes it: a `[id, name]`
/// pair when assigned, the literal `false` when not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Assigned(i64, String),
    Unassigned(bool),
}

/// A sales lead as fetched from the remote store.
///
/// Leads are value-like snapshots. The core never edits a lead's fields;
/// stage membership is implied by which column currently holds the lead,
/// and changes are expressed by moving the value between columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    /// 0 means "unset" for display purposes.
    #[serde(default)]
    pub expected_revenue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Date string in the remote store's format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserRef>,
}

/// Create/edit payload for a lead. All fields optional so the same type
/// serves both creation and partial updates; `None` fields are omitted
/// from the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<i64>,
}

impl LeadForm {
    /// Payload that only reassigns a lead's stage (the drag persistence call).
    pub fn stage_change(stage_id: i64) -> Self {
        Self {
            stage_id: Some(stage_id),
            ..Self::default()
        }
    }
}

/// A pipeline stage. The name doubles as the remote store's filter key;
/// the id keys the board's columns. The configured stage list is static
/// for the duration of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub stage_id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_deserializes_assigned_user() {
        let lead: Lead = serde_json::from_str(
            r#"{"id": 7, "name": "Acme deal", "expected_revenue": 1200.5,
                "user_id": [3, "Alice"], "tag_ids": [1, 2]}"#,
        )
        .unwrap();
        assert_eq!(lead.user_id, Some(UserRef::Assigned(3, "Alice".to_string())));
        assert_eq!(lead.tag_ids, vec![1, 2]);
    }

    #[test]
    fn test_lead_deserializes_unassigned_user() {
        let lead: Lead =
            serde_json::from_str(r#"{"id": 7, "name": "Acme deal", "user_id": false}"#).unwrap();
        assert_eq!(lead.user_id, Some(UserRef::Unassigned(false)));
        assert_eq!(lead.expected_revenue, 0.0);
    }

    #[test]
    fn test_stage_change_form_serializes_only_stage() {
        let json = serde_json::to_value(LeadForm::stage_change(4)).unwrap();
        assert_eq!(json, serde_json::json!({ "stage_id": 4 }));
    }

    #[test]
    fn test_stage_uses_camel_case_keys() {
        let stage: Stage = serde_json::from_str(r#"{"name": "New", "stageId": 1}"#).unwrap();
        assert_eq!(stage.stage_id, 1);
        assert_eq!(stage.name, "New");
    }
}
