//! Milestone records embedded in a timeline document, and partial updates to them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{MilestoneId, ValidationError};

use super::MilestoneStatus;

/// One entry of a timeline's ordered milestone list.
///
/// Only `id`, `order` and `status` are interpreted; every other attribute of
/// the relational row travels in `attributes` and is written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    pub id: MilestoneId,

    /// Position in the timeline; lower comes first.
    pub order: i64,

    #[serde(default)]
    pub status: MilestoneStatus,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl MilestoneRecord {
    /// Creates a record with no extra attributes.
    pub fn new(id: MilestoneId, order: i64, status: MilestoneStatus) -> Self {
        Self {
            id,
            order,
            status,
            attributes: Map::new(),
        }
    }

    /// Adds an extra attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Returns an extra attribute by name.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Merges the fields present in `patch` onto this record.
    ///
    /// Absent fields keep their current value. The identity is never rewritten.
    pub fn merge(&mut self, patch: &MilestonePatch) -> Result<(), ValidationError> {
        for (key, value) in patch.fields() {
            match key.as_str() {
                "id" => {}
                "order" => {
                    self.order = value.as_i64().ok_or_else(|| {
                        ValidationError::invalid_format("order", "expected an integer")
                    })?;
                }
                "status" => {
                    let raw = value.as_str().ok_or_else(|| {
                        ValidationError::invalid_format("status", "expected a string")
                    })?;
                    self.status = MilestoneStatus::from(raw);
                }
                _ => {
                    self.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }
}

/// A partial milestone: only the fields an update event carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestonePatch(Map<String, Value>);

impl MilestonePatch {
    /// Creates a patch from raw fields.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the raw fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the identity carried by the patch, if any.
    pub fn id(&self) -> Option<MilestoneId> {
        self.0.get("id").and_then(Value::as_i64).map(MilestoneId::new)
    }

    /// Returns true if the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> MilestonePatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn deserializes_extra_attributes_into_map() {
        let record: MilestoneRecord = serde_json::from_value(json!({
            "id": 5,
            "order": 2,
            "status": "active",
            "name": "Design review",
            "duration": 3
        }))
        .unwrap();

        assert_eq!(record.id, MilestoneId::new(5));
        assert_eq!(record.order, 2);
        assert_eq!(record.status, MilestoneStatus::Active);
        assert_eq!(record.attribute("name"), Some(&json!("Design review")));
        assert_eq!(record.attribute("duration"), Some(&json!(3)));
    }

    #[test]
    fn missing_status_defaults_to_active() {
        let record: MilestoneRecord =
            serde_json::from_value(json!({"id": 1, "order": 1})).unwrap();
        assert_eq!(record.status, MilestoneStatus::Active);
    }

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut record = MilestoneRecord::new(MilestoneId::new(5), 2, MilestoneStatus::Active)
            .with_attribute("name", json!("Kickoff"))
            .with_attribute("startDate", json!("2024-01-01"));

        record
            .merge(&patch(json!({"status": "completed", "startDate": "2024-02-01"})))
            .unwrap();

        assert_eq!(record.status, MilestoneStatus::Completed);
        assert_eq!(record.order, 2);
        assert_eq!(record.attribute("name"), Some(&json!("Kickoff")));
        assert_eq!(record.attribute("startDate"), Some(&json!("2024-02-01")));
    }

    #[test]
    fn merge_never_changes_identity() {
        let mut record = MilestoneRecord::new(MilestoneId::new(5), 1, MilestoneStatus::Active);
        record.merge(&patch(json!({"id": 99}))).unwrap();
        assert_eq!(record.id, MilestoneId::new(5));
    }

    #[test]
    fn merge_rejects_non_integer_order() {
        let mut record = MilestoneRecord::new(MilestoneId::new(5), 1, MilestoneStatus::Active);
        assert!(record.merge(&patch(json!({"order": "first"}))).is_err());
    }

    #[test]
    fn patch_exposes_its_identity() {
        assert_eq!(patch(json!({"id": 7, "x": 1})).id(), Some(MilestoneId::new(7)));
        assert_eq!(patch(json!({"x": 1})).id(), None);
    }
}
