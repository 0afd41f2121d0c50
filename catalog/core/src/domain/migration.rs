// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Schema Migrator
//!
//! Normalizes whatever the remote data file holds into [`AgentRecord`]s.
//! Applied on every read. Rules per record, first match wins:
//!
//! 1. Legacy boolean flag (`isApplied` or `applied`) and no `status`:
//!    `true` becomes `APPLIED`, `false` becomes `UNDER_REVIEW`, the flag is dropped.
//! 2. Neither flag nor `status`: `UNDER_REVIEW`.
//! 3. `status` present: passed through.
//!
//! Migration never fails. Anything malformed is coerced to a default and
//! reported as a [`MigrationWarning`] so callers can see what was patched up.

use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value};

use crate::domain::agent::{AgentId, AgentRecord, AgentStatus};

/// Field names the boolean applied flag has been stored under.
pub const LEGACY_FLAG_FIELDS: [&str; 2] = ["isApplied", "applied"];

const STATUS_FIELD: &str = "status";

/// Something the migrator had to coerce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationWarning {
    /// Position of the record in the raw input.
    pub index: usize,
    pub message: String,
}

impl fmt::Display for MigrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record #{}: {}", self.index, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub records: Vec<AgentRecord>,
    pub warnings: Vec<MigrationWarning>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Migrate a list of untyped records into the current record shape.
pub fn migrate(raw: Vec<Value>) -> MigrationReport {
    let mut report = MigrationReport::default();
    let mut seen = HashSet::new();

    for (index, value) in raw.into_iter().enumerate() {
        let mut warn = |message: String| report.warnings.push(MigrationWarning { index, message });

        if let Some(message) = loose_legacy_flag(&value) {
            warn(message);
        }

        match migrate_value(value) {
            Value::Object(map) => {
                let record = into_record(index, map, &mut seen, &mut warn);
                report.records.push(record);
            }
            other => warn(format!("skipped non-object entry of type {}", json_type(&other))),
        }
    }

    report
}

/// Parse the data file (a JSON array) and migrate its entries.
pub fn migrate_document(content: &str) -> Result<MigrationReport, serde_json::Error> {
    let raw: Vec<Value> = serde_json::from_str(content)?;
    Ok(migrate(raw))
}

/// Apply the status rules to one raw record, staying at the JSON level.
pub fn migrate_value(raw: Value) -> Value {
    let Value::Object(mut map) = raw else {
        return raw;
    };

    if map.contains_key(STATUS_FIELD) {
        return Value::Object(map);
    }

    let legacy = LEGACY_FLAG_FIELDS
        .iter()
        .filter_map(|field| map.remove(*field))
        .next();

    let status = match legacy {
        Some(flag) => AgentStatus::from_legacy_flag(legacy_truthy(&flag)),
        None => AgentStatus::UnderReview,
    };
    map.insert(STATUS_FIELD.to_string(), Value::String(status.as_str().to_string()));

    Value::Object(map)
}

/// Describes a legacy flag that will be read for the status but is not a boolean.
fn loose_legacy_flag(raw: &Value) -> Option<String> {
    let map = raw.as_object()?;
    if map.contains_key(STATUS_FIELD) {
        return None;
    }
    let (field, flag) = LEGACY_FLAG_FIELDS
        .iter()
        .find_map(|field| map.get(*field).map(|flag| (*field, flag)))?;
    if flag.is_boolean() {
        return None;
    }
    Some(format!(
        "legacy flag '{}' was a {} ({}), read as {}",
        field,
        json_type(flag),
        flag,
        legacy_truthy(flag)
    ))
}

fn legacy_truthy(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn into_record(
    index: usize,
    mut map: Map<String, Value>,
    seen: &mut HashSet<AgentId>,
    warn: &mut impl FnMut(String),
) -> AgentRecord {
    let id = match map.remove("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        other => {
            let recovered = format!("recovered-{}", index);
            warn(format!(
                "missing or unusable id ({}), assigned '{}'",
                other.as_ref().map(json_type).unwrap_or("absent"),
                recovered
            ));
            recovered
        }
    };

    let mut id = AgentId::new(id);
    if seen.contains(&id) {
        let mut renamed = AgentId::new(format!("{}-{}", id, index));
        while seen.contains(&renamed) {
            renamed = AgentId::new(format!("{}-{}", renamed, index));
        }
        warn(format!("duplicate id '{}', renamed to '{}'", id, renamed));
        id = renamed;
    }
    seen.insert(id.clone());

    let status = match map.remove(STATUS_FIELD) {
        Some(Value::String(s)) => AgentStatus::parse(&s).unwrap_or_else(|| {
            warn(format!("unknown status '{}', defaulted to UNDER_REVIEW", s));
            AgentStatus::UnderReview
        }),
        other => {
            warn(format!(
                "status of type {} is not a string, defaulted to UNDER_REVIEW",
                other.as_ref().map(json_type).unwrap_or("absent")
            ));
            AgentStatus::UnderReview
        }
    };

    let name = text_field(&mut map, "name", true, warn);
    let description = text_field(&mut map, "description", false, warn);
    let category = text_field(&mut map, "category", false, warn);
    let user_page_url = text_field(&mut map, "userPageUrl", true, warn);
    let admin_page_url = match map.remove("adminPageUrl") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    };

    AgentRecord {
        id,
        name,
        description,
        category,
        status,
        user_page_url,
        admin_page_url,
    }
}

fn text_field(
    map: &mut Map<String, Value>,
    field: &str,
    required: bool,
    warn: &mut impl FnMut(String),
) -> String {
    match map.remove(field) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => {
            if required {
                warn(format!("missing '{}', left empty", field));
            }
            String::new()
        }
        Some(other) => {
            warn(format!("'{}' was a {}, converted to text", field, json_type(&other)));
            other.to_string()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full(extra: Value) -> Value {
        let mut base = json!({
            "id": "1",
            "name": "n",
            "description": "d",
            "category": "c",
            "userPageUrl": "https://u.test"
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut base, extra) {
            base.extend(extra);
        }
        base
    }

    #[test]
    fn test_legacy_true_maps_to_applied() {
        let report = migrate(vec![full(json!({"isApplied": true}))]);
        assert_eq!(report.records[0].status, AgentStatus::Applied);
        assert!(report.is_clean());
    }

    #[test]
    fn test_legacy_false_maps_to_under_review() {
        let report = migrate(vec![full(json!({"applied": false}))]);
        assert_eq!(report.records[0].status, AgentStatus::UnderReview);
        assert!(report.is_clean());
    }

    #[test]
    fn test_legacy_flag_is_dropped() {
        let migrated = migrate_value(full(json!({"isApplied": true})));
        assert!(migrated.get("isApplied").is_none());
        assert_eq!(migrated["status"], "APPLIED");
    }

    #[test]
    fn test_missing_status_defaults_to_under_review() {
        let report = migrate(vec![full(json!({}))]);
        assert_eq!(report.records[0].status, AgentStatus::UnderReview);
    }

    #[test]
    fn test_existing_status_wins_over_legacy_flag() {
        let report = migrate(vec![full(json!({"status": "REVIEW_COMPLETE", "isApplied": true}))]);
        assert_eq!(report.records[0].status, AgentStatus::ReviewComplete);
    }

    #[test]
    fn test_korean_status_label_is_understood() {
        let report = migrate(vec![full(json!({"status": "적용완료"}))]);
        assert_eq!(report.records[0].status, AgentStatus::Applied);
        assert!(report.is_clean());
    }

    #[test]
    fn test_migration_is_idempotent() {
        let raw = vec![
            full(json!({"isApplied": true})),
            json!({"id": 2, "name": "only name"}),
            full(json!({"status": "bogus"})),
            json!("not a record"),
            full(json!({"id": "1", "applied": 0})),
            json!({"isApplied": "true", "userPageUrl": "https://x.test"}),
            full(json!({"id": "a-2"})),
            full(json!({"id": "a"})),
            full(json!({"id": "a"})),
        ];

        let once = migrate(raw).records;
        let again = migrate(
            once.iter()
                .map(|r| serde_json::to_value(r).unwrap())
                .collect(),
        )
        .records;

        assert_eq!(once, again);
    }

    #[test]
    fn test_malformed_records_are_coerced_and_reported() {
        let report = migrate(vec![
            json!(42),
            json!({"name": 7, "status": true}),
            full(json!({})),
            full(json!({})),
            full(json!({"id": "a-6"})),
            full(json!({"id": "a"})),
            full(json!({"id": "a"})),
        ]);

        assert_eq!(report.records.len(), 6);
        let coerced = &report.records[0];
        assert_eq!(coerced.id, AgentId::from("recovered-1"));
        assert_eq!(coerced.name, "7");
        assert_eq!(coerced.status, AgentStatus::UnderReview);
        assert_eq!(report.records[2].id, AgentId::from("1-3"));
        assert_eq!(report.records[5].id, AgentId::from("a-6-6"));
        let ids: HashSet<&AgentId> = report.records.iter().map(|r| &r.id).collect();
        assert_eq!(ids.len(), report.records.len());
        assert!(report.warnings.iter().any(|w| w.index == 0 && w.message.contains("non-object")));
        assert!(report.warnings.iter().any(|w| w.message.contains("duplicate id")));
    }

    #[test]
    fn test_renamed_duplicate_never_collides() {
        let report = migrate(vec![
            full(json!({"id": "a-2"})),
            full(json!({"id": "a"})),
            full(json!({"id": "a"})),
        ]);

        let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a-2", "a", "a-2-2"]);
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_non_boolean_legacy_flag_is_reported() {
        let report = migrate(vec![
            full(json!({"id": "1", "isApplied": "yes"})),
            full(json!({"id": "2", "applied": 1})),
            full(json!({"id": "3", "isApplied": false})),
        ]);

        let statuses: Vec<_> = report.records.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![AgentStatus::UnderReview, AgentStatus::Applied, AgentStatus::UnderReview]
        );
        let flagged: Vec<usize> = report.warnings.iter().map(|w| w.index).collect();
        assert_eq!(flagged, vec![0, 1]);
        assert!(report.warnings[0].message.contains("isApplied"));
    }

    #[test]
    fn test_empty_admin_url_becomes_absent() {
        let report = migrate(vec![full(json!({"adminPageUrl": ""}))]);
        assert_eq!(report.records[0].admin_page_url, None);
    }

    #[test]
    fn test_migrate_document_requires_array() {
        assert!(migrate_document("{\"id\": 1}").is_err());
        let report = migrate_document("[]").unwrap();
        assert!(report.records.is_empty());
    }
}
