//! Overlaying an [`ActionPatch`] onto a stored action document.
//!
//! The stored document is handled as generic JSON rather than as an
//! [`Action`](crate::Action), so fields this service does not model survive
//! an update untouched.

use crate::action::ActionPatch;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from merging a patch into a stored document.
#[derive(Error, Debug)]
pub enum MergeError {
    /// The stored document could not be parsed.
    #[error("Stored document is not valid JSON: {0}")]
    InvalidDocument(String),

    /// The stored document parsed but is not a JSON object.
    #[error("Stored document is not a JSON object")]
    NotAnObject,

    /// The patch could not be serialized.
    #[error("Failed to serialize patch: {0}")]
    Serialization(String),
}

/// Merge `patch` into the stored JSON document `existing`.
///
/// Every non-null field of the patch overwrites the same-named field of the
/// document; everything else is left as stored. Returns `Ok(None)` when there
/// is no stored document to patch.
///
/// # Errors
///
/// Returns [`MergeError`] if the stored document is not a JSON object or the
/// result cannot be serialized.
pub fn merge(existing: Option<&str>, patch: &ActionPatch) -> Result<Option<String>, MergeError> {
    let Some(existing) = existing.filter(|document| !document.trim().is_empty()) else {
        return Ok(None);
    };

    let mut document: Value = serde_json::from_str(existing)
        .map_err(|e| MergeError::InvalidDocument(e.to_string()))?;

    let Value::Object(fields) = &mut document else {
        return Err(MergeError::NotAnObject);
    };

    apply_patch(fields, patch)?;

    serde_json::to_string(&document)
        .map(Some)
        .map_err(|e| MergeError::Serialization(e.to_string()))
}

/// Overwrite `fields` with every non-null field of `patch`.
///
/// # Errors
///
/// Returns [`MergeError::Serialization`] if the patch cannot be serialized.
pub fn apply_patch(fields: &mut Map<String, Value>, patch: &ActionPatch) -> Result<(), MergeError> {
    let changes =
        serde_json::to_value(patch).map_err(|e| MergeError::Serialization(e.to_string()))?;

    if let Value::Object(changes) = changes {
        for (name, value) in changes {
            if !value.is_null() {
                fields.insert(name, value);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reference_data::{ActionStatus, ActionType, Code};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use serde_json::json;

    const STORED: &str = r#"{
        "ActionId": "7a1b6f0e-3c62-4c8a-9d1e-2f5b8a0c4d11",
        "ActionSummary": "Write CV",
        "DateActionAgreed": "2024-12-01T10:00:00Z",
        "ActionStatus": 1,
        "ActionType": 2,
        "UnmodelledField": "kept"
    }"#;

    fn parse(document: &str) -> Value {
        serde_json::from_str(document).unwrap()
    }

    #[test]
    fn absent_or_empty_document_is_a_no_op() {
        let patch = ActionPatch::default();
        assert!(merge(None, &patch).unwrap().is_none());
        assert!(merge(Some(""), &patch).unwrap().is_none());
        assert!(merge(Some("  \n"), &patch).unwrap().is_none());
    }

    #[test]
    fn patch_overwrites_only_supplied_fields() {
        let patch = ActionPatch {
            action_summary: Some("Update CV".to_string()),
            action_status: Some(Code::from(ActionStatus::InProgress)),
            ..ActionPatch::default()
        };

        let merged = parse(&merge(Some(STORED), &patch).unwrap().unwrap());

        assert_eq!(merged["ActionSummary"], json!("Update CV"));
        assert_eq!(merged["ActionStatus"], json!(2));
        assert_eq!(merged["DateActionAgreed"], json!("2024-12-01T10:00:00Z"));
        assert_eq!(merged["ActionType"], json!(2));
        assert_eq!(merged["UnmodelledField"], json!("kept"));
    }

    #[test]
    fn dates_use_the_stored_representation() {
        let patch = ActionPatch {
            date_action_actually_completed: Some(
                Utc.with_ymd_and_hms(2024, 12, 24, 15, 30, 0).unwrap(),
            ),
            ..ActionPatch::default()
        };

        let merged = parse(&merge(Some(STORED), &patch).unwrap().unwrap());
        assert_eq!(merged["DateActionActuallyCompleted"], json!("2024-12-24T15:30:00Z"));
    }

    #[test]
    fn empty_patch_leaves_document_unchanged() {
        let merged = merge(Some(STORED), &ActionPatch::default()).unwrap().unwrap();
        assert_eq!(parse(&merged), parse(STORED));
    }

    #[test]
    fn non_object_document_is_an_error() {
        let result = merge(Some("[1, 2, 3]"), &ActionPatch::default());
        assert!(matches!(result, Err(MergeError::NotAnObject)));
    }

    #[test]
    fn invalid_document_is_an_error() {
        let result = merge(Some("{not json"), &ActionPatch::default());
        assert!(matches!(result, Err(MergeError::InvalidDocument(_))));
    }

    fn arb_patch() -> impl Strategy<Value = ActionPatch> {
        (
            proptest::option::of("[a-zA-Z ]{0,40}"),
            proptest::option::of("[a-zA-Z ]{0,20}"),
            proptest::option::of(-5i64..120),
            proptest::option::of(0i64..6),
            proptest::option::of(0i64..1_800_000_000),
        )
            .prop_map(|(summary, signposted, action_type, status, seconds)| ActionPatch {
                action_summary: summary,
                signposted_to: signposted,
                action_type: action_type.map(Code::<ActionType>::from_raw),
                action_status: status.map(Code::<ActionStatus>::from_raw),
                date_action_agreed: seconds.and_then(|s| Utc.timestamp_opt(s, 0).single()),
                ..ActionPatch::default()
            })
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(patch in arb_patch()) {
            let once = merge(Some(STORED), &patch).unwrap().unwrap();
            let twice = merge(Some(&once), &patch).unwrap().unwrap();
            prop_assert_eq!(parse(&once), parse(&twice));
        }

        #[test]
        fn merge_preserves_fields_absent_from_patch(patch in arb_patch()) {
            let merged = parse(&merge(Some(STORED), &patch).unwrap().unwrap());
            let stored = parse(STORED);
            prop_assert_eq!(&merged["UnmodelledField"], &stored["UnmodelledField"]);
            prop_assert_eq!(&merged["ActionId"], &stored["ActionId"]);
        }
    }
}
