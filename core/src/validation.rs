//! Field validation for actions and action patches.
//!
//! Validation never stops at the first problem: every rule runs and each
//! violation becomes a [`ValidationFinding`]. An empty list means valid.
//!
//! The same rules serve both creates and patches. `is_create` only decides
//! whether required fields must be present; format, length, range and
//! reference-data rules apply to whatever fields are supplied.

use crate::action::ActionFields;
use crate::environment::Clock;
use crate::reference_data::{Code, ReferenceData};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Maximum length of `ActionSummary`.
pub const ACTION_SUMMARY_MAX_LENGTH: usize = 4000;

/// Maximum length of `SignpostedTo`.
pub const SIGNPOSTED_TO_MAX_LENGTH: usize = 255;

/// Required length of a touchpoint identifier.
pub const TOUCHPOINT_ID_LENGTH: usize = 10;

/// A single rule violation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    /// Human-readable description of the violation.
    pub message: String,
    /// Wire name of the offending field.
    pub field: &'static str,
}

impl ValidationFinding {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field,
        }
    }
}

/// Validates actions against the current time of an injected clock.
#[derive(Clone)]
pub struct Validator {
    clock: Arc<dyn Clock>,
}

impl Validator {
    /// Create a validator reading "now" from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Validate `resource`, returning every finding.
    #[must_use]
    pub fn validate<R: ActionFields + ?Sized>(
        &self,
        resource: &R,
        is_create: bool,
    ) -> Vec<ValidationFinding> {
        validate_at(resource, is_create, self.clock.now())
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").finish_non_exhaustive()
    }
}

/// Validate `resource` as of `now`.
#[must_use]
pub fn validate_at<R: ActionFields + ?Sized>(
    resource: &R,
    is_create: bool,
    now: DateTime<Utc>,
) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();

    check_action_summary(resource.action_summary(), is_create, &mut findings);

    check_date(
        "DateActionAgreed",
        "Date Action Agreed",
        resource.date_action_agreed(),
        is_create,
        now,
        &mut findings,
    );
    check_date(
        "DateActionAimsToBeCompletedBy",
        "Date Action Aims To Be Completed By",
        resource.date_action_aims_to_be_completed_by(),
        is_create,
        now,
        &mut findings,
    );
    check_date(
        "DateActionActuallyCompleted",
        "Date Action Actually Completed",
        resource.date_action_actually_completed(),
        false,
        now,
        &mut findings,
    );
    check_date(
        "LastModifiedDate",
        "Last Modified Date",
        resource.last_modified_date(),
        false,
        now,
        &mut findings,
    );

    check_code("ActionType", "Action Type", resource.action_type(), is_create, &mut findings);
    check_code("ActionStatus", "Action Status", resource.action_status(), false, &mut findings);
    check_code(
        "PersonResponsible",
        "Person Responsible",
        resource.person_responsible(),
        is_create,
        &mut findings,
    );
    check_code(
        "SignpostedToCategory",
        "Signposted To Category",
        resource.signposted_to_category(),
        is_create,
        &mut findings,
    );

    if let Some(signposted_to) = resource.signposted_to() {
        if signposted_to.chars().count() > SIGNPOSTED_TO_MAX_LENGTH {
            findings.push(ValidationFinding::new(
                "SignpostedTo",
                format!("Signposted To must be {SIGNPOSTED_TO_MAX_LENGTH} characters or less"),
            ));
        }
    }

    if let Some(touchpoint) = resource.last_modified_touchpoint_id() {
        if touchpoint.chars().count() != TOUCHPOINT_ID_LENGTH {
            findings.push(ValidationFinding::new(
                "LastModifiedTouchpointId",
                format!("Last Modified Touchpoint Id must be {TOUCHPOINT_ID_LENGTH} characters"),
            ));
        }
    }

    findings
}

fn check_action_summary(
    summary: Option<&str>,
    is_create: bool,
    findings: &mut Vec<ValidationFinding>,
) {
    match summary {
        Some(text) if text.trim().is_empty() && is_create => {
            findings.push(required("ActionSummary", "Action Summary"));
        }
        None if is_create => findings.push(required("ActionSummary", "Action Summary")),
        Some(text) if text.chars().count() > ACTION_SUMMARY_MAX_LENGTH => {
            findings.push(ValidationFinding::new(
                "ActionSummary",
                format!("Action Summary must be {ACTION_SUMMARY_MAX_LENGTH} characters or less"),
            ));
        }
        _ => {}
    }
}

fn check_date(
    field: &'static str,
    label: &str,
    value: Option<DateTime<Utc>>,
    required_field: bool,
    now: DateTime<Utc>,
    findings: &mut Vec<ValidationFinding>,
) {
    match value {
        None if required_field => findings.push(required(field, label)),
        Some(date) if date > now => findings.push(ValidationFinding::new(
            field,
            format!("{label} must be less than or equal to the current date/time"),
        )),
        _ => {}
    }
}

fn check_code<T: ReferenceData>(
    field: &'static str,
    label: &str,
    value: Option<Code<T>>,
    required_field: bool,
    findings: &mut Vec<ValidationFinding>,
) {
    match value {
        None if required_field => findings.push(required(field, label)),
        Some(code) if !code.is_defined() => findings.push(ValidationFinding::new(
            field,
            format!("Please supply a valid {label}"),
        )),
        _ => {}
    }
}

fn required(field: &'static str, label: &str) -> ValidationFinding {
    ValidationFinding::new(field, format!("{label} is a required field"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionPatch};
    use crate::reference_data::{
        ActionStatus, ActionType, PersonResponsible, SignpostedToCategory,
    };
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn valid_action() -> Action {
        Action {
            date_action_agreed: Some(now() - Duration::days(1)),
            date_action_aims_to_be_completed_by: Some(now() - Duration::hours(1)),
            action_summary: Some("Write CV".to_string()),
            action_type: Some(Code::from(ActionType::CreateOrUpdateCv)),
            action_status: Some(Code::from(ActionStatus::NotStarted)),
            person_responsible: Some(Code::from(PersonResponsible::Customer)),
            signposted_to_category: Some(Code::from(SignpostedToCategory::Skills)),
            last_modified_touchpoint_id: Some("0000000101".to_string()),
            ..Action::default()
        }
    }

    fn fields(findings: &[ValidationFinding]) -> Vec<&'static str> {
        findings.iter().map(|f| f.field).collect()
    }

    #[test]
    fn valid_action_has_no_findings() {
        assert!(validate_at(&valid_action(), true, now()).is_empty());
    }

    #[test]
    fn empty_create_reports_every_required_field() {
        let findings = validate_at(&Action::default(), true, now());

        assert_eq!(
            fields(&findings),
            vec![
                "ActionSummary",
                "DateActionAgreed",
                "DateActionAimsToBeCompletedBy",
                "ActionType",
                "PersonResponsible",
                "SignpostedToCategory",
            ]
        );
        assert_eq!(findings[0].message, "Action Summary is a required field");
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(validate_at(&ActionPatch::default(), false, now()).is_empty());
    }

    #[test]
    fn blank_summary_is_missing_on_create() {
        let action = Action {
            action_summary: Some("   ".to_string()),
            ..valid_action()
        };
        assert_eq!(fields(&validate_at(&action, true, now())), vec!["ActionSummary"]);
    }

    #[test]
    fn summary_length_is_bounded() {
        let mut action = valid_action();
        action.action_summary = Some("a".repeat(ACTION_SUMMARY_MAX_LENGTH));
        assert!(validate_at(&action, true, now()).is_empty());

        action.action_summary = Some("a".repeat(ACTION_SUMMARY_MAX_LENGTH + 1));
        assert_eq!(fields(&validate_at(&action, true, now())), vec!["ActionSummary"]);
    }

    #[test]
    fn future_dates_are_rejected() {
        let patch = ActionPatch {
            date_action_actually_completed: Some(now() + Duration::seconds(1)),
            last_modified_date: Some(now() + Duration::days(1)),
            ..ActionPatch::default()
        };

        let findings = validate_at(&patch, false, now());
        assert_eq!(
            fields(&findings),
            vec!["DateActionActuallyCompleted", "LastModifiedDate"]
        );
        assert!(findings[0].message.contains("current date/time"));
    }

    #[test]
    fn date_equal_to_now_is_accepted() {
        let patch = ActionPatch {
            date_action_agreed: Some(now()),
            ..ActionPatch::default()
        };
        assert!(validate_at(&patch, false, now()).is_empty());
    }

    #[test]
    fn undefined_codes_are_rejected() {
        let patch = ActionPatch {
            action_type: Some(Code::from_raw(14)),
            action_status: Some(Code::from_raw(0)),
            person_responsible: Some(Code::from_raw(3)),
            signposted_to_category: Some(Code::from_raw(-1)),
            ..ActionPatch::default()
        };

        let findings = validate_at(&patch, false, now());
        assert_eq!(
            fields(&findings),
            vec!["ActionType", "ActionStatus", "PersonResponsible", "SignpostedToCategory"]
        );
        assert_eq!(findings[0].message, "Please supply a valid Action Type");
    }

    #[test]
    fn signposted_to_length_is_bounded() {
        let patch = ActionPatch {
            signposted_to: Some("x".repeat(SIGNPOSTED_TO_MAX_LENGTH + 1)),
            ..ActionPatch::default()
        };
        assert_eq!(fields(&validate_at(&patch, false, now())), vec!["SignpostedTo"]);
    }

    #[test]
    fn touchpoint_must_be_exactly_ten_characters() {
        let patch = ActionPatch {
            last_modified_touchpoint_id: Some("123".to_string()),
            ..ActionPatch::default()
        };
        assert_eq!(
            fields(&validate_at(&patch, false, now())),
            vec!["LastModifiedTouchpointId"]
        );
    }

    #[test]
    fn validator_reads_time_from_clock() {
        struct Fixed;
        impl Clock for Fixed {
            fn now(&self) -> DateTime<Utc> {
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            }
        }

        let validator = Validator::new(Arc::new(Fixed));
        let mut action = valid_action();
        action.date_action_agreed = Some(now() + Duration::minutes(5));

        assert_eq!(fields(&validator.validate(&action, true)), vec!["DateActionAgreed"]);
    }
}
