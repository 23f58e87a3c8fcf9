//! The Action entity, its sparse update form and identifier types.
//!
//! JSON field names are PascalCase on the wire and in storage, matching the
//! rest of the case-management platform.

use crate::reference_data::{
    ActionStatus, ActionType, Code, PersonResponsible, SignpostedToCategory,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

identifier! {
    /// Identifier of a customer record.
    CustomerId
}

identifier! {
    /// Identifier of an interaction between a customer and an adviser.
    InteractionId
}

identifier! {
    /// Identifier of an action plan agreed during an interaction.
    ActionPlanId
}

identifier! {
    /// Identifier of a single action.
    ActionId
}

/// The ancestor chain an action lives under, as addressed by the URL path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionPath {
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Interaction the plan was agreed in.
    pub interaction_id: InteractionId,
    /// Plan the action belongs to.
    pub action_plan_id: ActionPlanId,
}

impl ActionPath {
    /// Public URL of an action under this path, rooted at `base_url`.
    ///
    /// ```
    /// use actions_core::{ActionId, ActionPath, ActionPlanId, CustomerId, InteractionId};
    ///
    /// let path = ActionPath {
    ///     customer_id: CustomerId::new(),
    ///     interaction_id: InteractionId::new(),
    ///     action_plan_id: ActionPlanId::new(),
    /// };
    /// let url = path.resource_url("https://api.example/", ActionId::new());
    /// assert!(url.starts_with("https://api.example/Customers/"));
    /// ```
    #[must_use]
    pub fn resource_url(&self, base_url: &str, action_id: ActionId) -> String {
        format!(
            "{}/Customers/{}/Interactions/{}/ActionPlans/{}/Actions/{}",
            base_url.trim_end_matches('/'),
            self.customer_id,
            self.interaction_id,
            self.action_plan_id,
            action_id,
        )
    }
}

/// An action record.
///
/// Every field is optional at the serde level: a create request may omit
/// anything and the validator decides what is required. `CreatedBy` is
/// accepted from storage but never echoed to clients.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Action {
    /// Assigned by the service on create.
    pub action_id: Option<ActionId>,
    /// Set from the URL path on create.
    pub customer_id: Option<CustomerId>,
    /// Set from the URL path on create.
    pub action_plan_id: Option<ActionPlanId>,
    /// When the action was agreed.
    #[serde(default, with = "iso_date")]
    pub date_action_agreed: Option<DateTime<Utc>>,
    /// Target completion date.
    #[serde(default, with = "iso_date")]
    pub date_action_aims_to_be_completed_by: Option<DateTime<Utc>>,
    /// When the action was actually completed.
    #[serde(default, with = "iso_date")]
    pub date_action_actually_completed: Option<DateTime<Utc>>,
    /// Free-text description of the action.
    pub action_summary: Option<String>,
    /// Organisation or service the customer was pointed to.
    pub signposted_to: Option<String>,
    /// Category of `signposted_to`.
    pub signposted_to_category: Option<Code<SignpostedToCategory>>,
    /// Kind of action.
    pub action_type: Option<Code<ActionType>>,
    /// Progress of the action.
    pub action_status: Option<Code<ActionStatus>>,
    /// Who owns the action.
    pub person_responsible: Option<Code<PersonResponsible>>,
    /// Time of the most recent mutation.
    #[serde(default, with = "iso_date")]
    pub last_modified_date: Option<DateTime<Utc>>,
    /// Touchpoint that made the most recent mutation.
    pub last_modified_touchpoint_id: Option<String>,
    /// Touchpoint that created the record.
    #[serde(skip_serializing)]
    pub created_by: Option<String>,
}

impl Action {
    /// Apply server-assigned fields before a create is validated and stored.
    ///
    /// Identifiers and the touchpoint always come from the request context;
    /// `LastModifiedDate` and `ActionStatus` are only defaulted when absent.
    pub fn stamp_for_create(
        &mut self,
        path: &ActionPath,
        touchpoint_id: &str,
        now: DateTime<Utc>,
    ) -> ActionId {
        let action_id = ActionId::new();
        self.action_id = Some(action_id);
        self.customer_id = Some(path.customer_id);
        self.action_plan_id = Some(path.action_plan_id);
        self.last_modified_touchpoint_id = Some(touchpoint_id.to_string());
        self.created_by = Some(touchpoint_id.to_string());
        self.last_modified_date.get_or_insert(now);
        self.action_status
            .get_or_insert(Code::from(ActionStatus::NotStarted));
        action_id
    }
}

/// A sparse update to an action.
///
/// Serializes only the fields that are present, so the serialized form is
/// exactly the set of keys to overwrite. Identifier fields are absent: they
/// cannot be changed after creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionPatch {
    /// When the action was agreed.
    #[serde(default, with = "iso_date", skip_serializing_if = "Option::is_none")]
    pub date_action_agreed: Option<DateTime<Utc>>,
    /// Target completion date.
    #[serde(default, with = "iso_date", skip_serializing_if = "Option::is_none")]
    pub date_action_aims_to_be_completed_by: Option<DateTime<Utc>>,
    /// When the action was actually completed.
    #[serde(default, with = "iso_date", skip_serializing_if = "Option::is_none")]
    pub date_action_actually_completed: Option<DateTime<Utc>>,
    /// Free-text description of the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_summary: Option<String>,
    /// Organisation or service the customer was pointed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signposted_to: Option<String>,
    /// Category of `signposted_to`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signposted_to_category: Option<Code<SignpostedToCategory>>,
    /// Kind of action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<Code<ActionType>>,
    /// Progress of the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_status: Option<Code<ActionStatus>>,
    /// Who owns the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_responsible: Option<Code<PersonResponsible>>,
    /// Time of this mutation.
    #[serde(default, with = "iso_date", skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,
    /// Touchpoint making this mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_touchpoint_id: Option<String>,
}

impl ActionPatch {
    /// Apply server-assigned fields before a patch is validated and merged.
    pub fn stamp_for_update(&mut self, touchpoint_id: &str, now: DateTime<Utc>) {
        self.last_modified_touchpoint_id = Some(touchpoint_id.to_string());
        self.last_modified_date.get_or_insert(now);
    }
}

/// ISO-8601 dates on the wire.
///
/// Values with an offset are converted to UTC; values without one are read
/// as UTC. A bare calendar date means midnight. Output is always RFC 3339.
mod iso_date {
    use super::{
        DateTime, Deserialize, Deserializer, NaiveDate, NaiveDateTime, Serialize, Serializer, Utc,
        de,
    };

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&text).map(Some).ok_or_else(|| {
            de::Error::invalid_value(de::Unexpected::Str(&text), &"an ISO-8601 date")
        })
    }

    fn parse(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(instant) = text.parse::<DateTime<Utc>>() {
            return Some(instant);
        }
        if let Ok(local) = text.parse::<NaiveDateTime>() {
            return Some(local.and_utc());
        }
        text.parse::<NaiveDate>()
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc())
    }
}

/// Read access to the validated fields shared by [`Action`] and [`ActionPatch`].
pub trait ActionFields {
    /// `DateActionAgreed`
    fn date_action_agreed(&self) -> Option<DateTime<Utc>>;
    /// `DateActionAimsToBeCompletedBy`
    fn date_action_aims_to_be_completed_by(&self) -> Option<DateTime<Utc>>;
    /// `DateActionActuallyCompleted`
    fn date_action_actually_completed(&self) -> Option<DateTime<Utc>>;
    /// `ActionSummary`
    fn action_summary(&self) -> Option<&str>;
    /// `SignpostedTo`
    fn signposted_to(&self) -> Option<&str>;
    /// `SignpostedToCategory`
    fn signposted_to_category(&self) -> Option<Code<SignpostedToCategory>>;
    /// `ActionType`
    fn action_type(&self) -> Option<Code<ActionType>>;
    /// `ActionStatus`
    fn action_status(&self) -> Option<Code<ActionStatus>>;
    /// `PersonResponsible`
    fn person_responsible(&self) -> Option<Code<PersonResponsible>>;
    /// `LastModifiedDate`
    fn last_modified_date(&self) -> Option<DateTime<Utc>>;
    /// `LastModifiedTouchpointId`
    fn last_modified_touchpoint_id(&self) -> Option<&str>;
}

macro_rules! impl_action_fields {
    ($ty:ty) => {
        impl ActionFields for $ty {
            fn date_action_agreed(&self) -> Option<DateTime<Utc>> {
                self.date_action_agreed
            }
            fn date_action_aims_to_be_completed_by(&self) -> Option<DateTime<Utc>> {
                self.date_action_aims_to_be_completed_by
            }
            fn date_action_actually_completed(&self) -> Option<DateTime<Utc>> {
                self.date_action_actually_completed
            }
            fn action_summary(&self) -> Option<&str> {
                self.action_summary.as_deref()
            }
            fn signposted_to(&self) -> Option<&str> {
                self.signposted_to.as_deref()
            }
            fn signposted_to_category(&self) -> Option<Code<SignpostedToCategory>> {
                self.signposted_to_category
            }
            fn action_type(&self) -> Option<Code<ActionType>> {
                self.action_type
            }
            fn action_status(&self) -> Option<Code<ActionStatus>> {
                self.action_status
            }
            fn person_responsible(&self) -> Option<Code<PersonResponsible>> {
                self.person_responsible
            }
            fn last_modified_date(&self) -> Option<DateTime<Utc>> {
                self.last_modified_date
            }
            fn last_modified_touchpoint_id(&self) -> Option<&str> {
                self.last_modified_touchpoint_id.as_deref()
            }
        }
    };
}

impl_action_fields!(Action);
impl_action_fields!(ActionPatch);
