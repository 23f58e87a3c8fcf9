//! Reference data shared across the case-management platform.
//!
//! Each enumeration has a stable integer code, which is both the wire and the
//! storage representation, and a display description. Values submitted by
//! clients are carried as [`Code<T>`] so an unknown code survives
//! deserialization and is reported by the validator with a field-specific
//! message instead of failing the whole payload.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A fixed, coded enumeration.
pub trait ReferenceData: Copy + fmt::Debug + Send + Sync + 'static {
    /// Type name used in messages and API documents (e.g. `"ActionType"`).
    const NAME: &'static str;

    /// Every defined value, in code order.
    const ALL: &'static [Self];

    /// Integer code of this value.
    fn code(self) -> i32;

    /// Human-readable description.
    fn description(self) -> &'static str;

    /// Variant identifier (e.g. `"NotStarted"`).
    fn variant_name(self) -> &'static str;

    /// Look up a value by its integer code.
    #[must_use]
    fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.code() == code)
    }

    /// Look up a value by variant identifier, ignoring ASCII case.
    #[must_use]
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.variant_name().eq_ignore_ascii_case(name))
    }
}

macro_rules! reference_data {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident = $code:literal => $description:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = $description]
                $variant = $code,
            )+
        }

        impl ReferenceData for $name {
            const NAME: &'static str = stringify!($name);
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(self) -> i32 {
                self as i32
            }

            fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }

            fn variant_name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.description())
            }
        }
    };
}

reference_data! {
    /// Kind of activity the customer agreed to carry out.
    ActionType {
        SkillsHealthCheck = 1 => "Skills Health Check",
        CreateOrUpdateCv = 2 => "Create or update CV",
        InterviewPreparation = 3 => "Interview preparation",
        SearchForVacancy = 4 => "Search for vacancy",
        EnrolOnACourse = 5 => "Enrol on a course",
        CareersGuidanceInterview = 6 => "Careers guidance interview",
        ApplyForApprenticeship = 7 => "Apply for apprenticeship",
        ApplyForTraineeship = 8 => "Apply for traineeship",
        AttendSkillsFairOrSkillsEvent = 9 => "Attend skills fair or skills event",
        VolunteerOrWorkExperience = 10 => "Volunteer or work experience",
        UseNationalCareersServiceWebsite = 11 => "Use National Careers Service website",
        UseExternalDigitalServices = 12 => "Use external digital services",
        BetterOffCalculation = 13 => "Better off calculation",
        Other = 99 => "Other",
    }
}

reference_data! {
    /// Progress of an action.
    ActionStatus {
        NotStarted = 1 => "Not started",
        InProgress = 2 => "In progress",
        Completed = 3 => "Completed",
        NoLongerApplicable = 4 => "No longer applicable",
    }
}

reference_data! {
    /// Who owns carrying out the action.
    PersonResponsible {
        Customer = 1 => "Customer",
        Adviser = 2 => "Adviser",
    }
}

reference_data! {
    /// Category of the organisation the customer was signposted to.
    SignpostedToCategory {
        Dwp = 1 => "DWP",
        Skills = 2 => "Skills",
        Other = 3 => "Other",
    }
}

/// A raw reference-data code, which may or may not be a defined value of `T`.
///
/// Serializes as the bare integer. Deserializes from an integer or from a
/// variant name; names must be defined, integers need not be.
pub struct Code<T> {
    raw: i64,
    kind: PhantomData<fn() -> T>,
}

impl<T: ReferenceData> Code<T> {
    /// Wrap a raw code without checking it.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self {
            raw,
            kind: PhantomData,
        }
    }

    /// The raw integer code.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.raw
    }

    /// The defined value for this code, if any.
    #[must_use]
    pub fn known(self) -> Option<T> {
        i32::try_from(self.raw).ok().and_then(T::from_code)
    }

    /// Whether this code is a member of `T`'s value set.
    #[must_use]
    pub fn is_defined(self) -> bool {
        self.known().is_some()
    }
}

impl<T: ReferenceData> From<T> for Code<T> {
    fn from(value: T) -> Self {
        Self::from_raw(i64::from(value.code()))
    }
}

impl<T> Clone for Code<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Code<T> {}

impl<T> PartialEq for Code<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Code<T> {}

impl<T> Hash for Code<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: ReferenceData> PartialEq<T> for Code<T> {
    fn eq(&self, other: &T) -> bool {
        self.raw == i64::from(other.code())
    }
}

impl<T: ReferenceData> fmt::Debug for Code<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known() {
            Some(value) => write!(f, "{}::{:?}({})", T::NAME, value, self.raw),
            None => write!(f, "{}({})", T::NAME, self.raw),
        }
    }
}

impl<T> Serialize for Code<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.raw)
    }
}

impl<'de, T: ReferenceData> Deserialize<'de> for Code<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CodeVisitor(PhantomData))
    }
}

struct CodeVisitor<T>(PhantomData<fn() -> T>);

impl<T: ReferenceData> Visitor<'_> for CodeVisitor<T> {
    type Value = Code<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an integer code or variant name of {}", T::NAME)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Code::from_raw(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        i64::try_from(value)
            .map(Code::from_raw)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        if let Ok(raw) = value.trim().parse::<i64>() {
            return Ok(Code::from_raw(raw));
        }
        T::from_name(value)
            .map(Code::from)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(value), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        for status in ActionStatus::ALL {
            assert_eq!(ActionStatus::from_code(status.code()), Some(*status));
        }
        assert_eq!(ActionType::from_code(99), Some(ActionType::Other));
        assert_eq!(ActionType::from_code(14), None);
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(
            ActionStatus::from_name("notstarted"),
            Some(ActionStatus::NotStarted)
        );
        assert_eq!(SignpostedToCategory::from_name("DWP"), Some(SignpostedToCategory::Dwp));
    }

    #[test]
    fn code_serializes_as_integer() {
        let code = Code::from(ActionStatus::InProgress);
        assert_eq!(serde_json::to_string(&code).ok().as_deref(), Some("2"));
    }

    #[test]
    fn numeric_strings_read_like_integers() {
        let code: Code<ActionType> = serde_json::from_str(r#""2""#).unwrap_or_else(|_| Code::from_raw(0));
        assert_eq!(code.known(), Some(ActionType::CreateOrUpdateCv));

        let code: Code<ActionStatus> = serde_json::from_str(r#""42""#).unwrap_or_else(|_| Code::from_raw(0));
        assert_eq!(code.raw(), 42);
        assert!(!code.is_defined());
    }

    #[test]
    fn undefined_integer_deserializes_but_is_not_known() {
        let code: Code<PersonResponsible> = serde_json::from_str("7").unwrap_or_else(|_| Code::from_raw(0));
        assert_eq!(code.raw(), 7);
        assert!(!code.is_defined());
    }

    #[test]
    fn variant_name_deserializes_to_code() {
        let code: Result<Code<ActionStatus>, _> = serde_json::from_str("\"Completed\"");
        assert!(matches!(code, Ok(c) if c == ActionStatus::Completed));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let code: Result<Code<ActionStatus>, _> = serde_json::from_str("\"Paused\"");
        assert!(code.is_err());
    }

    #[test]
    fn debug_shows_type_and_code() {
        assert_eq!(format!("{:?}", Code::<ActionType>::from_raw(42)), "ActionType(42)");
        assert_eq!(
            format!("{:?}", Code::from(ActionType::Other)),
            "ActionType::Other(99)"
        );
    }

    #[test]
    fn description_is_display() {
        assert_eq!(ActionStatus::NoLongerApplicable.to_string(), "No longer applicable");
    }
}
