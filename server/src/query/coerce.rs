//! Value coercion
//!
//! Turns the string literal on the right-hand side of a primitive into a
//! typed [`ComparisonValue`]. Each entity kind declares a static table of
//! field names with special handling; every other field is a raw string.

use chrono::NaiveDateTime;

use super::error::{DATE_FORMAT_MESSAGE, QueryError};
use super::restriction::{ComparisonValue, EntityRef, LookupTarget};

/// Fixed timestamp pattern, `yyyy-MM-dd'T'HH:mm:ss`
pub const DATE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S";

/// Alarm/event severities in ordinal order, starting at 1
pub const SEVERITIES: [&str; 7] = [
    "INDETERMINATE",
    "CLEARED",
    "NORMAL",
    "WARNING",
    "MINOR",
    "MAJOR",
    "CRITICAL",
];

/// Pluggable strategy mapping `(field, literal)` to a typed value
pub trait ValueCoercer {
    fn coerce(&self, field: &str, literal: &str) -> Result<ComparisonValue, QueryError>;
}

/// Synchronous foreign-entity resolution used by [`CoercionRule::Lookup`]
pub trait EntityLookup {
    /// `Ok(None)` when nothing matches `key`
    fn lookup(&self, target: LookupTarget, key: &str) -> Result<Option<EntityRef>, QueryError>;
}

/// Small enumerations resolved by ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinalDomain {
    Severity,
}

impl OrdinalDomain {
    /// Accepts the ordinal itself or the case-insensitive label
    pub fn resolve(self, literal: &str) -> Option<i32> {
        match self {
            Self::Severity => {
                let max = SEVERITIES.len() as i32;
                if let Ok(n) = literal.parse::<i32>() {
                    return (1..=max).contains(&n).then_some(n);
                }
                SEVERITIES
                    .iter()
                    .position(|s| s.eq_ignore_ascii_case(literal))
                    .map(|i| i as i32 + 1)
            }
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Severity => "severity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionRule {
    Timestamp,
    Integer,
    Ordinal(OrdinalDomain),
    Lookup(LookupTarget),
}

/// Static per-entity table of special fields
pub type CoercionTable = &'static [(&'static str, CoercionRule)];

/// Table-driven [`ValueCoercer`]
pub struct FieldCoercer<'a> {
    rules: CoercionTable,
    lookup: &'a dyn EntityLookup,
}

impl<'a> FieldCoercer<'a> {
    pub fn new(rules: CoercionTable, lookup: &'a dyn EntityLookup) -> Self {
        Self { rules, lookup }
    }

    pub fn rule(&self, field: &str) -> Option<CoercionRule> {
        self.rules
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, rule)| *rule)
    }
}

impl ValueCoercer for FieldCoercer<'_> {
    fn coerce(&self, field: &str, literal: &str) -> Result<ComparisonValue, QueryError> {
        let Some(rule) = self.rule(field) else {
            return Ok(ComparisonValue::RawString(literal.to_string()));
        };

        match rule {
            CoercionRule::Timestamp => parse_timestamp(field, literal).map(ComparisonValue::DateTime),
            CoercionRule::Integer => parse_integer(field, literal).map(ComparisonValue::Integer),
            CoercionRule::Ordinal(domain) => domain
                .resolve(literal)
                .map(ComparisonValue::EnumOrdinal)
                .ok_or_else(|| {
                    QueryError::coercion(
                        field,
                        format!(
                            "Please specify a valid {} instead of \"{}\"",
                            domain.describe(),
                            literal
                        ),
                    )
                }),
            CoercionRule::Lookup(target) => {
                let key = match target {
                    LookupTarget::Node => parse_integer(field, literal)?.to_string(),
                    LookupTarget::Category => literal.to_string(),
                };
                match self.lookup.lookup(target, &key)? {
                    Some(found) => Ok(ComparisonValue::EntityReference(found)),
                    None => Err(QueryError::coercion(
                        field,
                        match target {
                            LookupTarget::Category => {
                                format!("Please specify a valid category instead of \"{}\"", literal)
                            }
                            LookupTarget::Node => {
                                format!("Please specify a valid node ID instead of \"{}\"", literal)
                            }
                        },
                    )),
                }
            }
        }
    }
}

pub fn parse_timestamp(field: &str, literal: &str) -> Result<NaiveDateTime, QueryError> {
    NaiveDateTime::parse_from_str(literal, DATE_PATTERN)
        .map_err(|_| QueryError::coercion(field, DATE_FORMAT_MESSAGE))
}

fn parse_integer(field: &str, literal: &str) -> Result<i64, QueryError> {
    literal.parse::<i64>().map_err(|_| {
        QueryError::coercion(
            field,
            format!(
                "Please specify a numeric value for \"{}\" instead of \"{}\"",
                field, literal
            ),
        )
    })
}
