//! Restriction tree types

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Comparison operators produced by the primitive builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    IsNull,
    IsNotNull,
}

impl ComparisonOp {
    /// Ordering comparisons (`<`, `<=`, `>`, `>=`)
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }
}

/// Boolean join between two components, `;` is AND and `,` is OR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotOperator {
    And,
    Or,
}

impl PivotOperator {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b';' => Some(Self::And),
            b',' => Some(Self::Or),
            _ => None,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        u8::try_from(c).ok().and_then(Self::from_byte)
    }
}

/// Entity kinds that can be resolved by a foreign lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupTarget {
    Category,
    Node,
}

/// A resolved foreign entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub target: LookupTarget,
    pub id: i64,
    pub name: String,
}

/// Typed operand of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ComparisonValue {
    Integer(i64),
    DateTime(NaiveDateTime),
    EnumOrdinal(i32),
    EntityReference(EntityRef),
    RawString(String),
}

impl fmt::Display for ComparisonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::DateTime(v) => write!(f, "{}", v.format(super::coerce::DATE_PATTERN)),
            Self::EnumOrdinal(v) => write!(f, "#{}", v),
            Self::EntityReference(r) => write!(f, "{}:{}", r.name, r.id),
            Self::RawString(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// One node of a boolean filter tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Restriction {
    Comparison {
        field: String,
        op: ComparisonOp,
        value: Option<ComparisonValue>,
    },
    And {
        left: Box<Restriction>,
        right: Box<Restriction>,
    },
    Or {
        left: Box<Restriction>,
        right: Box<Restriction>,
    },
}

impl Restriction {
    pub fn compare(field: &str, op: ComparisonOp, value: ComparisonValue) -> Self {
        Self::Comparison {
            field: field.to_string(),
            op,
            value: Some(value),
        }
    }

    pub fn is_null(field: &str) -> Self {
        Self::Comparison {
            field: field.to_string(),
            op: ComparisonOp::IsNull,
            value: None,
        }
    }

    pub fn is_not_null(field: &str) -> Self {
        Self::Comparison {
            field: field.to_string(),
            op: ComparisonOp::IsNotNull,
            value: None,
        }
    }

    pub fn and(left: Restriction, right: Restriction) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Restriction, right: Restriction) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison { field, op, value } => {
                let sym = match op {
                    ComparisonOp::Eq => "=",
                    ComparisonOp::Ne => "<>",
                    ComparisonOp::Lt => "<",
                    ComparisonOp::Le => "<=",
                    ComparisonOp::Gt => ">",
                    ComparisonOp::Ge => ">=",
                    ComparisonOp::IsNull => return write!(f, "{} IS NULL", field),
                    ComparisonOp::IsNotNull => return write!(f, "{} IS NOT NULL", field),
                };
                match value {
                    Some(v) => write!(f, "{} {} {}", field, sym, v),
                    None => write!(f, "{} {} ?", field, sym),
                }
            }
            Self::And { left, right } => write!(f, "AND({}, {})", left, right),
            Self::Or { left, right } => write!(f, "OR({}, {})", left, right),
        }
    }
}
