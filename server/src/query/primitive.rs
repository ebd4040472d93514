//! Primitive restriction builder
//!
//! Parses a single `field<op>value` token. Recognized shapes:
//! `!=`, `==`, `=lt=`, `=le=`, `=gt=`, `=ge=`. The reserved literals
//! `null` and `notNull` (any case) turn `==`/`!=` into null checks.

use super::coerce::ValueCoercer;
use super::error::QueryError;
use super::restriction::{ComparisonOp, Restriction};

const NULL_LITERAL: &str = "null";
const NOT_NULL_LITERAL: &str = "notNull";

/// Build a restriction from `query[start..end]`
pub fn build_primitive(
    query: &str,
    start: usize,
    end: usize,
    coercer: &dyn ValueCoercer,
) -> Result<Restriction, QueryError> {
    let fragment = &query[start..end];
    if fragment.is_empty() {
        return Err(QueryError::EmptyExpression { position: start });
    }

    let unsupported = || QueryError::UnsupportedOperator {
        fragment: fragment.to_string(),
    };

    let parts: Vec<&str> = fragment.split('=').collect();
    let (field, op, literal) = match parts.as_slice() {
        [lhs, value] => match lhs.strip_suffix('!') {
            Some(field) => (field, ComparisonOp::Ne, *value),
            None => return Err(unsupported()),
        },
        [field, middle, value] => {
            let op = match *middle {
                "" => ComparisonOp::Eq,
                "lt" => ComparisonOp::Lt,
                "le" => ComparisonOp::Le,
                "gt" => ComparisonOp::Gt,
                "ge" => ComparisonOp::Ge,
                _ => return Err(unsupported()),
            };
            (*field, op, *value)
        }
        _ => return Err(unsupported()),
    };

    if field.is_empty() || literal.is_empty() {
        return Err(unsupported());
    }

    match op {
        ComparisonOp::Eq if literal.eq_ignore_ascii_case(NULL_LITERAL) => {
            return Ok(Restriction::is_null(field));
        }
        ComparisonOp::Eq if literal.eq_ignore_ascii_case(NOT_NULL_LITERAL) => {
            return Ok(Restriction::is_not_null(field));
        }
        ComparisonOp::Ne if literal.eq_ignore_ascii_case(NULL_LITERAL) => {
            return Ok(Restriction::is_not_null(field));
        }
        ComparisonOp::Ne if literal.eq_ignore_ascii_case(NOT_NULL_LITERAL) => {
            return Ok(Restriction::is_null(field));
        }
        _ => {}
    }

    let value = coercer.coerce(field, literal)?;
    Ok(Restriction::compare(field, op, value))
}
