//! Bracket-aware splitter and complex restriction builder
//!
//! Recurses over byte ranges of the original query so that every error
//! position is absolute. Only ASCII bytes (`(`, `)`, `;`, `,`) are ever
//! split on, so range bounds always fall on character boundaries.

use super::coerce::ValueCoercer;
use super::error::QueryError;
use super::merge::merge;
use super::primitive::build_primitive;
use super::restriction::{PivotOperator, Restriction};

/// Parse a whole, non-empty filter expression into one restriction
pub fn parse_filter(query: &str, coercer: &dyn ValueCoercer) -> Result<Restriction, QueryError> {
    split(query, 0, query.len(), coercer)
}

/// Split `query[start..end]` into units joined by pivots and merge them
///
/// A unit is either a primitive or a bracketed group. Groups are parsed
/// recursively, but every unit at this level takes part in one merge, so
/// AND binds tighter than OR across group boundaries too.
fn split(
    query: &str,
    mut start: usize,
    mut end: usize,
    coercer: &dyn ValueCoercer,
) -> Result<Restriction, QueryError> {
    let bytes = query.as_bytes();

    // Redundant outer group
    while start < end
        && bytes[start] == b'('
        && matching_close(bytes, start, end) == Some(end - 1)
    {
        start += 1;
        end -= 1;
    }

    let mut components = Vec::new();
    let mut pivots = Vec::new();
    let mut unit_start = start;
    let mut i = start;

    while i < end {
        match bytes[i] {
            b'(' => {
                if i != unit_start {
                    return Err(invalid_pivot_before(query, i));
                }
                let close =
                    matching_close(bytes, i, end).ok_or_else(|| QueryError::unmatched_open(i))?;
                components.push(split(query, i + 1, close, coercer)?);
                if close + 1 == end {
                    unit_start = end;
                    i = end;
                } else {
                    pivots.push(pivot_after(query, close)?);
                    unit_start = close + 2;
                    i = close + 2;
                }
            }
            b')' => return Err(QueryError::stray_close(&query[start..end], i)),
            b => {
                if let Some(pivot) = PivotOperator::from_byte(b) {
                    components.push(build_primitive(query, unit_start, i, coercer)?);
                    pivots.push(pivot);
                    unit_start = i + 1;
                }
                i += 1;
            }
        }
    }

    // Trailing primitive, or the empty piece after a final pivot
    if components.len() == pivots.len() {
        components.push(build_primitive(query, unit_start, end, coercer)?);
    }

    merge(components, pivots)
}

/// Index of the `)` closing the `(` at `open`, searching before `end`
fn matching_close(bytes: &[u8], open: usize, end: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().take(end).skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn invalid_pivot_before(query: &str, open: usize) -> QueryError {
    match query[..open].chars().next_back() {
        Some(found) => QueryError::InvalidPivotOperator {
            found,
            position: open - found.len_utf8(),
        },
        None => QueryError::Unexpected(format!(
            "no character before bracket at index {}",
            open
        )),
    }
}

fn pivot_after(query: &str, close: usize) -> Result<PivotOperator, QueryError> {
    match query[close + 1..].chars().next() {
        Some(c) => PivotOperator::from_char(c).ok_or(QueryError::InvalidPivotOperator {
            found: c,
            position: close + 1,
        }),
        None => Err(QueryError::Unexpected(format!(
            "no character after bracket at index {}",
            close
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::query::coerce::testing::StaticLookup;
    use crate::query::coerce::{CoercionRule, CoercionTable, FieldCoercer};
    use crate::query::restriction::{ComparisonOp, ComparisonValue};

    const RULES: CoercionTable = &[
        ("a", CoercionRule::Integer),
        ("b", CoercionRule::Integer),
        ("c", CoercionRule::Integer),
        ("d", CoercionRule::Integer),
        ("e", CoercionRule::Integer),
        ("createTime", CoercionRule::Timestamp),
        ("lastCapsdPoll", CoercionRule::Timestamp),
    ];

    fn parse(query: &str) -> Result<Restriction, QueryError> {
        let lookup = StaticLookup::default();
        let coercer = FieldCoercer::new(RULES, &lookup);
        parse_filter(query, &coercer)
    }

    fn eq(field: &str, v: i64) -> Restriction {
        Restriction::compare(field, ComparisonOp::Eq, ComparisonValue::Integer(v))
    }

    #[test]
    fn test_single_primitive() {
        assert_eq!(parse("a==1").unwrap(), eq("a", 1));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(
            parse("a==1,b==2;c==3").unwrap(),
            Restriction::or(eq("a", 1), Restriction::and(eq("b", 2), eq("c", 3)))
        );
    }

    #[test]
    fn test_group_after_prefix_keeps_precedence() {
        let plain = parse("a==1,b==2;c==3").unwrap();
        assert_eq!(parse("a==1,b==2;(c==3)").unwrap(), plain);
        assert_eq!(parse("(a==1),b==2;c==3").unwrap(), plain);
        assert_eq!(
            parse("a==1;b==2,(c==3);d==4").unwrap(),
            Restriction::or(
                Restriction::and(eq("a", 1), eq("b", 2)),
                Restriction::and(eq("c", 3), eq("d", 4))
            )
        );
    }

    #[test]
    fn test_group_between_runs() {
        // a AND (b OR c) OR d AND e
        assert_eq!(
            parse("a==1;(b==2,c==3),d==4;e==5").unwrap(),
            Restriction::or(
                Restriction::and(eq("a", 1), Restriction::or(eq("b", 2), eq("c", 3))),
                Restriction::and(eq("d", 4), eq("e", 5))
            )
        );
    }

    #[test]
    fn test_redundant_brackets_are_transparent() {
        let plain = parse("a==1;b==2").unwrap();
        assert_eq!(parse("(a==1;b==2)").unwrap(), plain);
        assert_eq!(parse("((a==1;b==2))").unwrap(), plain);
        assert_eq!(parse("(((a==1)))").unwrap(), eq("a", 1));
    }

    #[test]
    fn test_bracket_overrides_precedence() {
        assert_eq!(
            parse("(a==1,b==2);c==3").unwrap(),
            Restriction::and(Restriction::or(eq("a", 1), eq("b", 2)), eq("c", 3))
        );
    }

    #[test]
    fn test_prefix_body_suffix() {
        // a OR (b OR c) AND d  =>  a OR ((b OR c) AND d)
        assert_eq!(
            parse("a==1,(b==2,c==3);d==4").unwrap(),
            Restriction::or(
                eq("a", 1),
                Restriction::and(Restriction::or(eq("b", 2), eq("c", 3)), eq("d", 4))
            )
        );
    }

    #[test]
    fn test_groups_on_both_sides() {
        assert_eq!(
            parse("(a==1,b==2);(c==3,d==4)").unwrap(),
            Restriction::and(
                Restriction::or(eq("a", 1), eq("b", 2)),
                Restriction::or(eq("c", 3), eq("d", 4))
            )
        );
    }

    #[test]
    fn test_nested_groups() {
        assert_eq!(
            parse("a==1;(b==2,(c==3;d==4))").unwrap(),
            Restriction::and(
                eq("a", 1),
                Restriction::or(eq("b", 2), Restriction::and(eq("c", 3), eq("d", 4)))
            )
        );
    }

    #[test]
    fn test_node_scenario() {
        let lookup = StaticLookup::default();
        let coercer = FieldCoercer::new(RULES, &lookup);
        let tree = parse_filter(
            "createTime=gt=2013-06-14T20:41:45;(type==D,lastCapsdPoll=le=2013-12-30T00:00:00)",
            &coercer,
        )
        .unwrap();
        let created = coercer.coerce("createTime", "2013-06-14T20:41:45").unwrap();
        let polled = coercer
            .coerce("lastCapsdPoll", "2013-12-30T00:00:00")
            .unwrap();
        assert_eq!(
            tree,
            Restriction::and(
                Restriction::compare("createTime", ComparisonOp::Gt, created),
                Restriction::or(
                    Restriction::compare(
                        "type",
                        ComparisonOp::Eq,
                        ComparisonValue::RawString("D".to_string())
                    ),
                    Restriction::compare("lastCapsdPoll", ComparisonOp::Le, polled),
                )
            )
        );
    }

    #[test]
    fn test_sentinel_symmetry() {
        for field in ["a", "label", "createTime"] {
            assert_eq!(
                parse(&format!("{}==null", field)).unwrap(),
                parse(&format!("{}!=notNull", field)).unwrap()
            );
            assert_eq!(
                parse(&format!("{}==notNull", field)).unwrap(),
                parse(&format!("{}!=null", field)).unwrap()
            );
        }
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert_eq!(
            parse("(a==1").unwrap_err(),
            QueryError::unmatched_open(0)
        );
        assert!(matches!(
            parse("a==1)").unwrap_err(),
            QueryError::UnbalancedBracket { position: 4, .. }
        ));
        assert!(matches!(
            parse("a==1;(b==2").unwrap_err(),
            QueryError::UnbalancedBracket { position: 5, .. }
        ));
        assert!(matches!(
            parse("a==1;((b==2)").unwrap_err(),
            QueryError::UnbalancedBracket { position: 5, .. }
        ));
        // Stray close inside a group reports its absolute index
        assert!(matches!(
            parse("a==1;(b==2;c==3))").unwrap_err(),
            QueryError::InvalidPivotOperator {
                found: ')',
                position: 16
            }
        ));
        assert!(matches!(
            parse("a==1,b==2)").unwrap_err(),
            QueryError::UnbalancedBracket { position: 9, .. }
        ));
    }

    #[test]
    fn test_double_close_is_invalid_pivot() {
        assert_eq!(
            parse("(a==1))").unwrap_err(),
            QueryError::InvalidPivotOperator {
                found: ')',
                position: 6
            }
        );
    }

    #[test]
    fn test_invalid_pivot_before_bracket() {
        assert_eq!(
            parse("a==1x(b==2)").unwrap_err(),
            QueryError::InvalidPivotOperator {
                found: 'x',
                position: 4
            }
        );
    }

    #[test]
    fn test_invalid_pivot_multibyte() {
        assert_eq!(
            parse("a==1é(b==2)").unwrap_err(),
            QueryError::InvalidPivotOperator {
                found: 'é',
                position: 4
            }
        );
    }

    #[test]
    fn test_invalid_pivot_after_bracket() {
        assert_eq!(
            parse("(a==1)b==2").unwrap_err(),
            QueryError::InvalidPivotOperator {
                found: 'b',
                position: 6
            }
        );
    }

    #[test]
    fn test_empty_sub_expressions() {
        for (query, position) in [
            ("a==1;", 5),
            (";a==1", 0),
            ("a==1;;b==2", 5),
            ("()", 1),
            ("a==1;()", 6),
            ("(a==1);", 7),
            (";(a==1)", 0),
        ] {
            assert_eq!(
                parse(query).unwrap_err(),
                QueryError::EmptyExpression { position },
                "query {}",
                query
            );
        }
    }

    #[test]
    fn test_unsupported_operator_named() {
        assert_eq!(
            parse("a==1;b~=2").unwrap_err(),
            QueryError::UnsupportedOperator {
                fragment: "b~=2".to_string()
            }
        );
    }

    #[test]
    fn test_coercion_error_propagates() {
        assert!(matches!(
            parse("(a==1,b==x)").unwrap_err(),
            QueryError::Coercion { ref field, .. } if field == "b"
        ));
    }

    // ------------------------------------------------------------------
    // Reference oracle
    // ------------------------------------------------------------------

    type Record = HashMap<&'static str, i64>;

    fn eval(tree: &Restriction, record: &Record) -> bool {
        match tree {
            Restriction::Comparison { field, op, value } => {
                let actual = record.get(field.as_str()).copied();
                let expected = match value {
                    Some(ComparisonValue::Integer(v)) => Some(*v),
                    _ => None,
                };
                match (op, actual, expected) {
                    (ComparisonOp::IsNull, a, _) => a.is_none(),
                    (ComparisonOp::IsNotNull, a, _) => a.is_some(),
                    (ComparisonOp::Eq, Some(a), Some(e)) => a == e,
                    (ComparisonOp::Ne, Some(a), Some(e)) => a != e,
                    (ComparisonOp::Lt, Some(a), Some(e)) => a < e,
                    (ComparisonOp::Le, Some(a), Some(e)) => a <= e,
                    (ComparisonOp::Gt, Some(a), Some(e)) => a > e,
                    (ComparisonOp::Ge, Some(a), Some(e)) => a >= e,
                    _ => false,
                }
            }
            Restriction::And { left, right } => eval(left, record) && eval(right, record),
            Restriction::Or { left, right } => eval(left, record) || eval(right, record),
        }
    }

    /// Textbook recursive descent: or := and (',' and)*, and := unit (';' unit)*
    struct Oracle<'a> {
        src: &'a [u8],
        pos: usize,
        record: &'a Record,
    }

    impl Oracle<'_> {
        fn or_expr(&mut self) -> bool {
            let mut value = self.and_expr();
            while self.peek() == Some(b',') {
                self.pos += 1;
                let rhs = self.and_expr();
                value = value || rhs;
            }
            value
        }

        fn and_expr(&mut self) -> bool {
            let mut value = self.unit();
            while self.peek() == Some(b';') {
                self.pos += 1;
                let rhs = self.unit();
                value = value && rhs;
            }
            value
        }

        fn unit(&mut self) -> bool {
            if self.peek() == Some(b'(') {
                self.pos += 1;
                let value = self.or_expr();
                assert_eq!(self.peek(), Some(b')'));
                self.pos += 1;
                return value;
            }
            let start = self.pos;
            while let Some(b) = self.peek() {
                if matches!(b, b';' | b',' | b')') {
                    break;
                }
                self.pos += 1;
            }
            let token = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
            let (field, value) = token.split_once("==").unwrap();
            let value: i64 = value.parse().unwrap();
            self.record.get(field) == Some(&value)
        }

        fn peek(&self) -> Option<u8> {
            self.src.get(self.pos).copied()
        }
    }

    fn oracle(query: &str, record: &Record) -> bool {
        let mut oracle = Oracle {
            src: query.as_bytes(),
            pos: 0,
            record,
        };
        let value = oracle.or_expr();
        assert_eq!(oracle.pos, query.len());
        value
    }

    /// Deterministic generator (64-bit LCG)
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 33) % bound
        }
    }

    fn gen_expr(rng: &mut Lcg, depth: u32) -> String {
        const FIELDS: [&str; 5] = ["a", "b", "c", "d", "e"];
        let terms = 1 + rng.next(4) as usize;
        let mut out = String::new();
        for i in 0..terms {
            if i > 0 {
                out.push(if rng.next(2) == 0 { ';' } else { ',' });
            }
            if depth > 0 && rng.next(3) == 0 {
                out.push('(');
                out.push_str(&gen_expr(rng, depth - 1));
                out.push(')');
            } else {
                let field = FIELDS[rng.next(FIELDS.len() as u64) as usize];
                out.push_str(&format!("{}=={}", field, rng.next(2)));
            }
        }
        if rng.next(5) == 0 {
            out = format!("({})", out);
        }
        out
    }

    #[test]
    fn test_matches_reference_oracle() {
        let mut rng = Lcg(0x5eed);
        let mut records = Vec::new();
        for mask in 0..32u32 {
            let mut record = Record::new();
            for (bit, field) in ["a", "b", "c", "d", "e"].iter().enumerate() {
                record.insert(*field, ((mask >> bit) & 1) as i64);
            }
            records.push(record);
        }

        for _ in 0..300 {
            let query = gen_expr(&mut rng, 3);
            let tree = parse(&query).unwrap_or_else(|e| panic!("{}: {}", query, e));
            for record in &records {
                assert_eq!(
                    eval(&tree, record),
                    oracle(&query, record),
                    "query {} record {:?}",
                    query,
                    record
                );
            }
        }
    }
}
