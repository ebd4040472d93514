//! Query assembler

use super::coerce::ValueCoercer;
use super::error::QueryError;
use super::spec::{EntityDefaults, QuerySpec, SearchRequest, SortKey};
use super::splitter::parse_filter;

/// Combine a filter expression with ordering and paging, seeded from the
/// entity defaults. An explicit `order_by` replaces the default order
/// entirely.
pub fn assemble(
    request: &SearchRequest,
    defaults: &EntityDefaults,
    coercer: &dyn ValueCoercer,
) -> Result<QuerySpec, QueryError> {
    let order = if request.order_by.is_empty() {
        defaults.sort_keys()
    } else {
        vec![SortKey {
            field: request.order_by.clone(),
            direction: request.direction,
        }]
    };

    let restriction = if request.query.is_empty() {
        None
    } else {
        Some(parse_filter(&request.query, coercer)?)
    };

    Ok(QuerySpec {
        restriction,
        order,
        limit: request.limit,
        offset: request.offset,
        aliases: defaults.aliases.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::coerce::testing::StaticLookup;
    use crate::query::coerce::{CoercionRule, CoercionTable, FieldCoercer, OrdinalDomain};
    use crate::query::restriction::{ComparisonOp, ComparisonValue, Restriction};
    use crate::query::spec::{Alias, JoinType, OrderDirection};

    const RULES: CoercionTable = &[
        ("createTime", CoercionRule::Timestamp),
        ("lastCapsdPoll", CoercionRule::Timestamp),
        ("severity", CoercionRule::Ordinal(OrdinalDomain::Severity)),
    ];

    const DEFAULTS: EntityDefaults = EntityDefaults {
        order: &[("label", OrderDirection::Asc)],
        aliases: &[Alias {
            path: "ipInterfaces",
            alias: "ipInterface",
            join: JoinType::LeftJoin,
        }],
    };

    fn request(query: &str, order_by: &str, direction: OrderDirection) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            limit: 10,
            offset: 0,
            order_by: order_by.to_string(),
            direction,
        }
    }

    fn run(req: &SearchRequest) -> Result<QuerySpec, QueryError> {
        let lookup = StaticLookup::default();
        let coercer = FieldCoercer::new(RULES, &lookup);
        assemble(req, &DEFAULTS, &coercer)
    }

    #[test]
    fn test_empty_query_matches_all_with_default_order() {
        let spec = run(&request("", "", OrderDirection::Asc)).unwrap();
        assert!(spec.restriction.is_none());
        assert_eq!(spec.order, DEFAULTS.sort_keys());
        assert_eq!(spec.limit, 10);
        assert_eq!(spec.offset, 0);
        assert_eq!(spec.aliases, DEFAULTS.aliases.to_vec());
    }

    #[test]
    fn test_order_by_replaces_defaults() {
        let mut req = request("", "createTime", OrderDirection::Desc);
        req.limit = 25;
        req.offset = 50;
        let spec = run(&req).unwrap();
        assert_eq!(
            spec.order,
            vec![SortKey {
                field: "createTime".to_string(),
                direction: OrderDirection::Desc,
            }]
        );
        assert_eq!(spec.limit, 25);
        assert_eq!(spec.offset, 50);
    }

    #[test]
    fn test_node_scenario() {
        let spec = run(&request(
            "createTime=gt=2013-06-14T20:41:45;(type==D,lastCapsdPoll=le=2013-12-30T00:00:00)",
            "",
            OrderDirection::Asc,
        ))
        .unwrap();

        let tree = spec.restriction.unwrap();
        assert_eq!(
            tree.to_string(),
            "AND(createTime > 2013-06-14T20:41:45, OR(type = \"D\", lastCapsdPoll <= 2013-12-30T00:00:00))"
        );
        assert_eq!(spec.order, DEFAULTS.sort_keys());
        assert_eq!(spec.limit, 10);
        assert_eq!(spec.offset, 0);
    }

    #[test]
    fn test_severity_ordinal() {
        let spec = run(&request("severity==7", "", OrderDirection::Asc)).unwrap();
        assert_eq!(
            spec.restriction,
            Some(Restriction::compare(
                "severity",
                ComparisonOp::Eq,
                ComparisonValue::EnumOrdinal(7)
            ))
        );
    }

    #[test]
    fn test_parse_failure_is_all_or_nothing() {
        let err = run(&request("a~=1", "", OrderDirection::Asc)).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnsupportedOperator {
                fragment: "a~=1".to_string()
            }
        );
    }
}
