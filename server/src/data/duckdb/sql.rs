//! QuerySpec to SQL translation
//!
//! Renders a restriction tree as a parameterized WHERE clause over the
//! entity table aliased `p`. Bind values are collected as strings in
//! placeholder order and typed with explicit casts. Association fields
//! become correlated `EXISTS` sub-queries; AND-joined terms on one alias
//! share a single sub-query, so they must match the same child row.

use chrono::NaiveDateTime;

use super::tables::{Association, ColumnKind, FieldColumn, TableSchema};
use crate::query::{
    ComparisonOp, ComparisonValue, DATE_PATTERN, JoinType, QueryError, QuerySpec, Restriction,
};

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<String>,
}

/// Translated clauses of a search
#[derive(Debug)]
pub struct SearchSql {
    pub where_clause: String,
    pub order_clause: String,
    pub params: Vec<String>,
}

/// DuckDB literal format for TIMESTAMP casts
const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn translate(spec: &QuerySpec, schema: &TableSchema) -> Result<SearchSql, QueryError> {
    let mut params = SqlParams::default();
    let where_clause = match &spec.restriction {
        Some(restriction) => restriction_sql(restriction, spec, schema, &mut params)?,
        None => "1=1".to_string(),
    };
    let order_clause = order_sql(spec, schema)?;

    Ok(SearchSql {
        where_clause,
        order_clause,
        params: params.values,
    })
}

fn restriction_sql(
    restriction: &Restriction,
    spec: &QuerySpec,
    schema: &TableSchema,
    params: &mut SqlParams,
) -> Result<String, QueryError> {
    match restriction {
        Restriction::And { .. } => and_run_sql(restriction, spec, schema, params),
        Restriction::Or { left, right } => Ok(format!(
            "({} OR {})",
            restriction_sql(left, spec, schema, params)?,
            restriction_sql(right, spec, schema, params)?
        )),
        Restriction::Comparison { field, op, value } => match field.split_once('.') {
            Some((alias, child)) => association_sql(
                alias,
                &[AliasedTerm {
                    field: field.as_str(),
                    child,
                    op: *op,
                    value: value.as_ref(),
                }],
                spec,
                schema,
                params,
            ),
            None => {
                let column = schema.field(field).ok_or_else(|| {
                    QueryError::execution(format!(
                        "could not resolve property \"{}\" of {}",
                        field, schema.table
                    ))
                })?;
                match column.kind {
                    ColumnKind::Membership {
                        link,
                        owner,
                        member,
                    } => membership_sql(
                        field,
                        *op,
                        value.as_ref(),
                        &format!("p.{}", schema.key_column),
                        (link, owner, member),
                        params,
                    ),
                    kind => comparison_sql(
                        field,
                        &format!("p.{}", column.column),
                        kind,
                        *op,
                        value.as_ref(),
                        params,
                    ),
                }
            }
        },
    }
}

/// Comparison on a child row reached through an alias
struct AliasedTerm<'a> {
    field: &'a str,
    child: &'a str,
    op: ComparisonOp,
    value: Option<&'a ComparisonValue>,
}

enum Conjunct<'a> {
    Plain(&'a Restriction),
    Aliased(&'a str, Vec<AliasedTerm<'a>>),
}

fn collect_conjuncts<'a>(restriction: &'a Restriction, out: &mut Vec<Conjunct<'a>>) {
    match restriction {
        Restriction::And { left, right } => {
            collect_conjuncts(left, out);
            collect_conjuncts(right, out);
        }
        Restriction::Comparison { field, op, value } => match field.split_once('.') {
            Some((alias, child)) => {
                let term = AliasedTerm {
                    field: field.as_str(),
                    child,
                    op: *op,
                    value: value.as_ref(),
                };
                let group = out.iter_mut().find_map(|c| match c {
                    Conjunct::Aliased(name, terms) if *name == alias => Some(terms),
                    _ => None,
                });
                match group {
                    Some(terms) => terms.push(term),
                    None => out.push(Conjunct::Aliased(alias, vec![term])),
                }
            }
            None => out.push(Conjunct::Plain(restriction)),
        },
        Restriction::Or { .. } => out.push(Conjunct::Plain(restriction)),
    }
}

/// A run of AND-joined terms. Terms on the same alias must hold on the
/// same child row, so they share one `EXISTS`.
fn and_run_sql(
    restriction: &Restriction,
    spec: &QuerySpec,
    schema: &TableSchema,
    params: &mut SqlParams,
) -> Result<String, QueryError> {
    let mut conjuncts = Vec::new();
    collect_conjuncts(restriction, &mut conjuncts);

    let parts = conjuncts
        .iter()
        .map(|conjunct| match conjunct {
            Conjunct::Plain(term) => restriction_sql(term, spec, schema, params),
            Conjunct::Aliased(alias, terms) => association_sql(alias, terms, spec, schema, params),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", parts.join(" AND ")))
}

fn association_sql(
    alias_name: &str,
    terms: &[AliasedTerm<'_>],
    spec: &QuerySpec,
    schema: &TableSchema,
    params: &mut SqlParams,
) -> Result<String, QueryError> {
    let alias = spec.alias(alias_name).ok_or_else(|| {
        let field = terms.first().map_or(alias_name, |t| t.field);
        QueryError::execution(format!(
            "could not resolve property \"{}\": unknown alias \"{}\"",
            field, alias_name
        ))
    })?;
    let association: &Association = schema.association(alias.path).ok_or_else(|| {
        QueryError::execution(format!(
            "could not resolve association \"{}\" of {}",
            alias.path, schema.table
        ))
    })?;

    let mut conditions = Vec::with_capacity(terms.len());
    for term in terms {
        let column: &FieldColumn = association.field(term.child).ok_or_else(|| {
            QueryError::execution(format!(
                "could not resolve property \"{}\" of {}",
                term.child, alias.path
            ))
        })?;
        conditions.push(comparison_sql(
            term.field,
            &format!("c.{}", column.column),
            column.kind,
            term.op,
            term.value,
            params,
        )?);
    }

    let correlated = format!(
        "SELECT 1 FROM {} WHERE {} = p.{}",
        association.from, association.parent_ref, schema.key_column
    );
    let exists = format!("EXISTS ({} AND {})", correlated, conditions.join(" AND "));

    // Outer join: a parent without children has one all-NULL child row
    let null_row_matches = alias.join == JoinType::LeftJoin
        && terms.iter().all(|t| t.op == ComparisonOp::IsNull);
    Ok(if null_row_matches {
        format!("(NOT EXISTS ({}) OR {})", correlated, exists)
    } else {
        exists
    })
}

fn membership_sql(
    field: &str,
    op: ComparisonOp,
    value: Option<&ComparisonValue>,
    key: &str,
    (link, owner, member): (&str, &str, &str),
    params: &mut SqlParams,
) -> Result<String, QueryError> {
    if op.is_ordering() {
        return Err(QueryError::execution(format!(
            "property \"{}\" does not support ordering comparisons",
            field
        )));
    }

    let members = format!("SELECT {} FROM {}", owner, link);
    Ok(match op {
        ComparisonOp::IsNull => format!("{} NOT IN ({})", key, members),
        ComparisonOp::IsNotNull => format!("{} IN ({})", key, members),
        _ => {
            let value = operand(field, value)?;
            let placeholder = bind(field, ColumnKind::Integer, value, params)?;
            let negate = if op == ComparisonOp::Ne { "NOT " } else { "" };
            format!(
                "{} {}IN ({} WHERE {} = {})",
                key, negate, members, member, placeholder
            )
        }
    })
}

fn comparison_sql(
    field: &str,
    column: &str,
    kind: ColumnKind,
    op: ComparisonOp,
    value: Option<&ComparisonValue>,
    params: &mut SqlParams,
) -> Result<String, QueryError> {
    let symbol = match op {
        ComparisonOp::IsNull => return Ok(format!("{} IS NULL", column)),
        ComparisonOp::IsNotNull => return Ok(format!("{} IS NOT NULL", column)),
        ComparisonOp::Eq => "=",
        ComparisonOp::Ne => "<>",
        ComparisonOp::Lt => "<",
        ComparisonOp::Le => "<=",
        ComparisonOp::Gt => ">",
        ComparisonOp::Ge => ">=",
    };
    let placeholder = bind(field, kind, operand(field, value)?, params)?;
    Ok(format!("{} {} {}", column, symbol, placeholder))
}

fn operand<'a>(
    field: &str,
    value: Option<&'a ComparisonValue>,
) -> Result<&'a ComparisonValue, QueryError> {
    value.ok_or_else(|| QueryError::Unexpected(format!("comparison on \"{}\" has no operand", field)))
}

/// Push the value and return its typed placeholder
fn bind(
    field: &str,
    kind: ColumnKind,
    value: &ComparisonValue,
    params: &mut SqlParams,
) -> Result<&'static str, QueryError> {
    let mismatch = || {
        QueryError::execution(format!(
            "type mismatch for property \"{}\": expected {}, got {}",
            field,
            kind.describe(),
            value
        ))
    };

    match (kind, value) {
        (ColumnKind::Text, ComparisonValue::RawString(s)) => {
            params.values.push(s.clone());
            Ok("?")
        }
        (ColumnKind::Integer, ComparisonValue::Integer(v)) => {
            params.values.push(v.to_string());
            Ok("CAST(? AS BIGINT)")
        }
        (ColumnKind::Integer, ComparisonValue::EnumOrdinal(v)) => {
            params.values.push(v.to_string());
            Ok("CAST(? AS BIGINT)")
        }
        (ColumnKind::Integer, ComparisonValue::EntityReference(r)) => {
            params.values.push(r.id.to_string());
            Ok("CAST(? AS BIGINT)")
        }
        (ColumnKind::Integer, ComparisonValue::RawString(s)) => {
            let v: i64 = s.parse().map_err(|_| mismatch())?;
            params.values.push(v.to_string());
            Ok("CAST(? AS BIGINT)")
        }
        (ColumnKind::Timestamp, ComparisonValue::DateTime(ts)) => {
            params.values.push(ts.format(SQL_TIMESTAMP_FORMAT).to_string());
            Ok("CAST(? AS TIMESTAMP)")
        }
        (ColumnKind::Timestamp, ComparisonValue::RawString(s)) => {
            let ts = NaiveDateTime::parse_from_str(s, DATE_PATTERN).map_err(|_| mismatch())?;
            params.values.push(ts.format(SQL_TIMESTAMP_FORMAT).to_string());
            Ok("CAST(? AS TIMESTAMP)")
        }
        _ => Err(mismatch()),
    }
}

fn order_sql(spec: &QuerySpec, schema: &TableSchema) -> Result<String, QueryError> {
    let mut keys = Vec::with_capacity(spec.order.len() + 1);
    let mut has_key = false;

    for key in &spec.order {
        let column = schema
            .field(&key.field)
            .filter(|c| !matches!(c.kind, ColumnKind::Membership { .. }))
            .ok_or_else(|| {
                QueryError::execution(format!(
                    "could not resolve sort property \"{}\" of {}",
                    key.field, schema.table
                ))
            })?;
        has_key |= column.column == schema.key_column;
        keys.push(format!("p.{} {}", column.column, key.direction.as_sql()));
    }

    // Stable paging
    if !has_key {
        keys.push(format!("p.{} ASC", schema.key_column));
    }
    Ok(keys.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::duckdb::tables::{ALARMS, EVENTS, NODES};
    use crate::entities::EntityKind;
    use crate::query::coerce::testing::StaticLookup;
    use crate::query::{FieldCoercer, OrderDirection, SearchRequest, SortKey, assemble};

    fn spec_for(kind: EntityKind, query: &str) -> QuerySpec {
        let lookup = StaticLookup::default();
        let profile = kind.profile();
        let coercer = FieldCoercer::new(profile.coercion, &lookup);
        let request = SearchRequest {
            query: query.to_string(),
            limit: 10,
            offset: 0,
            order_by: String::new(),
            direction: OrderDirection::Asc,
        };
        assemble(&request, &profile.defaults, &coercer).unwrap()
    }

    #[test]
    fn test_match_all() {
        let sql = translate(&spec_for(EntityKind::Alarm, ""), &ALARMS).unwrap();
        assert_eq!(sql.where_clause, "1=1");
        assert_eq!(sql.order_clause, "p.last_event_time DESC, p.id DESC");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn test_node_scenario() {
        let spec = spec_for(
            EntityKind::Node,
            "createTime=gt=2013-06-14T20:41:45;(type==D,lastCapsdPoll=le=2013-12-30T00:00:00)",
        );
        let sql = translate(&spec, &NODES).unwrap();
        assert_eq!(
            sql.where_clause,
            "(p.create_time > CAST(? AS TIMESTAMP) AND (p.node_type = ? OR p.last_capsd_poll <= CAST(? AS TIMESTAMP)))"
        );
        assert_eq!(
            sql.params,
            vec!["2013-06-14 20:41:45", "D", "2013-12-30 00:00:00"]
        );
        assert_eq!(sql.order_clause, "p.label ASC, p.id ASC");
    }

    #[test]
    fn test_severity_binds_ordinal() {
        let sql = translate(&spec_for(EntityKind::Alarm, "severity=ge=MAJOR"), &ALARMS).unwrap();
        assert_eq!(sql.where_clause, "p.severity >= CAST(? AS BIGINT)");
        assert_eq!(sql.params, vec!["6"]);
    }

    #[test]
    fn test_null_checks_bind_nothing() {
        let sql = translate(
            &spec_for(EntityKind::Alarm, "alarmAckUser==null;alarmAckTime!=null"),
            &ALARMS,
        )
        .unwrap();
        assert_eq!(
            sql.where_clause,
            "(p.alarm_ack_user IS NULL AND p.alarm_ack_time IS NOT NULL)"
        );
        assert!(sql.params.is_empty());
    }

    #[test]
    fn test_node_reference_binds_id() {
        let sql = translate(&spec_for(EntityKind::Event, "nodeId==2"), &EVENTS).unwrap();
        assert_eq!(sql.where_clause, "p.node_id = CAST(? AS BIGINT)");
        assert_eq!(sql.params, vec!["2"]);
    }

    #[test]
    fn test_membership() {
        let sql = translate(&spec_for(EntityKind::Node, "categories==Routers"), &NODES).unwrap();
        assert_eq!(
            sql.where_clause,
            "p.id IN (SELECT node_id FROM category_node WHERE category_id = CAST(? AS BIGINT))"
        );
        assert_eq!(sql.params, vec!["2"]);

        let sql = translate(&spec_for(EntityKind::Node, "categories==null"), &NODES).unwrap();
        assert_eq!(
            sql.where_clause,
            "p.id NOT IN (SELECT node_id FROM category_node)"
        );

        let err = translate(&spec_for(EntityKind::Node, "categories=gt=Routers"), &NODES)
            .unwrap_err();
        assert!(matches!(err, QueryError::QueryExecution(_)));
    }

    #[test]
    fn test_association_exists() {
        let sql = translate(
            &spec_for(EntityKind::Node, "ipInterface.ipAddress==10.0.0.1"),
            &NODES,
        )
        .unwrap();
        assert_eq!(
            sql.where_clause,
            "EXISTS (SELECT 1 FROM ip_interfaces c WHERE c.node_id = p.id AND c.ip_address = ?)"
        );
        assert_eq!(sql.params, vec!["10.0.0.1"]);
    }

    #[test]
    fn test_same_alias_terms_share_one_exists() {
        let sql = translate(
            &spec_for(
                EntityKind::Node,
                "ipInterface.ipAddress==10.0.0.1;label==x;ipInterface.snmpPrimary==P",
            ),
            &NODES,
        )
        .unwrap();
        assert_eq!(
            sql.where_clause,
            "(EXISTS (SELECT 1 FROM ip_interfaces c WHERE c.node_id = p.id AND c.ip_address = ? AND c.snmp_primary = ?) AND p.label = ?)"
        );
        assert_eq!(sql.params, vec!["10.0.0.1", "P", "x"]);
    }

    #[test]
    fn test_left_join_null_run_includes_childless() {
        let sql = translate(
            &spec_for(
                EntityKind::Node,
                "snmpInterface.ifName==null;snmpInterface.ifDescr==null",
            ),
            &NODES,
        )
        .unwrap();
        assert!(sql.where_clause.starts_with("((NOT EXISTS (SELECT 1 FROM snmp_interfaces c"));

        let sql = translate(
            &spec_for(
                EntityKind::Node,
                "snmpInterface.ifName==null;snmpInterface.ifDescr==x",
            ),
            &NODES,
        )
        .unwrap();
        assert!(!sql.where_clause.contains("NOT EXISTS"));
    }

    #[test]
    fn test_left_join_is_null_includes_childless() {
        let sql = translate(&spec_for(EntityKind::Node, "snmpInterface.ifName==null"), &NODES)
            .unwrap();
        assert_eq!(
            sql.where_clause,
            "(NOT EXISTS (SELECT 1 FROM snmp_interfaces c WHERE c.node_id = p.id) OR EXISTS (SELECT 1 FROM snmp_interfaces c WHERE c.node_id = p.id AND c.if_name IS NULL))"
        );
    }

    #[test]
    fn test_inner_join_requires_child() {
        let mut spec = spec_for(EntityKind::Node, "ipInterface.ipHostName==null");
        for alias in &mut spec.aliases {
            alias.join = JoinType::InnerJoin;
        }
        let sql = translate(&spec, &NODES).unwrap();
        assert_eq!(
            sql.where_clause,
            "EXISTS (SELECT 1 FROM ip_interfaces c WHERE c.node_id = p.id AND c.ip_hostname IS NULL)"
        );
    }

    #[test]
    fn test_category_alias_uses_link_table() {
        let sql = translate(&spec_for(EntityKind::Node, "category.name==Servers"), &NODES)
            .unwrap();
        assert_eq!(
            sql.where_clause,
            "EXISTS (SELECT 1 FROM category_node l JOIN categories c ON c.id = l.category_id WHERE l.node_id = p.id AND c.name = ?)"
        );
    }

    #[test]
    fn test_unknown_field_is_execution_error() {
        let err = translate(&spec_for(EntityKind::Alarm, "bogus==1"), &ALARMS).unwrap_err();
        assert_eq!(err.code(), "QUERY_EXECUTION");
        assert!(err.to_string().contains("bogus"));

        let err = translate(&spec_for(EntityKind::Node, "nope.field==1"), &NODES).unwrap_err();
        assert!(err.to_string().contains("nope"));

        let err =
            translate(&spec_for(EntityKind::Node, "ipInterface.bogus==1"), &NODES).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_type_mismatch_is_execution_error() {
        // nodeId is an integer column without coercion on alarms
        let err = translate(&spec_for(EntityKind::Alarm, "nodeId==web01"), &ALARMS).unwrap_err();
        assert!(matches!(err, QueryError::QueryExecution(_)));

        // ...but a numeric literal is accepted
        let sql = translate(&spec_for(EntityKind::Alarm, "nodeId==1"), &ALARMS).unwrap();
        assert_eq!(sql.params, vec!["1"]);
    }

    #[test]
    fn test_order_by_override_and_unknown_sort() {
        let mut spec = spec_for(EntityKind::Alarm, "");
        spec.order = vec![SortKey {
            field: "id".to_string(),
            direction: OrderDirection::Asc,
        }];
        assert_eq!(translate(&spec, &ALARMS).unwrap().order_clause, "p.id ASC");

        spec.order[0].field = "nope".to_string();
        assert!(matches!(
            translate(&spec, &ALARMS).unwrap_err(),
            QueryError::QueryExecution(_)
        ));
    }

    #[test]
    fn test_params_follow_placeholder_order() {
        let sql = translate(
            &spec_for(EntityKind::Alarm, "(uei==a,uei==b);(counter=gt=3,id==4)"),
            &ALARMS,
        )
        .unwrap();
        assert_eq!(sql.params, vec!["a", "b", "3", "4"]);
    }
}
