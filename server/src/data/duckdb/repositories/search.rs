//! Entity search repository
//!
//! A search assembles the filter on the database thread so that foreign
//! lookups, the count and the page query all run on one connection.

use duckdb::{Connection, Row};
use serde_json::Value;

use crate::data::duckdb::error::DuckdbError;
use crate::data::duckdb::lookup::DuckdbLookup;
use crate::data::duckdb::sql;
use crate::data::duckdb::tables::{self, ColumnKind, TableSchema};
use crate::data::error::DataError;
use crate::data::types::{EntityRecord, SearchPage};
use crate::entities::EntityKind;
use crate::query::{FieldCoercer, QueryError, SearchRequest, assemble};
use crate::utils::time::{format_timestamp, micros_to_naive};

pub fn search(
    conn: &Connection,
    kind: EntityKind,
    request: &SearchRequest,
) -> Result<SearchPage, DataError> {
    let profile = kind.profile();
    let lookup = DuckdbLookup::new(conn);
    let coercer = FieldCoercer::new(profile.coercion, &lookup);
    let spec = assemble(request, &profile.defaults, &coercer)?;

    let schema = tables::schema(kind);
    let translated = sql::translate(&spec, schema)?;
    tracing::debug!(
        entity = %kind,
        restriction = %spec.restriction.as_ref().map(|r| r.to_string()).unwrap_or_default(),
        where_clause = %translated.where_clause,
        "Translated search"
    );

    let count_sql = format!(
        "SELECT COUNT(*) FROM {} p WHERE {}",
        schema.table, translated.where_clause
    );
    let total = execute_count(conn, &count_sql, &translated.params).map_err(execution_error)?;

    let data_sql = format!(
        "SELECT {} FROM {} p WHERE {} ORDER BY {} LIMIT {} OFFSET {}",
        select_list(schema),
        schema.table,
        translated.where_clause,
        translated.order_clause,
        spec.limit,
        spec.offset
    );
    let records =
        query_records(conn, schema, &data_sql, &translated.params).map_err(execution_error)?;

    Ok(SearchPage { records, total })
}

pub fn get_by_id(
    conn: &Connection,
    kind: EntityKind,
    id: i64,
) -> Result<Option<EntityRecord>, DuckdbError> {
    let schema = tables::schema(kind);
    let sql = format!(
        "SELECT {} FROM {} p WHERE p.{} = CAST(? AS BIGINT)",
        select_list(schema),
        schema.table,
        schema.key_column
    );
    let mut records = query_records(conn, schema, &sql, &[id.to_string()])?;
    Ok(records.pop())
}

/// Failures while running an assembled spec are reported as query errors
fn execution_error(e: DuckdbError) -> DataError {
    match e {
        DuckdbError::Database(e) => QueryError::execution(e.to_string()).into(),
        other => other.into(),
    }
}

/// Column list matching [`TableSchema::output_fields`]
pub(crate) fn select_list(schema: &TableSchema) -> String {
    schema
        .output_fields()
        .map(|f| match f.kind {
            ColumnKind::Timestamp => format!("epoch_us(p.{})", f.column),
            _ => format!("p.{}", f.column),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn query_records(
    conn: &Connection,
    schema: &TableSchema,
    sql: &str,
    bind_values: &[String],
) -> Result<Vec<EntityRecord>, DuckdbError> {
    let mut stmt = conn.prepare(sql)?;
    let params: Vec<&dyn duckdb::ToSql> = bind_values
        .iter()
        .map(|v| v as &dyn duckdb::ToSql)
        .collect();
    let mut rows = stmt.query(params.as_slice())?;
    let mut records = vec![];

    while let Some(row) = rows.next()? {
        records.push(row_to_record(row, schema)?);
    }
    Ok(records)
}

fn row_to_record(row: &Row<'_>, schema: &TableSchema) -> Result<EntityRecord, DuckdbError> {
    let mut record = EntityRecord::new();
    for (i, field) in schema.output_fields().enumerate() {
        let value = match field.kind {
            ColumnKind::Text => row.get::<_, Option<String>>(i)?.map(Value::from),
            ColumnKind::Integer => row.get::<_, Option<i64>>(i)?.map(Value::from),
            ColumnKind::Timestamp => row
                .get::<_, Option<i64>>(i)?
                .map(|us| Value::from(format_timestamp(&micros_to_naive(us)))),
            ColumnKind::Membership { .. } => None,
        };
        record.insert(field.name.to_string(), value.unwrap_or(Value::Null));
    }
    Ok(record)
}

fn execute_count(conn: &Connection, sql: &str, bind_values: &[String]) -> Result<u64, DuckdbError> {
    let mut stmt = conn.prepare(sql)?;
    let params: Vec<&dyn duckdb::ToSql> = bind_values
        .iter()
        .map(|v| v as &dyn duckdb::ToSql)
        .collect();
    let count: i64 = stmt.query_row(params.as_slice(), |row| row.get(0))?;
    Ok(count as u64)
}
