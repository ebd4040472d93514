//! Node inventory queries outside the filter language

use duckdb::{Connection, OptionalExt, Row};

use crate::data::duckdb::error::DuckdbError;
use crate::data::duckdb::tables::NODES;
use crate::data::types::{CategoryRow, EntityRecord, IpInterfaceRow, MonitoredServiceRow};
use crate::utils::time::micros_to_naive;

use super::search::{query_records, select_list};

const IP_INTERFACE_COLUMNS: &str = "id, node_id, ip_address, ip_hostname, is_managed, \
     snmp_primary, epoch_us(last_capsd_poll)";

const SERVICE_COLUMNS: &str = "s.id, i.node_id, i.ip_address, s.service_name, s.status, \
     epoch_us(s.last_good), epoch_us(s.last_fail)";

fn node_exists(conn: &Connection, node_id: i64) -> Result<bool, DuckdbError> {
    let found = conn
        .query_row("SELECT 1 FROM nodes WHERE id = ?", [node_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn map_ip_interface(row: &Row<'_>) -> Result<IpInterfaceRow, duckdb::Error> {
    Ok(IpInterfaceRow {
        id: row.get(0)?,
        node_id: row.get(1)?,
        ip_address: row.get(2)?,
        ip_host_name: row.get(3)?,
        is_managed: row.get(4)?,
        snmp_primary: row.get(5)?,
        last_capsd_poll: row.get::<_, Option<i64>>(6)?.map(micros_to_naive),
    })
}

/// IP interfaces of a node; `None` when the node does not exist
pub fn list_ip_interfaces(
    conn: &Connection,
    node_id: i64,
) -> Result<Option<Vec<IpInterfaceRow>>, DuckdbError> {
    if !node_exists(conn, node_id)? {
        return Ok(None);
    }

    let sql = format!(
        "SELECT {} FROM ip_interfaces WHERE node_id = ? ORDER BY ip_address",
        IP_INTERFACE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([node_id], map_ip_interface)?;
    let interfaces = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(Some(interfaces))
}

pub fn get_ip_interface(
    conn: &Connection,
    node_id: i64,
    ip_address: &str,
) -> Result<Option<IpInterfaceRow>, DuckdbError> {
    let sql = format!(
        "SELECT {} FROM ip_interfaces WHERE node_id = ? AND ip_address = ?",
        IP_INTERFACE_COLUMNS
    );
    let row = conn
        .query_row(&sql, duckdb::params![node_id, ip_address], map_ip_interface)
        .optional()?;
    Ok(row)
}

fn map_service(row: &Row<'_>) -> Result<MonitoredServiceRow, duckdb::Error> {
    Ok(MonitoredServiceRow {
        id: row.get(0)?,
        node_id: row.get(1)?,
        ip_address: row.get(2)?,
        service_name: row.get(3)?,
        status: row.get(4)?,
        last_good: row.get::<_, Option<i64>>(5)?.map(micros_to_naive),
        last_fail: row.get::<_, Option<i64>>(6)?.map(micros_to_naive),
    })
}

/// Services on one interface; `None` when the node has no such interface
pub fn list_services(
    conn: &Connection,
    node_id: i64,
    ip_address: &str,
) -> Result<Option<Vec<MonitoredServiceRow>>, DuckdbError> {
    if get_ip_interface(conn, node_id, ip_address)?.is_none() {
        return Ok(None);
    }

    let sql = format!(
        "SELECT {} FROM monitored_services s JOIN ip_interfaces i ON i.id = s.ip_interface_id \
         WHERE i.node_id = ? AND i.ip_address = ? ORDER BY s.service_name",
        SERVICE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(duckdb::params![node_id, ip_address], map_service)?;
    Ok(Some(rows.collect::<Result<Vec<_>, _>>()?))
}

pub fn get_service(
    conn: &Connection,
    node_id: i64,
    ip_address: &str,
    service_name: &str,
) -> Result<Option<MonitoredServiceRow>, DuckdbError> {
    let sql = format!(
        "SELECT {} FROM monitored_services s JOIN ip_interfaces i ON i.id = s.ip_interface_id \
         WHERE i.node_id = ? AND i.ip_address = ? AND s.service_name = ?",
        SERVICE_COLUMNS
    );
    let row = conn
        .query_row(
            &sql,
            duckdb::params![node_id, ip_address, service_name],
            map_service,
        )
        .optional()?;
    Ok(row)
}

pub fn list_categories(conn: &Connection) -> Result<Vec<CategoryRow>, DuckdbError> {
    let mut stmt = conn.prepare("SELECT id, name, description FROM categories ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(CategoryRow {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn category_id(conn: &Connection, name: &str) -> Result<Option<i64>, DuckdbError> {
    Ok(conn
        .query_row("SELECT id FROM categories WHERE name = ?", [name], |row| {
            row.get(0)
        })
        .optional()?)
}

/// Nodes belonging to any of the named categories.
///
/// `None` when one of the names is not a known category.
pub fn nodes_by_categories(
    conn: &Connection,
    names: &[String],
) -> Result<Option<Vec<EntityRecord>>, DuckdbError> {
    if names.is_empty() {
        return Ok(Some(vec![]));
    }

    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        match category_id(conn, name)? {
            Some(id) => ids.push(id.to_string()),
            None => {
                tracing::debug!(category = %name, "Unknown category");
                return Ok(None);
            }
        }
    }

    let placeholders = vec!["CAST(? AS BIGINT)"; ids.len()].join(", ");
    let sql = format!(
        "SELECT {} FROM nodes p WHERE p.id IN \
         (SELECT node_id FROM category_node WHERE category_id IN ({})) \
         ORDER BY p.label ASC, p.id ASC",
        select_list(&NODES),
        placeholders
    );
    query_records(conn, &NODES, &sql, &ids).map(Some)
}

/// Nodes in a single category; `None` when the category is unknown
pub fn nodes_by_category(
    conn: &Connection,
    name: &str,
) -> Result<Option<Vec<EntityRecord>>, DuckdbError> {
    nodes_by_categories(conn, &[name.to_string()])
}

pub fn nodes_by_foreign_source(
    conn: &Connection,
    foreign_source: &str,
) -> Result<Vec<EntityRecord>, DuckdbError> {
    let sql = format!(
        "SELECT {} FROM nodes p WHERE p.foreign_source = ? ORDER BY p.label ASC, p.id ASC",
        select_list(&NODES)
    );
    query_records(conn, &NODES, &sql, &[foreign_source.to_string()])
}
