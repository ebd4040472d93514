//! Foreign-entity lookups on an open connection
//!
//! Runs inside the same blocking task that executes the search, so value
//! coercion and the query share one connection lock.

use duckdb::{Connection, OptionalExt};

use crate::query::{EntityLookup, EntityRef, LookupTarget, QueryError};

pub struct DuckdbLookup<'c> {
    conn: &'c Connection,
}

impl<'c> DuckdbLookup<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl EntityLookup for DuckdbLookup<'_> {
    fn lookup(&self, target: LookupTarget, key: &str) -> Result<Option<EntityRef>, QueryError> {
        let sql = match target {
            LookupTarget::Category => "SELECT id, name FROM categories WHERE name = ?",
            LookupTarget::Node => "SELECT id, label FROM nodes WHERE id = TRY_CAST(? AS BIGINT)",
        };

        self.conn
            .query_row(sql, [key], |row| {
                Ok(EntityRef {
                    target,
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()
            .map_err(|e| {
                tracing::error!(error = %e, ?target, key, "Entity lookup failed");
                QueryError::Unexpected(format!("lookup failed: {}", e))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::duckdb::{fixtures, migrations};

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        migrations::run_migrations(&conn).expect("migrations");
        fixtures::seed(&conn).expect("fixtures");
        conn
    }

    #[test]
    fn test_category_by_name() {
        let conn = seeded();
        let lookup = DuckdbLookup::new(&conn);
        let found = lookup
            .lookup(LookupTarget::Category, "Routers")
            .unwrap()
            .expect("Routers exists");
        assert_eq!(found.id, 2);
        assert_eq!(found.target, LookupTarget::Category);

        assert!(
            lookup
                .lookup(LookupTarget::Category, "routers")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_node_by_id() {
        let conn = seeded();
        let lookup = DuckdbLookup::new(&conn);
        let found = lookup.lookup(LookupTarget::Node, "3").unwrap().unwrap();
        assert_eq!(found.name, "db01");
        assert!(lookup.lookup(LookupTarget::Node, "99").unwrap().is_none());
        assert!(lookup.lookup(LookupTarget::Node, "abc").unwrap().is_none());
    }
}
