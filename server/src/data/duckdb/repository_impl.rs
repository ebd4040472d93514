//! SearchRepository trait implementation for DuckDB
//!
//! Implemented for `Arc<DuckdbService>` rather than `DuckdbService` because
//! the connection guard is not `Send`: each call clones the Arc and takes the
//! connection inside the blocking closure.

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::SearchRepository;
use crate::data::types::{
    CategoryRow, EntityRecord, IpInterfaceRow, MonitoredServiceRow, SearchPage,
};
use crate::entities::EntityKind;
use crate::query::SearchRequest;

use super::DuckdbService;
use super::repositories::{nodes, search};

#[async_trait]
impl SearchRepository for Arc<DuckdbService> {
    // ==================== Filtered Search ====================

    async fn search(
        &self,
        kind: EntityKind,
        request: &SearchRequest,
    ) -> Result<SearchPage, DataError> {
        let db = Arc::clone(self);
        let request = request.clone();
        self.run_query(move || {
            let conn = db.conn()?;
            search::search(&conn, kind, &request)
        })
        .await
        .map_err(DataError::from)?
    }

    async fn get_by_id(&self, kind: EntityKind, id: i64) -> Result<Option<EntityRecord>, DataError> {
        let db = Arc::clone(self);
        self.run_query(move || {
            let conn = db.conn()?;
            search::get_by_id(&conn, kind, id)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    // ==================== Node Inventory ====================

    async fn list_ip_interfaces(
        &self,
        node_id: i64,
    ) -> Result<Option<Vec<IpInterfaceRow>>, DataError> {
        let db = Arc::clone(self);
        self.run_query(move || {
            let conn = db.conn()?;
            nodes::list_ip_interfaces(&conn, node_id)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn get_ip_interface(
        &self,
        node_id: i64,
        ip_address: &str,
    ) -> Result<Option<IpInterfaceRow>, DataError> {
        let db = Arc::clone(self);
        let ip = ip_address.to_string();
        self.run_query(move || {
            let conn = db.conn()?;
            nodes::get_ip_interface(&conn, node_id, &ip)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn list_services(
        &self,
        node_id: i64,
        ip_address: &str,
    ) -> Result<Option<Vec<MonitoredServiceRow>>, DataError> {
        let db = Arc::clone(self);
        let ip = ip_address.to_string();
        self.run_query(move || {
            let conn = db.conn()?;
            nodes::list_services(&conn, node_id, &ip)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn get_service(
        &self,
        node_id: i64,
        ip_address: &str,
        service_name: &str,
    ) -> Result<Option<MonitoredServiceRow>, DataError> {
        let db = Arc::clone(self);
        let ip = ip_address.to_string();
        let service = service_name.to_string();
        self.run_query(move || {
            let conn = db.conn()?;
            nodes::get_service(&conn, node_id, &ip, &service)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRow>, DataError> {
        let db = Arc::clone(self);
        self.run_query(move || {
            let conn = db.conn()?;
            nodes::list_categories(&conn)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn nodes_by_categories(
        &self,
        names: &[String],
    ) -> Result<Option<Vec<EntityRecord>>, DataError> {
        let db = Arc::clone(self);
        let names = names.to_vec();
        self.run_query(move || {
            let conn = db.conn()?;
            nodes::nodes_by_categories(&conn, &names)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn nodes_by_category(&self, name: &str) -> Result<Option<Vec<EntityRecord>>, DataError> {
        let db = Arc::clone(self);
        let name = name.to_string();
        self.run_query(move || {
            let conn = db.conn()?;
            nodes::nodes_by_category(&conn, &name)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn nodes_by_foreign_source(
        &self,
        foreign_source: &str,
    ) -> Result<Vec<EntityRecord>, DataError> {
        let db = Arc::clone(self);
        let fs = foreign_source.to_string();
        self.run_query(move || {
            let conn = db.conn()?;
            nodes::nodes_by_foreign_source(&conn, &fs)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }
}
