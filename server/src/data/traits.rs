//! Repository trait for the search backend
//!
//! The HTTP layer only sees this trait; DuckDB implements it for
//! `Arc<DuckdbService>`.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    CategoryRow, EntityRecord, IpInterfaceRow, MonitoredServiceRow, SearchPage,
};
use crate::entities::EntityKind;
use crate::query::SearchRequest;

#[async_trait]
pub trait SearchRepository: Send + Sync {
    // ==================== Filtered Search ====================

    /// Translate the request's filter and return one page plus the total count
    async fn search(&self, kind: EntityKind, request: &SearchRequest)
    -> Result<SearchPage, DataError>;

    /// Fetch a single record by primary key
    async fn get_by_id(&self, kind: EntityKind, id: i64) -> Result<Option<EntityRecord>, DataError>;

    // ==================== Node Inventory ====================

    /// `None` when the node does not exist
    async fn list_ip_interfaces(
        &self,
        node_id: i64,
    ) -> Result<Option<Vec<IpInterfaceRow>>, DataError>;

    async fn get_ip_interface(
        &self,
        node_id: i64,
        ip_address: &str,
    ) -> Result<Option<IpInterfaceRow>, DataError>;

    /// `None` when the node has no interface with this address
    async fn list_services(
        &self,
        node_id: i64,
        ip_address: &str,
    ) -> Result<Option<Vec<MonitoredServiceRow>>, DataError>;

    async fn get_service(
        &self,
        node_id: i64,
        ip_address: &str,
        service_name: &str,
    ) -> Result<Option<MonitoredServiceRow>, DataError>;

    async fn list_categories(&self) -> Result<Vec<CategoryRow>, DataError>;

    /// Nodes in any of the named categories; `None` if a name is unknown
    async fn nodes_by_categories(
        &self,
        names: &[String],
    ) -> Result<Option<Vec<EntityRecord>>, DataError>;

    async fn nodes_by_category(&self, name: &str) -> Result<Option<Vec<EntityRecord>>, DataError>;

    async fn nodes_by_foreign_source(
        &self,
        foreign_source: &str,
    ) -> Result<Vec<EntityRecord>, DataError>;
}
