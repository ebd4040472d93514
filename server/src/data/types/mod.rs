//! Shared data types returned by the data layer

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

/// A single search result, keyed by filter field name.
///
/// Timestamps are rendered as `yyyy-MM-dd'T'HH:mm:ss` strings.
pub type EntityRecord = serde_json::Map<String, serde_json::Value>;

/// One page of search results plus the unpaged match count
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub records: Vec<EntityRecord>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IpInterfaceRow {
    pub id: i64,
    pub node_id: i64,
    pub ip_address: String,
    pub ip_host_name: Option<String>,
    pub is_managed: Option<String>,
    pub snmp_primary: Option<String>,
    #[schema(value_type = Option<String>, example = "2013-12-01T10:00:00")]
    pub last_capsd_poll: Option<NaiveDateTime>,
}

/// A service polled on one IP interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredServiceRow {
    pub id: i64,
    pub node_id: i64,
    pub ip_address: String,
    pub service_name: String,
    pub status: Option<String>,
    #[schema(value_type = Option<String>, example = "2013-12-01T10:00:00")]
    pub last_good: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>)]
    pub last_fail: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}
