//! Data storage layer
//!
//! - `duckdb` - Embedded inventory and fault database
//! - `types` - Records and rows returned to the API
//! - `traits` - Repository trait consumed by the HTTP layer
//! - `error` - Unified error type

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod types;

pub use duckdb::DuckdbService;
pub use error::DataError;
pub use traits::SearchRepository;
pub use types::{CategoryRow, EntityRecord, IpInterfaceRow, MonitoredServiceRow, SearchPage};
