//! Synchronous DuckDB query functions
//!
//! Each function takes a borrowed connection; async wrappers live in
//! `repository_impl`.

pub mod nodes;
pub mod search;
