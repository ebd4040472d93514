pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod entities;
pub mod query;
pub mod utils;
