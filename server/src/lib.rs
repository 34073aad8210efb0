//! A small HTTP service serving random quotes from named, file-backed collections.

pub mod database;
pub mod error;
pub mod query;
pub mod registry;
pub mod server;
pub mod templates;
pub mod util;
