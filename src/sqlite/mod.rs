// SQLite store - runs table statements through pooled rusqlite connections
//
// - config: options, builder and the bb8 connection manager
// - params: conversion from RowValues to rusqlite values
// - query: result extraction
// - connection: the StoreConnection implementation

pub mod config;
mod connection;
pub mod params;
pub mod query;

pub use config::{SharedSqliteConnection, SqliteManager, SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteStore;
pub use params::Params;
pub use query::build_result_set;
