// Postgres store - runs table statements through a deadpool of tokio-postgres clients
//
// - config: options and required-field validation
// - params: RowValues as tokio-postgres parameters
// - query: result extraction
// - connection: the StoreConnection implementation

pub mod config;
mod connection;
pub mod params;
pub mod query;

pub use config::PostgresOptions;
pub use connection::PostgresStore;
pub use query::build_result_set;
