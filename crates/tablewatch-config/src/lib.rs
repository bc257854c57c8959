//! Configuration for the tablewatch binary.
//!
//! All runtime settings come from the environment (optionally seeded from a
//! dotenv file by the binary) plus a couple of CLI overrides. The lookups
//! happen exactly once, at startup, into an explicit [`Config`] value that
//! the rest of the program receives by reference.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::validate_proxy_url;
pub use schema::Config;
