pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod query;
pub mod time;
pub mod validate;

pub use error::{LogsinkError, Result};
