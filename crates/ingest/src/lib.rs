pub mod coordinator;
pub mod http;
pub mod server;

pub use coordinator::{IngestError, IngestReport, Ingestor};
