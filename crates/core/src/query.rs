use serde::{Deserialize, Serialize};

use crate::model::log::LogRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    pub logs: Vec<LogRecord>,
    pub count: usize,
}

impl QueryResponse {
    pub fn new(logs: Vec<LogRecord>) -> Self {
        Self {
            count: logs.len(),
            logs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestResponse {
    pub message: String,
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub db_path: String,
    pub db_size_bytes: u64,
    pub logs_count: usize,
    pub oldest_received_at: Option<String>,
    pub newest_received_at: Option<String>,
}
