use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    pub id: i64,
    pub timestamp: String,
    pub service: String,
    pub severity: String,
    pub message: String,
    pub received_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewLogRecord {
    pub timestamp: String,
    pub service: String,
    pub severity: String,
    pub message: String,
}

impl NewLogRecord {
    pub fn into_stored(self, id: i64, received_at: String) -> LogRecord {
        LogRecord {
            id,
            timestamp: self.timestamp,
            service: self.service,
            severity: self.severity,
            message: self.message,
            received_at,
        }
    }
}
