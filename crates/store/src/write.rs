use std::time::Instant;

use duckdb::params;
use logsink_core::error::{LogsinkError, Result};
use logsink_core::model::log::{LogRecord, NewLogRecord};
use logsink_core::time::received_at_now;

use crate::Store;

impl Store {
    pub fn append(&self, record: &NewLogRecord) -> Result<LogRecord> {
        let mut stored = self.append_all(std::slice::from_ref(record))?;
        stored
            .pop()
            .ok_or_else(|| LogsinkError::Internal("append returned no record".to_string()))
    }

    /// Appends every record in one transaction and returns them as stored.
    ///
    /// Returns only after the commit succeeded; on any error nothing from the
    /// slice is visible.
    pub fn append_all(&self, records: &[NewLogRecord]) -> Result<Vec<LogRecord>> {
        self.append_all_before(records, None)
    }

    /// Like `append_all`, but rolls the transaction back instead of
    /// committing once `deadline` has passed.
    pub fn append_all_before(
        &self,
        records: &[NewLogRecord],
        deadline: Option<Instant>,
    ) -> Result<Vec<LogRecord>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| LogsinkError::Store(format!("begin tx failed: {e}")))?;

        let mut stored = Vec::with_capacity(records.len());
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO logs (id, \"timestamp\", service, severity, message, received_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .map_err(|e| LogsinkError::Store(format!("prepare insert logs failed: {e}")))?;

            for record in records {
                let id = tx
                    .query_row("SELECT nextval('logs_id_seq')", [], |row| row.get::<_, i64>(0))
                    .map_err(|e| LogsinkError::Store(format!("allocate log id failed: {e}")))?;
                let received_at = received_at_now();
                insert
                    .execute(params![
                        id,
                        record.timestamp,
                        record.service,
                        record.severity,
                        record.message,
                        received_at,
                    ])
                    .map_err(|e| LogsinkError::Store(format!("insert log failed: {e}")))?;
                stored.push(record.clone().into_stored(id, received_at));
            }
        }

        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            tx.rollback()
                .map_err(|e| LogsinkError::Store(format!("rollback logs failed: {e}")))?;
            return Err(LogsinkError::Timeout(format!(
                "deadline passed before committing {} log records",
                records.len()
            )));
        }

        tx.commit()
            .map_err(|e| LogsinkError::Store(format!("commit logs failed: {e}")))?;
        tracing::debug!(count = stored.len(), "appended log records");
        Ok(stored)
    }
}
