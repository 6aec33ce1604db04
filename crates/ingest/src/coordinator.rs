use std::sync::Arc;
use std::time::Instant;

use logsink_core::auth::CredentialStore;
use logsink_core::error::LogsinkError;
use logsink_core::validate::validate_record;
use logsink_store::Store;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

pub const BATCH_KEY: &str = "logs";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unauthorized: missing or invalid producer token")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Storage(#[from] LogsinkError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Clone)]
pub struct Ingestor {
    credentials: Arc<CredentialStore>,
    store: Store,
}

impl Ingestor {
    pub fn new(credentials: CredentialStore, store: Store) -> Self {
        Self {
            credentials: Arc::new(credentials),
            store,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Invalid entries are dropped and counted. Once the credential and the
    /// envelope check out the batch succeeds, even with nothing accepted.
    pub fn ingest(
        &self,
        auth_header: Option<&str>,
        payload: Option<&Value>,
    ) -> Result<IngestReport, IngestError> {
        self.ingest_before(auth_header, payload, None)
    }

    pub fn ingest_before(
        &self,
        auth_header: Option<&str>,
        payload: Option<&Value>,
        deadline: Option<Instant>,
    ) -> Result<IngestReport, IngestError> {
        if !self.credentials.authorize(auth_header) {
            return Err(IngestError::Unauthorized);
        }

        let entries = batch_entries(payload)?;

        let mut accepted = Vec::with_capacity(entries.len());
        let mut rejected = 0;
        for (index, entry) in entries.iter().enumerate() {
            match validate_record(entry) {
                Ok(record) => accepted.push(record),
                Err(reason) => {
                    debug!(index, %reason, "dropping invalid log entry");
                    rejected += 1;
                }
            }
        }

        let stored = self.store.append_all_before(&accepted, deadline)?;
        info!(accepted = stored.len(), rejected, "log batch ingested");
        Ok(IngestReport {
            accepted: stored.len(),
            rejected,
        })
    }
}

fn batch_entries(payload: Option<&Value>) -> Result<&Vec<Value>, IngestError> {
    let Some(Value::Object(body)) = payload else {
        return Err(IngestError::BadRequest(
            "expected a JSON object of the form {\"logs\": [...]}".to_string(),
        ));
    };

    match body.get(BATCH_KEY) {
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(IngestError::BadRequest(format!(
            "`{BATCH_KEY}` must be an array"
        ))),
        None => Err(IngestError::BadRequest(format!(
            "missing `{BATCH_KEY}` in payload"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use logsink_core::filter::{FilterSpec, Predicate};
    use logsink_core::time::received_at_now;
    use serde_json::json;
    use testkit::{batch_json, entry_json, mixed_batch, new_record};

    use super::*;

    const TOKEN: &str = "servicio1_token123";

    fn ingestor() -> Ingestor {
        Ingestor::new(
            CredentialStore::new([TOKEN]),
            Store::open_in_memory().unwrap(),
        )
    }

    fn auth() -> Option<&'static str> {
        Some("Token servicio1_token123")
    }

    #[test]
    fn accepts_valid_batch_and_persists_it() {
        let ing = ingestor();
        let payload = batch_json([
            entry_json(&new_record("payment-service", "INFO", "Pago procesado correctamente")),
            entry_json(&new_record("payment-service", "ERROR", "Reembolso iniciado")),
        ]);

        let start = received_at_now();
        let report = ing.ingest(auth(), Some(&payload)).unwrap();
        let end = received_at_now();
        assert_eq!(report, IngestReport { accepted: 2, rejected: 0 });

        let stored = ing
            .store()
            .query(
                &FilterSpec {
                    service: Some("payment-service".into()),
                    ..FilterSpec::default()
                }
                .compile(),
            )
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert_ne!(stored[0].id, stored[1].id);
        assert!(
            stored
                .iter()
                .all(|r| r.received_at >= start && r.received_at <= end)
        );
    }

    #[test]
    fn invalid_entries_are_dropped_not_fatal() {
        let ing = ingestor();
        let report = ing.ingest(auth(), Some(&mixed_batch())).unwrap();
        assert_eq!(report, IngestReport { accepted: 2, rejected: 1 });

        let all = ing.store().query(&Predicate::all()).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.severity != "ERROR"));
    }

    #[test]
    fn batch_with_no_valid_entries_still_succeeds() {
        let ing = ingestor();
        let payload = batch_json([json!({"service": "x"}), json!(42), json!(null)]);
        let report = ing.ingest(auth(), Some(&payload)).unwrap();
        assert_eq!(report, IngestReport { accepted: 0, rejected: 3 });

        let empty = batch_json([]);
        assert_eq!(
            ing.ingest(auth(), Some(&empty)).unwrap(),
            IngestReport::default()
        );
        assert_eq!(ing.store().status().unwrap().logs_count, 0);
    }

    #[test]
    fn bad_credentials_persist_nothing() {
        let ing = ingestor();
        let payload = batch_json([entry_json(&new_record("auth-service", "INFO", "x"))]);

        for header in [
            None,
            Some("Token wrong"),
            Some("Bearer servicio1_token123"),
            Some("servicio1_token123"),
        ] {
            assert!(matches!(
                ing.ingest(header, Some(&payload)),
                Err(IngestError::Unauthorized)
            ));
        }
        assert_eq!(ing.store().status().unwrap().logs_count, 0);
    }

    #[test]
    fn credentials_checked_before_payload_shape() {
        let ing = ingestor();
        assert!(matches!(
            ing.ingest(Some("Token nope"), None),
            Err(IngestError::Unauthorized)
        ));
    }

    #[test]
    fn malformed_envelopes_are_bad_requests() {
        let ing = ingestor();
        let cases = [
            None,
            Some(json!([])),
            Some(json!({"entries": []})),
            Some(json!({"logs": {"timestamp": "t"}})),
            Some(json!("logs")),
        ];
        for payload in cases {
            assert!(matches!(
                ing.ingest(auth(), payload.as_ref()),
                Err(IngestError::BadRequest(_))
            ));
        }
        assert_eq!(ing.store().status().unwrap().logs_count, 0);
    }

    #[test]
    fn expired_deadline_is_a_storage_failure() {
        let ing = ingestor();
        let payload = batch_json([entry_json(&new_record("auth-service", "INFO", "x"))]);
        assert!(matches!(
            ing.ingest_before(auth(), Some(&payload), Some(Instant::now())),
            Err(IngestError::Storage(LogsinkError::Timeout(_)))
        ));
        assert_eq!(ing.store().status().unwrap().logs_count, 0);
    }

    #[test]
    fn round_trip_preserves_fields() {
        let ing = ingestor();
        let payload = batch_json([json!({
            "timestamp": "2026-02-01T12:30:00.000001",
            "service": "inventory-service",
            "severity": "CRITICAL",
            "message": "Alerta de bajo stock",
            "sku": "ABC-1"
        })]);
        ing.ingest(auth(), Some(&payload)).unwrap();

        let all = ing.store().query(&Predicate::all()).unwrap();
        assert_eq!(all.len(), 1);
        let rec = &all[0];
        assert_eq!(rec.timestamp, "2026-02-01T12:30:00.000001");
        assert_eq!(rec.service, "inventory-service");
        assert_eq!(rec.severity, "CRITICAL");
        assert_eq!(rec.message, "Alerta de bajo stock");
        assert_eq!(rec.id, 1);
    }
}
