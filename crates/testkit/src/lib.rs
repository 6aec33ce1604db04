use logsink_core::model::log::NewLogRecord;
use serde_json::{Value, json};

pub const SAMPLE_TIMESTAMP: &str = "2026-02-01T00:00:00";

pub fn new_record(service: &str, severity: &str, message: &str) -> NewLogRecord {
    new_record_at(SAMPLE_TIMESTAMP, service, severity, message)
}

pub fn new_record_at(timestamp: &str, service: &str, severity: &str, message: &str) -> NewLogRecord {
    NewLogRecord {
        timestamp: timestamp.to_string(),
        service: service.to_string(),
        severity: severity.to_string(),
        message: message.to_string(),
    }
}

pub fn entry_json(record: &NewLogRecord) -> Value {
    json!({
        "timestamp": record.timestamp,
        "service": record.service,
        "severity": record.severity,
        "message": record.message,
    })
}

pub fn batch_json(entries: impl IntoIterator<Item = Value>) -> Value {
    json!({ "logs": entries.into_iter().collect::<Vec<_>>() })
}

/// Records A, B and C in insertion order.
pub fn scenario_records() -> Vec<NewLogRecord> {
    vec![
        new_record("auth-service", "ERROR", "Intento de inicio de sesión fallido"),
        new_record("auth-service", "INFO", "Inicio de sesión exitoso"),
        new_record("payment-service", "ERROR", "Pago fallido: fondos insuficientes"),
    ]
}

pub fn mixed_batch() -> Value {
    batch_json([
        entry_json(&new_record("user-service", "INFO", "Nuevo usuario registrado")),
        json!({
            "timestamp": SAMPLE_TIMESTAMP,
            "service": "user-service",
            "severity": "ERROR"
        }),
        entry_json(&new_record("user-service", "WARNING", "Foto de perfil cambiada")),
    ])
}
