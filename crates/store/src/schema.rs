pub const SCHEMA_SQL: &str = r#"
CREATE SEQUENCE IF NOT EXISTS logs_id_seq START 1;

CREATE TABLE IF NOT EXISTS logs (
  id BIGINT PRIMARY KEY,
  "timestamp" TEXT NOT NULL,
  service TEXT NOT NULL,
  severity TEXT NOT NULL,
  message TEXT NOT NULL,
  received_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_logs_received_at ON logs(received_at);
CREATE INDEX IF NOT EXISTS idx_logs_service_received_at ON logs(service, received_at);
CREATE INDEX IF NOT EXISTS idx_logs_severity_received_at ON logs(severity, received_at);
"#;
