use duckdb::params_from_iter;
use duckdb::types::Value;
use logsink_core::error::{LogsinkError, Result};
use logsink_core::filter::{Clause, Predicate};
use logsink_core::model::log::LogRecord;

use crate::Store;

impl Store {
    pub fn query(&self, predicate: &Predicate) -> Result<Vec<LogRecord>> {
        let (where_sql, args) = render_predicate(predicate);
        let sql = format!(
            "SELECT id, \"timestamp\", service, severity, message, received_at
             FROM logs
             {where_sql}
             ORDER BY received_at DESC, id DESC"
        );

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| LogsinkError::Store(format!("prepare query failed: {e}")))?;

        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(LogRecord {
                    id: row.get::<_, i64>(0)?,
                    timestamp: row.get::<_, String>(1)?,
                    service: row.get::<_, String>(2)?,
                    severity: row.get::<_, String>(3)?,
                    message: row.get::<_, String>(4)?,
                    received_at: row.get::<_, String>(5)?,
                })
            })
            .map_err(|e| LogsinkError::Store(format!("query logs failed: {e}")))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| LogsinkError::Store(format!("map log row failed: {e}")))?);
        }
        Ok(results)
    }
}

// SQL text comes only from fixed column names and operators. Values are
// always bound.
fn render_predicate(predicate: &Predicate) -> (String, Vec<Value>) {
    if predicate.is_universal() {
        return (String::new(), Vec::new());
    }

    let mut where_parts = Vec::with_capacity(predicate.clauses().len());
    let mut args = Vec::with_capacity(predicate.clauses().len());
    for clause in predicate.clauses() {
        let op = match clause {
            Clause::AtLeast(..) => ">=",
            Clause::AtMost(..) => "<=",
            Clause::Equals(..) => "=",
        };
        where_parts.push(format!("{} {op} ?", clause.field().column()));
        args.push(Value::Text(clause.value().to_string()));
    }

    (format!("WHERE {}", where_parts.join(" AND ")), args)
}

#[cfg(test)]
mod tests {
    use logsink_core::filter::{Field, FilterSpec};
    use logsink_core::model::log::LogRecord;
    use testkit::{new_record, new_record_at};

    use super::*;

    fn ids(records: &[LogRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn renders_parameterized_sql() {
        let pred = FilterSpec {
            service: Some("x'; DROP TABLE logs; --".into()),
            timestamp_start: Some("2026".into()),
            ..FilterSpec::default()
        }
        .compile();

        let (sql, args) = render_predicate(&pred);
        assert_eq!(sql, "WHERE \"timestamp\" >= ? AND service = ?");
        assert_eq!(
            args,
            vec![
                Value::Text("2026".into()),
                Value::Text("x'; DROP TABLE logs; --".into())
            ]
        );
        assert_eq!(render_predicate(&Predicate::all()).0, "");
    }

    #[test]
    fn service_and_severity_scenario() {
        let store = Store::open_in_memory().unwrap();
        let a = store
            .append(&new_record("auth-service", "ERROR", "Intento de inicio de sesión fallido"))
            .unwrap();
        let b = store
            .append(&new_record("auth-service", "INFO", "Inicio de sesión exitoso"))
            .unwrap();
        let c = store
            .append(&new_record("payment-service", "ERROR", "Pago fallido: fondos insuficientes"))
            .unwrap();

        let auth = store
            .query(
                &FilterSpec {
                    service: Some("auth-service".into()),
                    ..FilterSpec::default()
                }
                .compile(),
            )
            .unwrap();
        assert_eq!(auth, vec![b.clone(), a.clone()]);

        let errors = store
            .query(
                &FilterSpec {
                    severity: Some("ERROR".into()),
                    ..FilterSpec::default()
                }
                .compile(),
            )
            .unwrap();
        assert_eq!(errors, vec![c.clone(), a.clone()]);

        let both = store
            .query(
                &FilterSpec {
                    service: Some("payment-service".into()),
                    severity: Some("ERROR".into()),
                    ..FilterSpec::default()
                }
                .compile(),
            )
            .unwrap();
        assert_eq!(both, vec![c.clone()]);

        let all = store.query(&Predicate::all()).unwrap();
        assert_eq!(all, vec![c, b, a]);
    }

    #[test]
    fn timestamp_range_is_inclusive() {
        let store = Store::open_in_memory().unwrap();
        for ts in [
            "2026-02-01T08:00:00",
            "2026-02-01T09:00:00",
            "2026-02-01T10:00:00",
            "2026-02-01T11:00:00",
        ] {
            store
                .append(&new_record_at(ts, "user-service", "INFO", "Perfil de usuario actualizado"))
                .unwrap();
        }

        let res = store
            .query(
                &FilterSpec {
                    timestamp_start: Some("2026-02-01T09:00:00".into()),
                    timestamp_end: Some("2026-02-01T10:00:00".into()),
                    ..FilterSpec::default()
                }
                .compile(),
            )
            .unwrap();
        assert_eq!(ids(&res), vec![3, 2]);
    }

    #[test]
    fn received_at_filters_use_server_time() {
        let store = Store::open_in_memory().unwrap();
        let first = store.append(&new_record("inventory-service", "INFO", "one")).unwrap();
        let second = store.append(&new_record("inventory-service", "INFO", "two")).unwrap();

        let since_second = store
            .query(&Predicate::all().and(Clause::AtLeast(
                Field::ReceivedAt,
                second.received_at.clone(),
            )))
            .unwrap();
        assert!(since_second.contains(&second));
        assert!(since_second.iter().all(|r| r.received_at >= second.received_at));

        let until_first = store
            .query(&Predicate::all().and(Clause::AtMost(
                Field::ReceivedAt,
                first.received_at.clone(),
            )))
            .unwrap();
        assert!(until_first.contains(&first));
        assert!(until_first.iter().all(|r| r.received_at <= first.received_at));
    }

    #[test]
    fn store_agrees_with_in_process_predicate() {
        let store = Store::open_in_memory().unwrap();
        for (service, severity) in [
            ("auth-service", "INFO"),
            ("auth-service", "ERROR"),
            ("payment-service", "WARNING"),
            ("payment-service", "ERROR"),
            ("user-service", "DEBUG"),
        ] {
            store.append(&new_record(service, severity, "event")).unwrap();
        }
        let all = store.query(&Predicate::all()).unwrap();

        let pred = FilterSpec {
            severity: Some("ERROR".into()),
            timestamp_start: Some("2026-01-01".into()),
            ..FilterSpec::default()
        }
        .compile();
        let expected = all
            .iter()
            .filter(|r| pred.matches(r))
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(store.query(&pred).unwrap(), expected);
        assert_eq!(expected.len(), 2);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let store = Store::open_in_memory().unwrap();
        store
            .append_all(&[
                new_record("auth-service", "INFO", "a"),
                new_record("auth-service", "INFO", "b"),
                new_record("auth-service", "INFO", "c"),
            ])
            .unwrap();

        let pred = FilterSpec {
            service: Some("auth-service".into()),
            ..FilterSpec::default()
        }
        .compile();
        let first = store.query(&pred).unwrap();
        let second = store.query(&pred).unwrap();
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec![3, 2, 1]);
    }

    #[test]
    fn status_tracks_receipt_bounds() {
        let store = Store::open_in_memory().unwrap();
        let first = store.append(&new_record("a", "INFO", "x")).unwrap();
        let last = store.append(&new_record("a", "INFO", "y")).unwrap();

        let status = store.status().unwrap();
        assert_eq!(status.logs_count, 2);
        assert_eq!(status.oldest_received_at, Some(first.received_at));
        assert_eq!(status.newest_received_at, Some(last.received_at));
    }
}
