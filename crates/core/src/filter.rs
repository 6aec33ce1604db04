use serde::{Deserialize, Serialize};

use crate::model::log::LogRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Field {
    Timestamp,
    ReceivedAt,
    Service,
    Severity,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Self::Timestamp => "\"timestamp\"",
            Self::ReceivedAt => "received_at",
            Self::Service => "service",
            Self::Severity => "severity",
        }
    }

    pub fn value_of(self, record: &LogRecord) -> &str {
        match self {
            Self::Timestamp => &record.timestamp,
            Self::ReceivedAt => &record.received_at,
            Self::Service => &record.service,
            Self::Severity => &record.severity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Clause {
    AtLeast(Field, String),
    AtMost(Field, String),
    Equals(Field, String),
}

impl Clause {
    pub fn field(&self) -> Field {
        match self {
            Self::AtLeast(f, _) | Self::AtMost(f, _) | Self::Equals(f, _) => *f,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::AtLeast(_, v) | Self::AtMost(_, v) | Self::Equals(_, v) => v,
        }
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        let actual = self.field().value_of(record);
        match self {
            Self::AtLeast(_, v) => actual >= v.as_str(),
            Self::AtMost(_, v) => actual <= v.as_str(),
            Self::Equals(_, v) => actual == v,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_universal(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl FilterSpec {
    /// Builds a spec from raw query pairs. The first occurrence of a key wins
    /// and unknown keys are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut spec = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "timestamp_start" => &mut spec.timestamp_start,
                "timestamp_end" => &mut spec.timestamp_end,
                "received_at_start" => &mut spec.received_at_start,
                "received_at_end" => &mut spec.received_at_end,
                "service" => &mut spec.service,
                "severity" => &mut spec.severity,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        spec
    }

    pub fn compile(&self) -> Predicate {
        let candidates = [
            self.timestamp_start
                .clone()
                .map(|v| Clause::AtLeast(Field::Timestamp, v)),
            self.timestamp_end
                .clone()
                .map(|v| Clause::AtMost(Field::Timestamp, v)),
            self.received_at_start
                .clone()
                .map(|v| Clause::AtLeast(Field::ReceivedAt, v)),
            self.received_at_end
                .clone()
                .map(|v| Clause::AtMost(Field::ReceivedAt, v)),
            self.service.clone().map(|v| Clause::Equals(Field::Service, v)),
            self.severity
                .clone()
                .map(|v| Clause::Equals(Field::Severity, v)),
        ];

        candidates
            .into_iter()
            .flatten()
            .fold(Predicate::all(), Predicate::and)
    }
}
