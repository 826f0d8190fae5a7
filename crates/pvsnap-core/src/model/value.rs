//! Live values as read from, or written to, the control system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scalar channel value
///
/// Variant order matters for untagged deserialization: integers must be
/// tried before floats so `5` stays an `Int`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpicsValue {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl EpicsValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EpicsValue::Int(i) => Some(*i as f64),
            EpicsValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, EpicsValue::None)
    }
}

impl std::fmt::Display for EpicsValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpicsValue::None => write!(f, "None"),
            EpicsValue::Bool(b) => write!(f, "{}", b),
            EpicsValue::Int(i) => write!(f, "{}", i),
            EpicsValue::Float(x) => write!(f, "{}", x),
            EpicsValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for EpicsValue {
    fn from(v: f64) -> Self {
        EpicsValue::Float(v)
    }
}

impl From<i64> for EpicsValue {
    fn from(v: i64) -> Self {
        EpicsValue::Int(v)
    }
}

impl From<bool> for EpicsValue {
    fn from(v: bool) -> Self {
        EpicsValue::Bool(v)
    }
}

impl From<&str> for EpicsValue {
    fn from(v: &str) -> Self {
        EpicsValue::Str(v.to_string())
    }
}

impl From<String> for EpicsValue {
    fn from(v: String) -> Self {
        EpicsValue::Str(v)
    }
}

/// Alarm status of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    NoAlarm,
    Read,
    Write,
    Hihi,
    High,
    Lolo,
    Low,
    State,
    Cos,
    Comm,
    Timeout,
    HwLimit,
    Calc,
    Scan,
    Link,
    Soft,
    BadSub,
    Udf,
    Disable,
    Simm,
    ReadAccess,
    WriteAccess,
}

/// Alarm severity of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    #[default]
    NoAlarm,
    Minor,
    Major,
    Invalid,
}

/// One reading of a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicsData {
    pub data: EpicsValue,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    /// Labels for enum channels, indexed by the integer value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<String>,
}

impl EpicsData {
    /// A healthy reading taken now
    pub fn new(data: impl Into<EpicsValue>) -> Self {
        Self {
            data: data.into(),
            status: Status::NoAlarm,
            severity: Severity::NoAlarm,
            timestamp: Utc::now(),
            enums: Vec::new(),
        }
    }

    /// Neutral stand-in recorded for channels that could not be read
    pub fn placeholder() -> Self {
        Self {
            data: EpicsValue::None,
            status: Status::Udf,
            severity: Severity::Invalid,
            timestamp: DateTime::<Utc>::default(),
            enums: Vec::new(),
        }
    }

    pub fn with_alarm(mut self, status: Status, severity: Severity) -> Self {
        self.status = status;
        self.severity = severity;
        self
    }

    pub fn with_enums(mut self, enums: Vec<String>) -> Self {
        self.enums = enums;
        self
    }

    /// Label for an enum index, when this channel is an enum
    pub fn enum_label(&self, value: &EpicsValue) -> Option<&str> {
        match value {
            EpicsValue::Int(i) if *i >= 0 => self.enums.get(*i as usize).map(String::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_value_keeps_integers() {
        let v: EpicsValue = serde_json::from_str("5").unwrap();
        assert_eq!(v, EpicsValue::Int(5));
        let v: EpicsValue = serde_json::from_str("0.99").unwrap();
        assert_eq!(v, EpicsValue::Float(0.99));
        let v: EpicsValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, EpicsValue::None);
    }

    #[test]
    fn test_placeholder_is_invalid_and_empty() {
        let p = EpicsData::placeholder();
        assert!(p.data.is_none());
        assert_eq!(p.status, Status::Udf);
        assert_eq!(p.severity, Severity::Invalid);
    }

    #[test]
    fn test_enum_label_lookup() {
        let d = EpicsData::new(1_i64).with_enums(vec!["Off".into(), "On".into()]);
        assert_eq!(d.enum_label(&d.data), Some("On"));
        assert_eq!(d.enum_label(&EpicsValue::Int(7)), None);
        assert_eq!(d.enum_label(&EpicsValue::Float(1.0)), None);
    }
}
