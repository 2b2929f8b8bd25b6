use crate::event::LogEntry;
use chrono::{SecondsFormat, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;

/// Position of the flow start time in a default-format VPC flow log line.
const VPC_FLOW_START_FIELD: usize = 10;

/// `LogFormat` selects how log events are rendered.
/// A batch is always rendered with a single format.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(from = "String")]
pub enum LogFormat {
    /// `AWS VPC Flow Logs`
    VpcFlowLogs,
    /// `AWS Lambda`
    Lambda,
    /// `AWS IoT`
    Iot,
    /// Any other CloudWatch log group, keeping the configured name
    Custom(String),
}

impl From<&str> for LogFormat {
    fn from(value: &str) -> Self {
        match value {
            "AWS VPC Flow Logs" => LogFormat::VpcFlowLogs,
            "AWS Lambda" => LogFormat::Lambda,
            "AWS IoT" => LogFormat::Iot,
            other => LogFormat::Custom(other.to_string()),
        }
    }
}

impl From<String> for LogFormat {
    fn from(value: String) -> Self {
        LogFormat::from(value.as_str())
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::VpcFlowLogs => f.write_str("AWS VPC Flow Logs"),
            LogFormat::Lambda => f.write_str("AWS Lambda"),
            LogFormat::Iot => f.write_str("AWS IoT"),
            LogFormat::Custom(name) => f.write_str(name),
        }
    }
}

impl LogFormat {
    /// Render the events in order, one record per event.
    pub fn render(&self, events: &[LogEntry]) -> String {
        let mut logs = String::new();
        for event in events {
            logs.push_str(&self.render_event(event));
        }
        logs
    }

    fn render_event(&self, event: &LogEntry) -> String {
        match self {
            LogFormat::VpcFlowLogs => {
                let start = event
                    .message
                    .split_whitespace()
                    .nth(VPC_FLOW_START_FIELD)
                    .unwrap_or_default();
                format!("VPC Flow Log Record: {} {}\n", start, event.message)
            }
            LogFormat::Lambda => format!(
                "Lambda Log Record: [{}] - {}\n\n",
                iso_timestamp(event.timestamp),
                event.message
            ),
            LogFormat::Iot => format!("IoT Log Record: {}\n", event.message),
            LogFormat::Custom(_) => format!(
                "Custom CloudWatch Log Record: [{}] - {}\n\n",
                iso_timestamp(event.timestamp),
                event.message
            ),
        }
    }
}

/// RFC 3339 UTC rendering with millisecond precision, e.g. `1970-01-01T00:00:00.000Z`.
/// Instants chrono can't represent fall back to the raw millisecond value.
fn iso_timestamp(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(date) => date.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => millis.to_string(),
    }
}
