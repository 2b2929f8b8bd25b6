use crate::error::RecordError;
use crate::format::LogFormat;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::io::Read;

/// Message type of envelopes that carry log events.
pub const DATA_MESSAGE: &str = "DATA_MESSAGE";

/// `Request` is the raw event sent to the function
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Request {
    /// Name of the operation to run
    pub operation: String,
    /// Operation arguments, interpreted by the operation
    #[serde(default)]
    pub data: serde_json::Value,
}

/// `ProcessLogsArgs` are the arguments of the `processLogs` operation
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessLogsArgs {
    /// Region the function is invoked in
    pub aws_region: String,
    /// Destination bucket
    pub s3_bucket_name: String,
    /// Rendering rules for every record in the batch
    pub log_format: LogFormat,
    /// Prefix of the stored object key
    #[serde(default)]
    pub s3_log_file_prefix: String,
    /// Records of the batch, in delivery order
    pub records: Vec<KinesisRecord>,
}

/// `KinesisRecord` is one record delivered by the Kinesis subscription
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct KinesisRecord {
    /// Kinesis payload
    pub kinesis: KinesisData,
}

/// `KinesisData` holds the encoded CloudWatch Logs payload.
///
/// `data` stays gzipped and base64 encoded until the batch decodes it,
/// so one bad record can't fail deserialization of the whole request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct KinesisData {
    /// Encoded CloudWatch Logs envelope
    pub data: String,
}

/// `LogData` represents the logs group event information
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogData {
    /// Account that owns the log group
    #[serde(default)]
    pub owner: String,
    /// Source log group
    #[serde(default)]
    pub log_group: String,
    /// Source log stream
    #[serde(default)]
    pub log_stream: String,
    /// Subscription filters that matched the events
    #[serde(default)]
    pub subscription_filters: Vec<String>,
    /// `DATA_MESSAGE` or `CONTROL_MESSAGE`
    pub message_type: String,
    /// Log events, in order
    #[serde(default)]
    pub log_events: Vec<LogEntry>,
}

impl LogData {
    /// Whether the envelope carries log events rather than a control message.
    pub fn is_data(&self) -> bool {
        self.message_type == DATA_MESSAGE
    }
}

/// `LogEntry` represents a log entry from cloudwatch logs
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct LogEntry {
    /// CloudWatch event id
    #[serde(default)]
    pub id: String,
    /// Epoch milliseconds
    #[serde(default, deserialize_with = "lenient_millis")]
    pub timestamp: i64,
    /// Raw log line
    pub message: String,
}

// A bad timestamp must not reject the whole envelope: floats are truncated,
// numeric strings are parsed, anything else becomes 0.
fn lenient_millis<'d, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'d>,
{
    let millis = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    };
    Ok(millis.unwrap_or_default())
}

/// Decode one record: base64, then gzip, then the JSON envelope.
pub fn decode_record(data: &str) -> Result<LogData, RecordError> {
    let bytes = base64::decode(data.trim())?;

    let mut json = Vec::new();
    flate2::read::GzDecoder::new(&bytes[..]).read_to_end(&mut json)?;

    Ok(serde_json::from_slice(&json)?)
}
