use crate::{
    error::RuntimeError,
    event::{KinesisData, KinesisRecord},
    s3::{ObjectStore, StoredObject},
};
use async_trait::async_trait;
use aws_sdk_s3::Credentials;
use aws_types::{region::Region, SdkConfig};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::io::{Read, Write};
use std::sync::Mutex;

/// Control message CloudWatch Logs sends when a subscription is created
pub const CONTROL_MESSAGE: &str = r#"{"messageType":"CONTROL_MESSAGE","owner":"CloudwatchLogs","logGroup":"","logStream":"","subscriptionFilters":[],"logEvents":[{"id":"","timestamp":1620000000000,"message":"CWL CONTROL MESSAGE: Checking health of destination Kinesis stream."}]}"#;

/// Configuration for mocking AWS SDK clients
pub async fn get_mock_config() -> SdkConfig {
    aws_config::from_env()
        .region(Region::new("us-west-1"))
        .credentials_provider(Credentials::new(
            "accesskey",
            "privatekey",
            None,
            None,
            "dummy",
        ))
        .load()
        .await
}

/// Base request builder for the AWS SDK calls
pub fn get_request_builder(service: &str) -> http::request::Builder {
    http::Request::builder().uri(format!("https://{service}.us-west-1.amazonaws.com/"))
}

/// Gzip and base64 encode a JSON envelope the way CloudWatch Logs does
pub fn encode_record(json: &str) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes()).unwrap();
    base64::encode(encoder.finish().unwrap())
}

/// Kinesis record wrapping an encoded envelope
pub fn kinesis_record(json: &str) -> KinesisRecord {
    KinesisRecord {
        kinesis: KinesisData {
            data: encode_record(json),
        },
    }
}

/// `DATA_MESSAGE` envelope with the given (timestamp, message) events
pub fn data_message(events: &[(i64, &str)]) -> String {
    let log_events: Vec<_> = events
        .iter()
        .enumerate()
        .map(|(id, (timestamp, message))| {
            serde_json::json!({
                "id": id.to_string(),
                "timestamp": timestamp,
                "message": message,
            })
        })
        .collect();

    serde_json::json!({
        "messageType": "DATA_MESSAGE",
        "owner": "123456789012",
        "logGroup": "/aws/lambda/echo-nodejs",
        "logStream": "2019/03/13/[$LATEST]94fa867e5374431291a7fc14e2f56ae7",
        "subscriptionFilters": ["LambdaStream_cloudwatchlogs-node"],
        "logEvents": log_events,
    })
    .to_string()
}

/// Gunzip an uploaded body
pub fn decompress(body: &[u8]) -> String {
    let mut text = String::new();
    GzDecoder::new(body).read_to_string(&mut text).unwrap();
    text
}

/// In-memory object store that records every call
#[derive(Default)]
pub struct FakeStore {
    location: Option<String>,
    fail_location: bool,
    fail_puts: bool,
    lookups: Mutex<Vec<String>>,
    puts: Mutex<Vec<(String, StoredObject)>>,
}

impl FakeStore {
    pub fn with_location(location: Option<&str>) -> FakeStore {
        FakeStore {
            location: location.map(String::from),
            ..Default::default()
        }
    }

    pub fn failing_location() -> FakeStore {
        FakeStore {
            fail_location: true,
            ..Default::default()
        }
    }

    pub fn failing_puts() -> FakeStore {
        FakeStore {
            fail_puts: true,
            ..Default::default()
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<(String, StoredObject)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>, RuntimeError> {
        self.lookups.lock().unwrap().push(bucket.to_string());
        if self.fail_location {
            return Err(RuntimeError::BucketLocation {
                bucket: bucket.into(),
                source: aws_sdk_s3::Error::Unhandled("location failed".into()),
            });
        }
        Ok(self.location.clone())
    }

    async fn put_object(&self, region: &str, object: StoredObject) -> Result<(), RuntimeError> {
        if self.fail_puts {
            return Err(RuntimeError::PutObject {
                bucket: object.bucket,
                key: object.key,
                source: aws_sdk_s3::Error::Unhandled("put failed".into()),
            });
        }
        self.puts.lock().unwrap().push((region.to_string(), object));
        Ok(())
    }
}
