#![deny(missing_docs)]
//! <fullname>CloudWatch logs archiver</fullname>
//!
//! Lambda function that receives batches of CloudWatch Logs
//! records from a Kinesis subscription, renders them as text
//! for the configured log format, and stores each batch as a
//! gzipped object in S3.
use aws_types::SdkConfig;
use lambda_runtime::LambdaEvent;

mod batch;
pub use batch::{aggregate, join_ordered};

mod error;
pub use error::{RecordError, RuntimeError};

mod event;
pub use event::{
    decode_record, KinesisData, KinesisRecord, LogData, LogEntry, ProcessLogsArgs, Request,
};

mod format;
pub use format::LogFormat;

mod object_name;
pub use object_name::ObjectNamer;

mod s3;
pub use s3::{resolve_bucket_region, ObjectStore, S3Store, StoredObject};

mod settings;
pub use settings::Settings;

mod upload;
pub use upload::{compress, upload_data};

#[cfg(test)]
mod test_util;

const PROCESS_LOGS: &str = "processLogs";
const CREATE_SOURCE: &str = "createSource";
const DELETE_SOURCE: &str = "deleteSource";

/// `handle_request` is the Lambda function entry point.
/// It routes the request on its `operation` field.
#[tracing::instrument(skip(config, settings, event), fields(request_id = %event.context.request_id, operation = %event.payload.operation))]
pub async fn handle_request(
    config: &SdkConfig,
    settings: &Settings,
    event: LambdaEvent<Request>,
) -> Result<(), RuntimeError> {
    let Request { operation, data } = event.payload;

    let result = dispatch(config, settings, &operation, data).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "'{}' failed", operation);
    }

    result
}

async fn dispatch(
    config: &SdkConfig,
    settings: &Settings,
    operation: &str,
    data: serde_json::Value,
) -> Result<(), RuntimeError> {
    match operation {
        PROCESS_LOGS => {
            let args: ProcessLogsArgs =
                serde_json::from_value(data).map_err(|source| RuntimeError::InvalidArguments {
                    operation: operation.into(),
                    source,
                })?;
            let store = S3Store::new(config, &args.aws_region);
            process_logs(&store, settings, &args).await.map(|_| ())
        }
        CREATE_SOURCE | DELETE_SOURCE => {
            tracing::warn!("sources are provisioned outside of this function");
            Err(RuntimeError::UnsupportedOperation(operation.into()))
        }
        _ => Err(RuntimeError::UnsupportedOperation(operation.into())),
    }
}

/// Render a batch of records and store it as one gzipped object.
///
/// Returns the key of the stored object, or `None` when every record was
/// skipped and nothing was written. Only the bucket location lookup and the
/// write can fail an invocation.
#[tracing::instrument(skip(store, settings, args), fields(bucket = %args.s3_bucket_name, format = %args.log_format))]
pub async fn process_logs<S: ObjectStore + ?Sized>(
    store: &S,
    settings: &Settings,
    args: &ProcessLogsArgs,
) -> Result<Option<String>, RuntimeError> {
    let region = resolve_bucket_region(store, &args.s3_bucket_name, &args.aws_region).await?;

    tracing::info!("processing {} records", args.records.len());
    let payload = aggregate(&args.records, &args.log_format).await;

    if payload.is_empty() {
        tracing::info!("no log events to store");
        return Ok(None);
    }

    let key = ObjectNamer::new(args.s3_log_file_prefix.as_str())
        .with_legacy_offsets(settings.legacy_object_keys)
        .name();
    upload_data(store, &payload, &region, &args.s3_bucket_name, &key).await?;

    Ok(Some(key))
}
