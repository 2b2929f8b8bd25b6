use thiserror::Error as ThisError;

/// Different errors that the application can raise
#[derive(Debug, ThisError)]
pub enum RuntimeError {
    /// Error returned when the bucket location lookup fails
    #[error("unable to resolve the region of bucket {bucket}")]
    BucketLocation {
        /// Bucket that was looked up
        bucket: String,
        /// Underlying S3 error
        #[source]
        source: aws_sdk_s3::Error,
    },
    /// Error returned when the compressed batch cannot be stored
    #[error("failed to persist object {key} to bucket {bucket}")]
    PutObject {
        /// Destination bucket
        bucket: String,
        /// Destination key
        key: String,
        /// Underlying S3 error
        #[source]
        source: aws_sdk_s3::Error,
    },
    /// Error returned if the batch payload cannot be gzip compressed
    #[error("failed to compress batch payload")]
    Compression(#[from] std::io::Error),
    /// Error returned when the operation arguments don't match the operation
    #[error("invalid arguments for operation {operation}")]
    InvalidArguments {
        /// Operation that received the arguments
        operation: String,
        /// Deserialization failure
        #[source]
        source: serde_json::Error,
    },
    /// Error returned for operations this function doesn't handle
    #[error("unsupported operation '{0}'")]
    UnsupportedOperation(String),
}

/// Reasons a single record can't be decoded.
///
/// These never abort a batch: the decoder logs them and the record
/// contributes nothing to the payload.
#[derive(Debug, ThisError)]
pub enum RecordError {
    /// The record data is not valid base64
    #[error("record is not valid base64")]
    Base64(#[from] base64::DecodeError),
    /// The decoded bytes are not valid gzip
    #[error("record is not valid gzip")]
    Gzip(#[from] std::io::Error),
    /// The decompressed bytes are not a CloudWatch Logs envelope
    #[error("record is not a valid log envelope")]
    Json(#[from] serde_json::Error),
}
