use crate::error::RuntimeError;
use crate::s3::{object_url, ObjectStore, StoredObject};
use flate2::{write::GzEncoder, Compression};
use std::io::Write;

const CONTENT_TYPE: &str = "application/json";
const CONTENT_ENCODING: &str = "gzip";

/// Gzip the payload in one pass.
pub fn compress(payload: &str) -> Result<Vec<u8>, RuntimeError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload.as_bytes())?;
    Ok(encoder.finish()?)
}

/// Compress the batch payload and store it under `key`.
///
/// An empty payload is not an error: there's nothing to store, so the
/// store is never called.
#[tracing::instrument(skip(store, payload), fields(payload_len = payload.len()))]
pub async fn upload_data<S: ObjectStore + ?Sized>(
    store: &S,
    payload: &str,
    region: &str,
    bucket: &str,
    key: &str,
) -> Result<(), RuntimeError> {
    if payload.is_empty() {
        return Ok(());
    }

    tracing::info!("uploading data");

    let object = StoredObject {
        bucket: bucket.into(),
        key: key.into(),
        body: compress(payload)?,
        content_type: CONTENT_TYPE,
        content_encoding: CONTENT_ENCODING,
    };

    match store.put_object(region, object).await {
        Ok(()) => {
            tracing::info!(url = %object_url(bucket, key), "successfully persisted object");
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to persist object");
            Err(err)
        }
    }
}
