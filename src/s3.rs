use crate::error::RuntimeError;
use async_trait::async_trait;
use aws_sdk_s3::{types::ByteStream, Client, Config, Error, Region};
use aws_types::SdkConfig;

/// Region S3 reports for buckets created with the legacy `EU` constraint.
const LEGACY_EU_REGION: &str = "eu-west-1";

/// `StoredObject` is an object ready to be written to a bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredObject {
    /// Destination bucket
    pub bucket: String,
    /// Destination key
    pub key: String,
    /// Object bytes, already encoded
    pub body: Vec<u8>,
    /// `Content-Type` metadata
    pub content_type: &'static str,
    /// `Content-Encoding` metadata
    pub content_encoding: &'static str,
}

/// Object store capabilities the pipeline needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Look up the location constraint of a bucket.
    /// `None` means the store reported no constraint.
    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>, RuntimeError>;

    /// Write an object using an endpoint in `region`.
    async fn put_object(&self, region: &str, object: StoredObject) -> Result<(), RuntimeError>;
}

/// Resolve the region a bucket lives in, falling back to `default_region`
/// when the store reports no location constraint.
#[tracing::instrument(skip(store))]
pub async fn resolve_bucket_region<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    default_region: &str,
) -> Result<String, RuntimeError> {
    let location = store.bucket_location(bucket).await?;

    let region = match location.as_deref() {
        None | Some("") => default_region.to_string(),
        Some("EU") => LEGACY_EU_REGION.to_string(),
        Some(region) => region.to_string(),
    };

    tracing::info!(%region, "resolved bucket region");
    Ok(region)
}

/// Public URL of an object, used in logs.
pub fn object_url(bucket: &str, key: &str) -> String {
    format!("https://s3.amazonaws.com/{bucket}/{key}")
}

type ClientFactory = Box<dyn Fn(Region) -> Client + Send + Sync>;

/// S3 client implementation.
///
/// Location lookups go through the client of the invocation region.
/// Writes go through a client built for the bucket's own region, so requests
/// reach that region's endpoint.
pub struct S3Store {
    inner: Client,
    regional: ClientFactory,
}

impl S3Store {
    /// Initialize the S3 store for the region the function was invoked in.
    #[tracing::instrument(skip(config))]
    pub fn new(config: &SdkConfig, region: &str) -> S3Store {
        tracing::info!("Initializing S3 client");
        S3Store::build(config, region, Client::from_conf)
    }

    /// Store whose clients all send requests through `conn`.
    #[cfg(test)]
    fn with_connector(
        config: &SdkConfig,
        region: &str,
        conn: aws_smithy_client::erase::DynConnector,
    ) -> S3Store {
        S3Store::build(config, region, move |conf| {
            Client::from_conf_conn(conf, conn.clone())
        })
    }

    fn build<F>(config: &SdkConfig, region: &str, connect: F) -> S3Store
    where
        F: Fn(Config) -> Client + Send + Sync + 'static,
    {
        let base = config.clone();
        let regional: ClientFactory = Box::new(move |region: Region| {
            let conf = aws_sdk_s3::config::Builder::from(&base)
                .region(region)
                .build();
            connect(conf)
        });
        let inner = regional(Region::new(region.to_string()));

        S3Store { inner, regional }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[tracing::instrument(skip(self))]
    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>, RuntimeError> {
        let output = self
            .inner
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| RuntimeError::BucketLocation {
                bucket: bucket.into(),
                source: Error::from(err),
            })?;

        Ok(output
            .location_constraint()
            .map(|constraint| constraint.as_str().to_string()))
    }

    #[tracing::instrument(skip(self, object), fields(bucket = %object.bucket, key = %object.key))]
    async fn put_object(&self, region: &str, object: StoredObject) -> Result<(), RuntimeError> {
        let client = (self.regional)(Region::new(region.to_string()));

        let StoredObject {
            bucket,
            key,
            body,
            content_type,
            content_encoding,
        } = object;

        let res = client
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .content_encoding(content_encoding)
            .send()
            .await;

        match res {
            Ok(_) => Ok(()),
            Err(err) => Err(RuntimeError::PutObject {
                bucket,
                key,
                source: Error::from(err),
            }),
        }
    }
}
