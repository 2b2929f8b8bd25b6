use crate::event::{decode_record, KinesisRecord};
use crate::format::LogFormat;
use futures::future::join_all;
use std::future::Future;

/// Decode and render every record of the batch, then join the results
/// in input order.
///
/// Records that fail to decode, or that carry a control message, contribute
/// an empty string. Record errors are logged and dropped here; they must never
/// fail the batch.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub async fn aggregate(records: &[KinesisRecord], format: &LogFormat) -> String {
    join_ordered(records.iter().enumerate(), |(index, record)| async move {
        render_record(index, record, format)
    })
    .await
}

/// Run one future per item concurrently and concatenate their output by
/// item position, whatever order they complete in.
pub async fn join_ordered<I, F, Fut>(items: I, f: F) -> String
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = String>,
{
    join_all(items.into_iter().map(f)).await.concat()
}

fn render_record(index: usize, record: &KinesisRecord, format: &LogFormat) -> String {
    let data = match decode_record(&record.kinesis.data) {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(
                index,
                encoded_len = record.kinesis.data.len(),
                error = %err,
                "failed to decode record, skipping"
            );
            tracing::debug!(index, data = %record.kinesis.data, "rejected record");
            return String::new();
        }
    };

    if !data.is_data() {
        tracing::info!(
            index,
            message_type = %data.message_type,
            "invalid message received, skipping"
        );
        return String::new();
    }

    format.render(&data.log_events)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::KinesisData;
    use crate::test_util::*;

    #[tokio::test]
    async fn test_aggregate_keeps_record_order() {
        let records = vec![
            kinesis_record(&data_message(&[(0, "first")])),
            kinesis_record(&data_message(&[(0, "second"), (0, "third")])),
        ];

        let payload = aggregate(&records, &LogFormat::Iot).await;
        assert_eq!(
            "IoT Log Record: first\nIoT Log Record: second\nIoT Log Record: third\n",
            payload
        );
    }

    #[tokio::test]
    async fn test_aggregate_skips_malformed_records() {
        let records = vec![
            KinesisRecord {
                kinesis: KinesisData {
                    data: "not base64!".into(),
                },
            },
            kinesis_record(&data_message(&[(0, "kept")])),
            KinesisRecord {
                kinesis: KinesisData {
                    data: base64::encode("not gzip"),
                },
            },
            KinesisRecord {
                kinesis: KinesisData {
                    data: encode_record("{not json"),
                },
            },
        ];

        let payload = aggregate(&records, &LogFormat::Iot).await;
        assert_eq!("IoT Log Record: kept\n", payload);
    }

    #[tokio::test]
    async fn test_aggregate_keeps_events_with_bad_timestamps() {
        let records = vec![kinesis_record(
            r#"{"messageType":"DATA_MESSAGE","logEvents":[{"timestamp":0,"message":"good"},{"timestamp":1000.5,"message":"float"},{"timestamp":null,"message":"null"}]}"#,
        )];

        let payload = aggregate(&records, &LogFormat::Lambda).await;
        assert_eq!(
            "Lambda Log Record: [1970-01-01T00:00:00.000Z] - good\n\n\
             Lambda Log Record: [1970-01-01T00:00:01.000Z] - float\n\n\
             Lambda Log Record: [1970-01-01T00:00:00.000Z] - null\n\n",
            payload
        );
    }

    #[tokio::test]
    async fn test_aggregate_skips_control_messages() {
        let records = vec![
            kinesis_record(CONTROL_MESSAGE),
            kinesis_record(CONTROL_MESSAGE),
        ];

        let payload = aggregate(&records, &LogFormat::Lambda).await;
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_empty_batch() {
        assert!(aggregate(&[], &LogFormat::Lambda).await.is_empty());
    }

    #[tokio::test]
    async fn test_join_ordered_ignores_completion_order() {
        // the last item finishes first
        let count = 5;
        let payload = join_ordered(0..count, |index| async move {
            for _ in 0..(count - index) * 10 {
                tokio::task::yield_now().await;
            }
            format!("{index}\n")
        })
        .await;
        assert_eq!("0\n1\n2\n3\n4\n", payload);
    }
}
