use cloudwatch_log_archiver::{handle_request, Request, Settings};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();

    // Get AWS Configuration
    let config = aws_config::load_from_env().await;
    let settings = Settings::from_env();
    tracing::info!(?settings, "starting log archiver");

    run(service_fn(|event: LambdaEvent<Request>| {
        handle_request(&config, &settings, event)
    }))
    .await
}
