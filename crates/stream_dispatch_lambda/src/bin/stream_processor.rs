use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use stream_dispatch_core::response::DispatchResponse;
use stream_dispatch_lambda::adapters::dynamodb::DynamoItemStore;
use stream_dispatch_lambda::config::DispatcherConfig;
use stream_dispatch_lambda::dispatcher::Dispatcher;
use stream_dispatch_lambda::handlers::mutation::LoggingHandlers;
use stream_dispatch_lambda::logging::init_tracing;

async fn handle_request(
    dispatcher: &Dispatcher<'_>,
    event: LambdaEvent<Value>,
) -> Result<DispatchResponse, Error> {
    let (payload, context) = event.into_parts();
    tracing::debug!(request_id = %context.request_id, "received invocation");
    Ok(dispatcher.dispatch(payload).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = DispatcherConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoItemStore::new(aws_sdk_dynamodb::Client::new(&aws_config));
    let handlers = LoggingHandlers;
    let dispatcher = Dispatcher::new(&store, &handlers, &handlers, &config.table_name);

    let dispatcher = &dispatcher;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(dispatcher, event).await
    }))
    .await
}
