use std::sync::Arc;

use ipowatch_core::{
    Config, HttpClient, Monitor, ReqwestHttpClient, StateStore, StatusAggregatorBuilder,
    TelegramNotifier,
};
use serde_json::Value;
use tracing::warn;

use crate::error::CliError;

pub async fn run(config: &Config) -> Result<Value, CliError> {
    let telegram = config.telegram()?;
    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    let monitor = Monitor::new(
        StatusAggregatorBuilder::from_config(config)
            .with_http_client(http_client.clone())
            .build(),
        StateStore::new(config.state_path.clone()),
        Arc::new(TelegramNotifier::new(telegram, http_client)),
    );

    let report = monitor.run_once(&config.symbol).await;
    if !report.is_clean() {
        warn!(symbol = %config.symbol, "run completed with failures");
    }

    Ok(serde_json::to_value(report)?)
}
