use ipowatch_core::{Config, StatusAggregatorBuilder};
use serde_json::Value;

use crate::error::CliError;

pub async fn run(config: &Config) -> Result<Value, CliError> {
    let aggregator = StatusAggregatorBuilder::from_config(config).build();
    let report = aggregator.check_detailed(&config.symbol).await;
    Ok(serde_json::to_value(report)?)
}
