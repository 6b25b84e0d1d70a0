use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::commands::CommandResult;
use crate::ReportCommand;
use shopgauge_core::config::{AppConfig, LoadOptions};
use shopgauge_db::{
    connect_with_settings, SqlCustomerRepository, SqlOrderRepository, SqlProductRepository,
};
use shopgauge_service::{
    AnalyticsService, InventoryRiskParamsInput, OverviewParams, RangeParams, ServiceError,
    TopProductParams, TrendParams,
};

pub fn run(report: &ReportCommand) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "report",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "report",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(execute(&config, report)) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => {
            // Bad query parameters are the caller's problem; anything else is
            // an environment or data failure.
            let client_error = error
                .downcast_ref::<ServiceError>()
                .map(ServiceError::is_client_error)
                .unwrap_or(false);
            if client_error {
                CommandResult::failure("report", "invalid_request", error.to_string(), 2)
            } else {
                CommandResult::failure("report", "report_execution", format!("{error:#}"), 4)
            }
        }
    }
}

async fn execute(config: &AppConfig, report: &ReportCommand) -> Result<String> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .context("database connection failed")?;

    let service = AnalyticsService::from_config(
        config,
        Arc::new(SqlOrderRepository::new(pool.clone())),
        Arc::new(SqlProductRepository::new(pool.clone())),
        Arc::new(SqlCustomerRepository::new(pool.clone())),
    );
    let now = Utc::now();

    let value = match report {
        ReportCommand::Overview { from, to, compare_from, compare_to } => {
            let params = OverviewParams {
                range: RangeParams { from: from.clone(), to: to.clone() },
                compare_from: compare_from.clone(),
                compare_to: compare_to.clone(),
            };
            serde_json::to_value(service.overview(&params, now).await?)?
        }
        ReportCommand::Trends { from, to, interval } => {
            let params = TrendParams {
                range: RangeParams { from: from.clone(), to: to.clone() },
                interval: interval.clone(),
            };
            serde_json::to_value(service.trends(&params, now).await?)?
        }
        ReportCommand::TopProducts { from, to, limit, metric } => {
            let params = TopProductParams {
                range: RangeParams { from: from.clone(), to: to.clone() },
                limit: limit.clone(),
                metric: metric.clone(),
            };
            serde_json::to_value(service.top_products(&params, now).await?)?
        }
        ReportCommand::Categories { from, to } => {
            let params = RangeParams { from: from.clone(), to: to.clone() };
            serde_json::to_value(service.category_performance(&params, now).await?)?
        }
        ReportCommand::InventoryRisk { threshold, safety_days, window_days } => {
            let params = InventoryRiskParamsInput {
                threshold: threshold.clone(),
                safety_days: safety_days.clone(),
                window_days: window_days.clone(),
            };
            serde_json::to_value(service.inventory_risk(&params, now).await?)?
        }
        ReportCommand::Cohorts { from, to } => {
            let params = RangeParams { from: from.clone(), to: to.clone() };
            serde_json::to_value(service.cohorts(&params, now).await?)?
        }
        ReportCommand::Segments { from, to } => {
            let params = RangeParams { from: from.clone(), to: to.clone() };
            serde_json::to_value(service.customer_segments(&params, now).await?)?
        }
    };

    pool.close().await;
    serde_json::to_string_pretty(&value).context("failed to render report")
}
