use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_band_score(trigger: &'static str) {
    metrics::counter!("band_scores_computed_total", "trigger" => trigger).increment(1);
}

pub(crate) fn record_mock_save(outcome: &'static str) {
    metrics::counter!("mock_saves_total", "outcome" => outcome).increment(1);
}

pub(crate) fn record_mock_deactivations(count: u64) {
    if count > 0 {
        metrics::counter!("mock_deactivations_total").increment(count);
    }
}
