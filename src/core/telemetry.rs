use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&settings.telemetry().log_level)));

    let builder = fmt().with_env_filter(filter).with_target(false);

    if settings.telemetry().json {
        builder
            .json()
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .try_init()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    } else {
        builder
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .try_init()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    }

    Ok(())
}

// sqlx statement logging is noisy at info; keep it at warn unless asked for explicitly.
fn default_directives(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("{level},sqlx=warn")
    }
}

#[cfg(test)]
mod tests {
    use super::default_directives;

    #[test]
    fn plain_level_quiets_sqlx() {
        assert_eq!(default_directives("debug"), "debug,sqlx=warn");
    }

    #[test]
    fn explicit_directives_pass_through() {
        assert_eq!(default_directives("info,mockband=trace"), "info,mockband=trace");
    }
}
