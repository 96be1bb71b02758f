use anyhow::Context;
use jobwatch_engine::{
    ClassifierSettings, FetchSettings, GeminiClassifier, GoogleSearchClient, JsonLinkStore,
    NotifySettings, NtfyNotifier, Persistence, ReqwestPageFetcher, RunEngine, RunReport,
    RunServices, SearchSettings,
};
use jobwatch_logging::{watch_error, watch_info, watch_warn};

use super::config::AppConfig;
use super::logging::{self, LogDestination};

/// Entry point of the binary. Errors are configuration problems or a failed search.
pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    let destination = match config.as_ref().ok().and_then(|c| c.log_file.clone()) {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination);

    let config = config.map_err(|err| {
        watch_error!("Configuration error: {}", err);
        err
    })?;
    watch_info!("Starting job search with {:?}", config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let report = runtime.block_on(execute(&config))?;
    log_summary(&report);
    Ok(())
}

async fn execute(config: &AppConfig) -> anyhow::Result<RunReport> {
    let services = RunServices {
        search: Box::new(
            GoogleSearchClient::new(SearchSettings::default())
                .context("failed to build search client")?,
        ),
        fetcher: Box::new(
            ReqwestPageFetcher::new(FetchSettings::default())
                .context("failed to build page fetcher")?,
        ),
        classifier: Box::new(
            GeminiClassifier::new(ClassifierSettings::default(), &config.gemini_api_key)
                .context("failed to build classifier")?,
        ),
        notifier: Box::new(
            NtfyNotifier::new(NotifySettings::default(), &config.ntfy_topic)
                .context("failed to build notifier")?,
        ),
        store: Box::new(JsonLinkStore::new(config.state_file.clone())),
    };

    let engine = RunEngine::new(config.run_settings(), services);
    engine.run().await.map_err(|err| {
        watch_error!("{}", err);
        anyhow::Error::new(err)
    })
}

fn log_summary(report: &RunReport) {
    watch_info!(
        "Run complete: {} candidates, {} accepted, {} skipped.",
        report.candidates.len(),
        report.accepted.len(),
        report.skipped.len()
    );
    if let Persistence::Failed { reason } = &report.persistence {
        watch_warn!("Processed links were not saved: {}", reason);
    }
}
