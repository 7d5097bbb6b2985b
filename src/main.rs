use ssr_lambda_bridge::{lambda, logger, BoxError, Config, RenderEntry};

fn main() -> Result<(), BoxError> {
    let cfg = Config::load()?;

    // No colour codes in CloudWatch
    logger::init(&cfg, !lambda::is_running_on_lambda())?;

    // Build the Tokio runtime, honouring the configured worker count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!("Using {workers} worker threads");
    } else {
        tracing::info!("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(ssr_lambda_bridge::run(cfg, RenderEntry::StaticFallback))
}
