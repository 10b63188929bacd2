use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use campaign_tracker::config::Config;
use campaign_tracker::error::Error;

#[actix_web::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    campaign_tracker::run(config).await
}
