use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cqlsink=info".parse().expect("valid filter")),
        )
        // stdout carries dry-run output
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cqlsink_cli::run(std::env::args().collect()).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
