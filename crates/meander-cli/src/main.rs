use meander_cli::{Settings, log_version_info, run};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so the JSON report can be piped from stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    log_version_info();
    let settings = Settings::from_cli();

    if let Err(err) = run(&settings) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
