use clap::Parser;
use relcraft::cli::{self, Cli};
use relcraft::ui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter
const LOG_ENV: &str = "RELCRAFT_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose { "relcraft=debug" } else { "relcraft=warn" };
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| default.into());
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    if let Err(e) = cli::run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
