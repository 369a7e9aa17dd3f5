use clap::Parser;
use querylab::cli::{self, CliArgs, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Keep the REPL quiet unless asked otherwise
    let default_filter = match args.command {
        None | Some(Command::Repl) => "querylab=warn,querylab_core=warn",
        Some(_) => "querylab=info,querylab_core=info",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::execute(args)
}
