//! CLI entry point - the composition root.
//!
//! Parses arguments, wires adapters via [`bootstrap`] and routes each
//! command to its handler. Errors are printed once and turned into an exit
//! code here.

use clap::Parser;

use nvserve_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers, init_tracing};

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = bootstrap(CliConfig::from_cli(&cli))?;

    match cli.command {
        Commands::Install { target } => handlers::install::execute(&ctx, &target).await,
        Commands::Start {
            workspace,
            skip_install,
            server,
        } => handlers::start::execute(&ctx, &workspace, skip_install, &server).await,
        Commands::Status => handlers::status::execute(&ctx),
        Commands::Stop => handlers::stop::execute(&ctx),
        Commands::Options { json } => handlers::options::execute(json),
        Commands::Paths { user } => handlers::paths::execute(&ctx, user.as_deref()),
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads NVSERVE_* defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        tracing::debug!(?err, "Command failed");
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}
