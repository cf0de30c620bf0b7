use crate::demo::{run_analyze, run_baseline, run_demo, AnalyzeArgs, BaselineArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use resilience_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Resilience Impact Simulator",
    about = "Estimate how crisis headlines shift country resilience scores",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one analysis from the command line and print the result JSON
    Analyze(AnalyzeArgs),
    /// Print the baseline snapshot or a full indicator audit
    Baseline(BaselineArgs),
    /// Run a scripted offline walkthrough of the pipeline
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Serve from the reference baseline and scripted interpreter,
    /// without network access
    #[arg(long)]
    pub(crate) offline: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analyze(args).await,
        Command::Baseline(args) => run_baseline(args).await,
        Command::Demo => run_demo().await,
    }
}
