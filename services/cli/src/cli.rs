use crate::demo::{run_check, run_demo, CheckArgs, DemoArgs};
use clap::{Parser, Subcommand, ValueEnum};
use onboarding::config::AppConfig;
use onboarding::error::AppError;
use onboarding::telemetry;
use onboarding::workflows::onboarding::FlowKind;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "onboarding",
    about = "Exercise the onboarding request lifecycle from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk one applicant through submission and admin review (default command)
    Demo(DemoArgs),
    /// Validate a JSON submission and print the writes it would produce
    Check(CheckArgs),
}

/// Onboarding path selected on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum FlowArg {
    #[default]
    Applicant,
    Volunteer,
}

impl From<FlowArg> for FlowKind {
    fn from(value: FlowArg) -> Self {
        match value {
            FlowArg::Applicant => FlowKind::Applicant,
            FlowArg::Volunteer => FlowKind::Volunteer,
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, "configuration loaded");

    match cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()))
    {
        Command::Demo(args) => run_demo(&config, args).await,
        Command::Check(args) => run_check(&config, args),
    }
}
