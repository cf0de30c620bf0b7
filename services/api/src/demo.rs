use clap::Args;

use resilience_ai::config::AppConfig;
use resilience_ai::error::AppError;
use resilience_ai::simulation::analysis::AnalysisError;

use crate::infra::{offline_service, online_service};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Scenario headline to analyze
    pub(crate) headline: String,
    /// User bucket for result caching
    #[arg(long, default_value = "cli")]
    pub(crate) user: String,
    /// Use the reference baseline and scripted interpreter instead of
    /// live data sources
    #[arg(long)]
    pub(crate) offline: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BaselineArgs {
    /// Include raw indicator values and vintages
    #[arg(long)]
    pub(crate) audit: bool,
    /// Use the reference baseline instead of live data sources
    #[arg(long)]
    pub(crate) offline: bool,
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = if args.offline {
        offline_service(config.simulation.result_ttl)
    } else {
        online_service(&config)
    };

    let result = service
        .analyze(&args.user, &args.headline)
        .await
        .map_err(AppError::from)?;
    println!("{}", pretty(result.as_ref())?);
    Ok(())
}

pub(crate) async fn run_baseline(args: BaselineArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = if args.offline {
        offline_service(config.simulation.result_ttl)
    } else {
        online_service(&config)
    };

    if args.audit {
        let audit = service
            .baseline_audit()
            .await
            .map_err(AnalysisError::from)
            .map_err(AppError::from)?;
        println!("{}", pretty(&audit)?);
    } else {
        let snapshot = service
            .baseline()
            .await
            .map_err(AnalysisError::from)
            .map_err(AppError::from)?;
        println!("{}", pretty(snapshot.as_ref())?);
    }
    Ok(())
}

pub(crate) async fn run_demo() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = offline_service(config.simulation.result_ttl);

    let headlines = [
        "Global pandemic outbreak strains hospitals worldwide",
        "Severe cyber attack disrupts power grids in Japan and UK",
        "Financial crisis triggers recession across South Asia",
    ];

    for headline in headlines {
        let result = service
            .analyze("demo", headline)
            .await
            .map_err(AppError::from)?;
        println!("== {headline}");
        println!("{}", result.analysis);
        let fallers: Vec<&str> = result
            .impact_summary
            .top_fallers
            .iter()
            .map(|entry| entry.country.name())
            .collect();
        if !fallers.is_empty() {
            println!("hardest hit: {}", fallers.join(", "));
        }
        println!();
    }

    Ok(())
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::other(err)))
}
