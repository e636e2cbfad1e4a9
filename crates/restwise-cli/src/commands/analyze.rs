//! Burnout risk for one day, optionally with a service-written reason.

use std::sync::Arc;

use clap::Args;
use serde_json::json;

use restwise_core::{
    analyze_for_date, classify, BurnoutRisk, ChatCompletionsSource, Config, DayAnalysis,
    EnrichmentGate, ExplainerSettings, ExplainingClassifier,
};

use super::DayArgs;

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub day: DayArgs,
    /// Ask the configured explanation service for a friendlier reason
    #[arg(long)]
    pub explain: bool,
}

pub fn run(args: AnalyzeArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let date = args.day.date()?;
    let timetable = args.day.load()?;
    let analysis = analyze_for_date(&timetable.blocks, date);

    let risk = if args.explain {
        explained(analysis, config)?
    } else {
        classify(&analysis)
    };

    if args.day.json {
        let out = json!({
            "date": date,
            "analysis": analysis,
            "risk": risk,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Schedule for {} ({})", date, date.format("%A"));
    println!("  Total load:          {:.1} h ({} min)", analysis.total_hours(), analysis.total_minutes);
    println!("  Longest continuous:  {} min", analysis.max_continuous_minutes);
    println!("  Late activity:       {}", if analysis.has_late_block { "yes" } else { "no" });
    println!();
    println!("Burnout risk: {}", risk.level.as_str().to_uppercase());
    println!("  {}", risk.reason);
    Ok(())
}

/// Classify now, then wait for the enriched reason. The immediate result is
/// kept if the enrichment is discarded.
fn explained(analysis: DayAnalysis, config: &Config) -> Result<BurnoutRisk, Box<dyn std::error::Error>> {
    let source = match ChatCompletionsSource::from_config(&config.explainer) {
        Ok(source) => source,
        Err(err) => {
            tracing::warn!(error = %err, "explanation service unavailable");
            return Ok(classify(&analysis));
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let classifier = Arc::new(
        ExplainingClassifier::new(source, ExplainerSettings::from(&config.explainer)),
    );
    let gate = EnrichmentGate::new();

    let risk = runtime.block_on(async {
        let (immediate, pending) = classifier.spawn_enrichment(&gate, analysis);
        tracing::debug!(level = %immediate.level, "immediate classification ready");
        pending.resolve(&gate).await.unwrap_or(immediate)
    });
    Ok(risk)
}
