use chrono::Datelike;
use clap::Args;
use serde_json::json;

use restwise_core::{find_conflicts, ProposedInterval, TimeOfDay};

use super::DayArgs;

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub day: DayArgs,
    /// Start time (HH:MM)
    #[arg(long)]
    pub start: String,
    /// End time (HH:MM)
    #[arg(long)]
    pub end: String,
    /// Propose a weekly block starting on the given date
    #[arg(long)]
    pub weekly: bool,
}

pub fn run(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let date = args.day.date()?;
    let start: TimeOfDay = args.start.parse()?;
    let end: TimeOfDay = args.end.parse()?;
    let proposed = if args.weekly {
        ProposedInterval::weekly(date.weekday(), date, start, end)
    } else {
        ProposedInterval::dated(date, start, end)
    };
    proposed.validate()?;

    let timetable = args.day.load()?;
    let conflicts = find_conflicts(&proposed, &timetable.blocks);

    if args.day.json {
        let out = json!({
            "proposed": proposed,
            "conflicts": conflicts,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No conflicts for {start}-{end} on {date}.");
    } else {
        println!("{} conflict(s) for {start}-{end} on {date}:", conflicts.len());
        for c in conflicts {
            println!("  {}-{}  {} [{}]", c.start, c.end, c.title, c.kind);
        }
    }
    Ok(())
}
