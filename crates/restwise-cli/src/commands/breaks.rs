use clap::Args;

use restwise_core::{find_conflicts, plan_breaks_for_date, ProposedInterval};

use super::DayArgs;

#[derive(Args)]
pub struct BreaksArgs {
    #[command(flatten)]
    pub day: DayArgs,
    /// Append the suggested breaks to the timetable file
    #[arg(long)]
    pub accept: bool,
}

pub fn run(args: BreaksArgs) -> Result<(), Box<dyn std::error::Error>> {
    let date = args.day.date()?;
    let mut timetable = args.day.load()?;
    let suggestions = plan_breaks_for_date(&timetable.blocks, date);

    if args.day.json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else if suggestions.is_empty() {
        println!("No breaks suggested for {date}.");
    } else {
        println!("Suggested breaks for {date}:");
        for b in &suggestions {
            println!("  {}-{}  {} ({} min)", b.start, b.end, b.title, b.duration_minutes());
        }
    }

    if !args.accept || suggestions.is_empty() {
        return Ok(());
    }

    let existing_breaks: Vec<_> = timetable
        .blocks
        .iter()
        .filter(|b| b.is_break())
        .cloned()
        .collect();
    for suggestion in suggestions {
        let proposed = ProposedInterval::dated(date, suggestion.start, suggestion.end);
        let clashes = find_conflicts(&proposed, &existing_breaks);
        if !clashes.is_empty() {
            eprintln!(
                "warning: {} {}-{} overlaps existing break '{}'",
                suggestion.title,
                suggestion.start,
                suggestion.end,
                clashes[0].title
            );
        }
        timetable.blocks.push(suggestion.into_block());
    }
    timetable.save(&args.day.timetable)?;
    eprintln!("Saved to {}", args.day.timetable.display());
    Ok(())
}
