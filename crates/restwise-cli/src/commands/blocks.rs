use clap::Args;

use restwise_core::{resolve_for_date, Occurrence};

use super::DayArgs;

#[derive(Args)]
pub struct BlocksArgs {
    #[command(flatten)]
    pub day: DayArgs,
}

pub fn run(args: BlocksArgs) -> Result<(), Box<dyn std::error::Error>> {
    let date = args.day.date()?;
    let timetable = args.day.load()?;
    let mut blocks = resolve_for_date(&timetable.blocks, date);
    blocks.sort_by_key(|b| b.start);

    if args.day.json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }

    if blocks.is_empty() {
        println!("Nothing scheduled on {date}.");
        return Ok(());
    }

    println!("{} ({})", date, date.format("%A"));
    for b in &blocks {
        let repeat = match b.occurrence {
            Occurrence::Dated { .. } => String::new(),
            Occurrence::Recurring { end_date: Some(end), .. } => format!("  weekly until {end}"),
            Occurrence::Recurring { end_date: None, .. } => "  weekly".to_string(),
        };
        println!("  {}-{}  {:<24} [{}]{}", b.start, b.end, b.title, b.kind, repeat);
    }
    Ok(())
}
