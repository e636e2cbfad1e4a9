pub mod analyze;
pub mod blocks;
pub mod breaks;
pub mod check;
pub mod config;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;

use restwise_core::{Timetable, ValidationError};

/// Arguments shared by every command that reads a day of the timetable.
#[derive(Args, Debug, Clone)]
pub struct DayArgs {
    /// Timetable JSON file
    #[arg(long, short = 't')]
    pub timetable: PathBuf,
    /// Day to look at (YYYY-MM-DD), defaults to today
    #[arg(long, short = 'd')]
    pub date: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DayArgs {
    pub fn date(&self) -> Result<NaiveDate, ValidationError> {
        match &self.date {
            Some(raw) => parse_date(raw),
            None => Ok(Local::now().date_naive()),
        }
    }

    pub fn load(&self) -> Result<Timetable, Box<dyn std::error::Error>> {
        Ok(Timetable::load(&self.timetable)?)
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}
