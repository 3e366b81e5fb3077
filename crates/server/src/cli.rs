//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use upkeep_schedule::{preview_occurrences, Frequency, RecurrenceSpec, MAX_PREVIEW_COUNT};

/// Recurring maintenance scheduling service.
#[derive(Parser, Debug)]
#[command(name = "upkeep-server", version, about = "Recurring maintenance scheduling service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Print upcoming due dates for a recurrence without touching any store.
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// daily, weekly, biweekly, monthly, quarterly, semi_annually or annually
    #[arg(long)]
    pub frequency: Frequency,

    /// 0 = Sunday .. 6 = Saturday
    #[arg(long)]
    pub day_of_week: Option<u32>,

    #[arg(long)]
    pub day_of_month: Option<u32>,

    #[arg(long)]
    pub month_of_year: Option<u32>,

    /// Reference date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Number of dates to print (1-100).
    #[arg(
        long,
        default_value_t = 6,
        value_parser = clap::value_parser!(u16).range(1..=MAX_PREVIEW_COUNT as i64)
    )]
    pub count: u16,
}

impl PreviewArgs {
    pub fn recurrence(&self) -> RecurrenceSpec {
        RecurrenceSpec {
            frequency: self.frequency,
            day_of_week: self.day_of_week,
            day_of_month: self.day_of_month,
            month_of_year: self.month_of_year,
        }
    }

    /// Validate the recurrence and list the next `count` due dates.
    pub fn run(&self, today: NaiveDate) -> anyhow::Result<(NaiveDate, Vec<NaiveDate>)> {
        let spec = self.recurrence();
        spec.validate()?;
        let count = usize::from(self.count);
        if count == 0 || count > MAX_PREVIEW_COUNT {
            anyhow::bail!("count must be between 1 and {}", MAX_PREVIEW_COUNT);
        }
        let from = self.from.unwrap_or(today);
        Ok((from, preview_occurrences(&spec, from, count)))
    }
}
