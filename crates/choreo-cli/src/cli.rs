use choreo_core::models::Repeat;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about = "A chores calendar with recurring tasks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new chore
    Add(AddCommand),
    /// List chore records
    List,
    /// Show expanded occurrences as a calendar
    #[clap(alias = "cal")]
    Calendar(CalendarCommand),
    /// Today's checklist
    Today,
    /// Toggle the done state of one occurrence
    Done(OccurrenceCommand),
    /// Delete one occurrence, keeping the rest of the series
    Skip(OccurrenceCommand),
    /// Bring back a deleted occurrence
    Restore(OccurrenceCommand),
    /// Delete a chore and all of its occurrences
    #[clap(alias = "rm")]
    Delete(DeleteCommand),
    /// Edit a chore
    Edit(EditCommand),
    /// Manage sections
    #[command(subcommand)]
    Section(SectionCommand),
    /// Drop done/deleted marks older than a cutoff
    Compact(CompactCommand),
}

#[derive(Parser, Debug)]
pub struct AddCommand {
    /// The name of the chore
    pub name: String,

    /// When the chore first happens ('2024-05-01 09:00', 'tomorrow 8am', RFC 3339)
    #[clap(short, long)]
    pub at: Option<String>,

    /// How the chore repeats
    #[clap(short, long, value_enum, default_value_t = RepeatArg::None)]
    pub repeat: RepeatArg,

    /// Section to file the chore under; unknown sections fall back to "Other"
    #[clap(short, long)]
    pub section: Option<String>,

    /// Free-form notes
    #[clap(short, long)]
    pub description: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CalendarCommand {
    /// Only show occurrences in this section
    #[clap(short, long)]
    pub section: Option<String>,

    /// Only show occurrences on this local date (YYYY-MM-DD, 'friday', ...)
    #[clap(short, long)]
    pub date: Option<String>,

    /// Stop this many days from now instead of the configured horizon
    #[clap(long)]
    pub days: Option<u32>,
}

/// Addresses one occurrence of one chore.
#[derive(Parser, Debug)]
pub struct OccurrenceCommand {
    /// The ID (or unique prefix) of the chore
    pub id: String,

    /// The occurrence: a timestamp from `choreo calendar`, or a local date
    /// when the chore happens at most once that day
    pub occurrence: String,
}

#[derive(Parser, Debug)]
pub struct DeleteCommand {
    /// The ID (or unique prefix) of the chore to delete
    pub id: String,

    /// Delete without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct EditCommand {
    /// The ID (or unique prefix) of the chore to edit
    pub id: String,

    /// New name
    #[clap(short, long)]
    pub name: Option<String>,

    /// New anchor date and time
    #[clap(short, long, conflicts_with = "at_clear")]
    pub at: Option<String>,

    /// Remove the date, turning the chore into an undated record
    #[clap(long)]
    pub at_clear: bool,

    /// New repeat rule
    #[clap(short, long, value_enum)]
    pub repeat: Option<RepeatArg>,

    /// Move to another section
    #[clap(short, long)]
    pub section: Option<String>,

    /// New description
    #[clap(short, long, conflicts_with = "description_clear")]
    pub description: Option<String>,

    /// Remove the description
    #[clap(long)]
    pub description_clear: bool,
}

#[derive(Subcommand, Debug)]
pub enum SectionCommand {
    /// Add a section
    Add {
        /// The section name
        name: String,
    },
    /// List sections
    List,
    /// Delete a section; its chores move to "Other"
    Delete {
        /// The section name
        name: String,
    },
}

#[derive(Parser, Debug)]
pub struct CompactCommand {
    /// Drop marks older than this instant (defaults to one horizon before now)
    #[clap(long)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RepeatArg {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Daily, skipping Saturday and Sunday
    Weekdays,
    /// Stored as-is; only the first occurrence is shown
    Custom,
}

impl From<RepeatArg> for Repeat {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::None => Repeat::None,
            RepeatArg::Daily => Repeat::Daily,
            RepeatArg::Weekly => Repeat::Weekly,
            RepeatArg::Monthly => Repeat::Monthly,
            RepeatArg::Yearly => Repeat::Yearly,
            RepeatArg::Weekdays => Repeat::Weekdays,
            RepeatArg::Custom => Repeat::Custom,
        }
    }
}

impl std::fmt::Display for RepeatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", Repeat::from(*self))
    }
}
