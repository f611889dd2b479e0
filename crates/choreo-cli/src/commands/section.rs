use anyhow::Result;
use choreo_core::book::ChoreBook;
use choreo_core::models::DEFAULT_SECTION;
use choreo_core::store::TaskStore;
use owo_colors::{OwoColorize, Style};

use crate::cli::SectionCommand;
use crate::views::table::display_sections;

pub async fn section_command(book: &ChoreBook<impl TaskStore>, command: SectionCommand) -> Result<()> {
    let success_style = Style::new().green().bold();
    match command {
        SectionCommand::Add { name } => {
            let name = book.add_section(&name).await?;
            println!("{} Added section: {}", "✓".style(success_style), name.bold());
        }
        SectionCommand::List => {
            let sections = book.sections().await?;
            let tasks = book.list().await?;
            let counts: Vec<usize> = sections
                .iter()
                .map(|s| tasks.iter().filter(|t| &t.section == s).count())
                .collect();
            let default_count = tasks.iter().filter(|t| t.section == DEFAULT_SECTION).count();
            display_sections(&sections, &counts, default_count);
        }
        SectionCommand::Delete { name } => {
            let moved = book.delete_section(&name).await?;
            println!("{} Deleted section: {}", "✓".style(success_style), name.bold());
            if moved > 0 {
                println!(
                    "  {} Moved {} chore(s) to '{}'",
                    "→".style(Style::new().blue()),
                    moved,
                    DEFAULT_SECTION
                );
            }
        }
    }
    Ok(())
}
