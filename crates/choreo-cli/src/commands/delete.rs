use anyhow::Result;
use choreo_core::book::ChoreBook;
use choreo_core::store::TaskStore;
use dialoguer::Confirm;
use owo_colors::{OwoColorize, Style};

use crate::cli::DeleteCommand;

pub async fn delete_task(book: &ChoreBook<impl TaskStore>, command: DeleteCommand) -> Result<()> {
    let task = book.find(&command.id).await?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Delete '{}' and all of its occurrences?",
                task.name
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let removed = book.delete_all(&task.id.to_string()).await?;
    println!(
        "{} Deleted chore: {}",
        "✓".style(Style::new().green().bold()),
        removed.name.bright_white().bold()
    );
    Ok(())
}
