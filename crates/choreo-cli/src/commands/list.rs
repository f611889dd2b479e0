use anyhow::Result;
use chrono::Utc;
use choreo_core::book::ChoreBook;
use choreo_core::store::TaskStore;

use crate::config::Config;
use crate::views::table::display_tasks;

/// Lists the stored records themselves, not their occurrences.
pub async fn list_tasks(book: &ChoreBook<impl TaskStore>, config: &Config) -> Result<()> {
    let now = Utc::now();
    let options = config.expand_options(now)?;
    let tasks = book.list().await?;
    display_tasks(&tasks, &options, now);
    Ok(())
}
