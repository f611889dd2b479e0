use choreo_core::book::ChoreBook;
use choreo_core::error::CoreError;
use choreo_core::store::JsonFileStore;
use clap::Parser;
use log::warn;
use owo_colors::{OwoColorize, Style};

mod cli;
mod commands;
mod config;
mod logging;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let (config, config_error) = match config::Config::new() {
        Ok(config) => (config, None),
        Err(e) => (config::Config::default(), Some(e)),
    };
    let _logger = match logging::init_logging(&config.log_level) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("{} {}", "Warning:".yellow().bold(), e);
            None
        }
    };
    if let Some(e) = config_error {
        warn!("event=config_fallback module=cli error={}", e);
        eprintln!(
            "{} Could not load configuration, using defaults: {}",
            "Warning:".yellow().bold(),
            e
        );
    }

    let book = match ChoreBook::new(JsonFileStore::new(&config.data_dir), config.user_id.as_str()) {
        Ok(book) => book,
        Err(e) => {
            handle_error(e.into());
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&book, command, &config).await,
        cli::Commands::List => commands::list::list_tasks(&book, &config).await,
        cli::Commands::Calendar(command) => {
            commands::calendar::show_calendar(&book, command, &config).await
        }
        cli::Commands::Today => commands::calendar::show_today(&book, &config).await,
        cli::Commands::Done(command) => {
            commands::occurrence::toggle_done(&book, command, &config).await
        }
        cli::Commands::Skip(command) => {
            commands::occurrence::skip_occurrence(&book, command, &config).await
        }
        cli::Commands::Restore(command) => {
            commands::occurrence::restore_occurrence(&book, command, &config).await
        }
        cli::Commands::Delete(command) => commands::delete::delete_task(&book, command).await,
        cli::Commands::Edit(command) => commands::edit::edit_task(&book, command, &config).await,
        cli::Commands::Section(command) => {
            commands::section::section_command(&book, command).await
        }
        cli::Commands::Compact(command) => {
            commands::compact::compact(&book, command, &config).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, name) in tasks {
                    eprintln!("  {} ({})", id.yellow(), name);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::Serialization(e) => {
                eprintln!(
                    "{} The chores document is malformed and was left untouched: {}",
                    "Error:".style(error_style),
                    e
                );
            }
            CoreError::Io(e) => {
                eprintln!("{} Could not access the data directory: {}", "Error:".style(error_style), e);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), core_error),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
