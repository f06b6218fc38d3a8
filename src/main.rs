mod error;
mod task;
mod task_store;
mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use error::{Result, TaskError};
use std::path::{Path, PathBuf};
use task::Status;
use task_store::{parse_id, TaskStore, DEFAULT_FILE};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ui::Palette;

#[derive(Parser)]
#[command(name = "tasky", version)]
#[command(about = "Track tasks in a local JSON file", long_about = None)]
struct Cli {
    /// Task file to read and write
    #[arg(short, long, global = true, env = "TASKY_FILE", default_value = DEFAULT_FILE)]
    file: PathBuf,

    /// Print status markers without colour
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all tasks, or only those with the given status
    List {
        #[arg(value_enum)]
        status: Option<Status>,
    },
    /// Add a new task
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },
    /// Replace the description of a task
    Update {
        id: Option<String>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },
    /// Delete a task
    Delete { id: Option<String> },
    /// Delete all tasks
    Clear,
    /// Mark a task as in-progress
    Doing { id: Option<String> },
    /// Mark a task as done
    Done { id: Option<String> },
}

impl Commands {
    /// What the command was trying to do, for error reports.
    fn operation(&self) -> &'static str {
        match self {
            Commands::List { .. } => "list tasks",
            Commands::Add { .. } => "add task",
            Commands::Update { .. } => "update task",
            Commands::Delete { .. } => "delete task",
            Commands::Clear => "delete tasks",
            Commands::Doing { .. } | Commands::Done { .. } => "update task status",
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            print!("{err}");
            if err.kind() == ErrorKind::InvalidSubcommand {
                println!();
                print_usage();
            }
            return;
        }
    };

    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        print_usage();
        return;
    };

    let palette = Palette::detect(cli.no_color);
    let operation = command.operation();
    if let Err(err) = run(command, &cli.file, &palette) {
        println!("Failed to {operation}: {err}");
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "tasky=debug" } else { "tasky=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    if let Err(err) = Cli::command().print_long_help() {
        eprintln!("could not print usage: {err}");
    }
}

fn run(command: Commands, file: &Path, palette: &Palette) -> Result<()> {
    let mut store = TaskStore::load(file)?;
    debug!(file = %store.path().display(), "task file ready");

    match command {
        Commands::List { status } => {
            print!("{}", ui::render_list(&store.list(status), status, palette));
        }
        Commands::Add { description } => {
            let description = join_words(&description, "add <description>")?;
            let task = store.add_task(&description)?;
            println!("Task added successfully! (ID: {})", task.id);
        }
        Commands::Update { id, description } => {
            let id = require_id(id.as_deref(), "update <id> <new description>")?;
            let description = join_words(&description, "update <id> <new description>")?;
            store.update_task(id, &description)?;
            println!("Task updated successfully!");
        }
        Commands::Delete { id } => {
            let id = require_id(id.as_deref(), "delete <id>")?;
            store.delete_task(id)?;
            println!("Task deleted successfully!");
        }
        Commands::Clear => {
            let removed = store.clear()?;
            println!("Tasks deleted successfully! ({removed} removed)");
        }
        Commands::Doing { id } => {
            let id = require_id(id.as_deref(), "doing <id>")?;
            set_status(&mut store, id, Status::InProgress)?;
        }
        Commands::Done { id } => {
            let id = require_id(id.as_deref(), "done <id>")?;
            set_status(&mut store, id, Status::Done)?;
        }
    }

    Ok(())
}

fn set_status(store: &mut TaskStore, id: u32, status: Status) -> Result<()> {
    store.set_status(id, status)?;
    println!("Task status successfully updated to '{status}'!");
    Ok(())
}

fn require_id(raw: Option<&str>, usage: &str) -> Result<u32> {
    let raw = raw.ok_or_else(|| {
        TaskError::validation(format!("missing task ID, usage: tasky {usage}"))
    })?;
    parse_id(raw)
}

fn join_words(words: &[String], usage: &str) -> Result<String> {
    if words.is_empty() {
        return Err(TaskError::validation(format!(
            "missing task description, usage: tasky {usage}"
        )));
    }
    Ok(words.join(" "))
}
