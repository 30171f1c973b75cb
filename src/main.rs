use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use todolist::{
    AlertRaised, Banner, Config, KeyValueStore, NotificationBus, RefreshTicker, Severity,
    TodoError, TodoPatch, TodoRepository, TodoType, group_by_date, pending_label, phonetic,
    visible,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const WATCH_POLL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "Personal todo list grouped by the day each todo was created")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file (default: platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new todo
    Add {
        /// What needs doing
        #[arg(required = true)]
        text: Vec<String>,

        /// work, personal or weekend
        #[arg(short = 't', long = "type", default_value = "work")]
        todo_type: TodoType,
    },

    /// Show todos grouped by creation date
    List {
        /// Hide completed todos
        #[arg(long)]
        hide_completed: bool,

        /// Keep running and reprint every refresh interval
        #[arg(short, long)]
        watch: bool,
    },

    /// Mark a todo as done
    Done { id: String },

    /// Mark a done todo as open again
    Reopen { id: String },

    /// Change the text or type of a todo
    Edit {
        id: String,

        #[arg(long)]
        text: Option<String>,

        #[arg(short = 't', long = "type")]
        todo_type: Option<TodoType>,
    },

    /// Delete a todo
    Delete {
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Spell a word in the NATO phonetic alphabet
    Phonetic { word: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Phonetic { word } = &cli.command {
        println!("{}", phonetic::transliterate(word).join(" "));
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }

    let bus = NotificationBus::new();
    let banner = Arc::new(Mutex::new(Banner::new(config.banner_ttl()?)));
    let sink = Arc::clone(&banner);
    bus.subscribe(move |alert| {
        if let Ok(mut banner) = sink.lock() {
            banner.show(alert.clone(), Utc::now());
        }
    });

    let mut repo = TodoRepository::open(config.open_store()?, config.storage_key.clone(), bus);

    let outcome = run(&mut repo, &config, cli.command);

    if let Ok(mut banner) = banner.lock() {
        if let Some(alert) = banner.current(Utc::now()) {
            print_banner(alert);
        }
    }

    let Err(e) = outcome else {
        return Ok(());
    };
    let absorbed = match e.downcast_ref::<TodoError>() {
        Some(TodoError::NotFound(id)) => {
            // Stale id: nothing to do
            warn!(%id, "No todo with that id");
            true
        }
        Some(TodoError::Validation(_)) => true,
        _ => false,
    };
    if absorbed { Ok(()) } else { Err(e) }
}

fn run<S: KeyValueStore>(
    repo: &mut TodoRepository<S>,
    config: &Config,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Add { text, todo_type } => {
            let todo = repo.add(&text.join(" "), todo_type)?;
            println!("{}", todo.id.dimmed());
        }
        Commands::List {
            hide_completed,
            watch,
        } => {
            let hide_completed = hide_completed || config.hide_completed;
            print_groups(repo, hide_completed);
            if watch {
                let mut ticker = RefreshTicker::new(config.refresh_interval()?, Utc::now());
                loop {
                    thread::sleep(WATCH_POLL);
                    if ticker.poll(Utc::now()) {
                        println!();
                        print_groups(repo, hide_completed);
                    }
                }
            }
        }
        Commands::Done { id } => {
            let id = repo.resolve_id(&id)?;
            repo.update(&id, TodoPatch::completed(true))?;
        }
        Commands::Reopen { id } => {
            let id = repo.resolve_id(&id)?;
            repo.update(&id, TodoPatch::completed(false))?;
        }
        Commands::Edit {
            id,
            text,
            todo_type,
        } => {
            let id = repo.resolve_id(&id)?;
            let patch = TodoPatch {
                text,
                todo_type,
                ..TodoPatch::default()
            };
            if patch.is_empty() {
                println!("Nothing to change");
                return Ok(());
            }
            repo.update(&id, patch)?;
        }
        Commands::Delete { id, yes } => {
            let id = repo.resolve_id(&id)?;
            if !yes {
                println!("Refusing to delete without --yes");
                return Ok(());
            }
            repo.delete(&id)?;
        }
        Commands::Phonetic { word } => {
            println!("{}", phonetic::transliterate(&word).join(" "));
        }
    }
    Ok(())
}

fn print_groups<S: KeyValueStore>(repo: &TodoRepository<S>, hide_completed: bool) {
    println!("Number of Todos: {}", repo.len());

    let shown: Vec<_> = visible(repo.list(), hide_completed).into_iter().cloned().collect();
    if shown.is_empty() {
        println!(
            "{}",
            "You have not defined any todos. Use `todolist add` to add one.".italic()
        );
        return;
    }

    let now = Utc::now();
    for group in group_by_date(&shown) {
        println!("\n{}", group.label.bold());
        for todo in &group.todos {
            let mark = if todo.completed { "[x]".green() } else { "[ ]".normal() };
            let text = if todo.completed {
                todo.text.strikethrough()
            } else {
                todo.text.normal()
            };
            println!(
                "  {} {:<8} {:<9} {}  {}",
                mark,
                short_id(&todo.id).dimmed(),
                todo.todo_type.to_string(),
                text,
                pending_label(todo.time_modified, now).yellow()
            );
        }
    }
}

/// Last eight characters of an id
fn short_id(id: &str) -> &str {
    // uuid v7 leads with the timestamp, the tail is the distinguishing part
    id.char_indices().rev().nth(7).map_or(id, |(i, _)| &id[i..])
}

fn print_banner(alert: &AlertRaised) {
    let title = match alert.severity {
        Severity::Error => alert.title.red().bold(),
        Severity::Warning => alert.title.truecolor(255, 140, 0).bold(),
        Severity::Info => alert.title.blue().bold(),
        Severity::Success => alert.title.cyan().bold(),
    };
    match &alert.details {
        Some(details) => eprintln!("{} {}", title, details),
        None => eprintln!("{}", title),
    }
}
