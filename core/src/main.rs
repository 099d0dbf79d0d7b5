use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use clipring::ipc::{self, ItemView, Request, Response};
use clipring::{Config, Daemon};
use std::io::{self, Read};
use std::sync::Arc;

const DISPLAY_WIDTH: usize = 80;

#[derive(Parser)]
#[command(name = "clipring")]
#[command(version)]
#[command(about = "bounded, deduplicated clipboard history")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run clipboard daemon
    Daemon,
    /// Search the history (empty query lists everything)
    Query {
        /// Show timestamps and available actions
        #[arg(short, long)]
        verbose: bool,
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// Run an action on a query result
    Run {
        /// Rank shown by `query`
        rank: usize,
        /// c = copy and paste, cp = copy, r = remove, s = save as snippet
        #[arg(default_value = "cp")]
        action: String,
        /// Query the rank refers to
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Record text as the latest entry (reads stdin if no args)
    Add {
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Remove an entry by its exact text (reads stdin if no args)
    Remove {
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Clear clipboard history
    Clear,
    /// Set the maximum number of entries
    Limit { limit: u32 },
    /// Enable or disable storing the history on disk
    Persist {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Enable or disable fuzzy matching
    Fuzzy {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Show daemon state
    Status,
    /// Save history and stop the daemon
    Stop,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let request = match cli.command {
        Commands::Daemon => return run_daemon().await,
        Commands::Query { verbose, query } => {
            let response = ipc::send(&Request::Query { query: query.join(" ") }).await?;
            if let Response::Items(items) = &response {
                print_items(items, verbose);
                return Ok(());
            }
            return report(response);
        }
        Commands::Run {
            rank,
            action,
            query,
        } => Request::Run {
            query,
            rank,
            action,
        },
        Commands::Add { text } => Request::Insert {
            text: args_or_stdin(text)?,
        },
        Commands::Remove { text } => Request::Remove {
            text: args_or_stdin(text)?,
        },
        Commands::Clear => Request::Clear,
        Commands::Limit { limit } => Request::SetHistoryLimit { limit },
        Commands::Persist { enabled } => Request::SetPersistent { enabled },
        Commands::Fuzzy { enabled } => Request::SetFuzzy { enabled },
        Commands::Status => Request::Status,
        Commands::Stop => Request::Exit,
    };

    report(ipc::send(&request).await?)
}

async fn run_daemon() -> Result<()> {
    // platform-specific display check
    #[cfg(target_os = "linux")]
    {
        if std::env::var("DISPLAY").is_err() && std::env::var("WAYLAND_DISPLAY").is_err() {
            anyhow::bail!("No display server available (neither X11 nor Wayland)");
        }
    }

    let config_path = Config::default_path();
    let config = Config::load_from(&config_path).context("Failed to load configuration")?;

    let daemon = Arc::new(Daemon::from_config(config, Some(config_path))?);
    daemon.run(ipc::socket_path()).await
}

fn report(response: Response) -> Result<()> {
    match response {
        Response::Done => Ok(()),
        Response::Error(e) => anyhow::bail!(e),
        Response::Status(status) => {
            println!("entries:       {}", status.entries);
            println!("history limit: {}", status.history_limit);
            println!("persistent:    {}", status.persistent);
            println!("fuzzy:         {}", status.fuzzy);
            println!("history file:  {}", status.history_file.display());
            Ok(())
        }
        Response::Items(items) => {
            print_items(&items, false);
            Ok(())
        }
    }
}

fn print_items(items: &[ItemView], verbose: bool) {
    for item in items {
        let prefix = format!("#{} ", item.rank);
        let display = truncate_to_fit(&item.text, DISPLAY_WIDTH.saturating_sub(prefix.len()));
        println!("{}{}", prefix, display);

        if verbose {
            let actions: Vec<_> = item
                .actions
                .iter()
                .map(|a| format!("{}={}", a.id, a.text))
                .collect();
            println!("    {}", item.subtitle);
            println!("    [{}]", actions.join(", "));
        }
    }
}

fn truncate_to_fit(text: &str, max_chars: usize) -> String {
    let text = text.replace(['\n', '\t'], " ");

    if text.chars().count() <= max_chars {
        text
    } else {
        let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn args_or_stdin(args: Vec<String>) -> Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}
