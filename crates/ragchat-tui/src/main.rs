use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tokio::task::JoinError;
use ragchat_core::{ChatClient, ChatController, ChatResponse, Config, RenderMode, RequestError};

mod app;
mod handler;
mod repl;
mod tui;
mod ui;
#[cfg(test)]
mod test_support;

use app::App;
use tui::{AppEvent, EventHandler};

#[derive(Parser)]
#[command(name = "ragchat")]
#[command(about = "Terminal chat client for a RAG question-answering backend")]
struct Cli {
    /// Backend base URL (overrides RAGCHAT_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full-screen chat (default)
    Tui,
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
    },
    /// Read questions line by line from stdin
    Repl,
    /// Update and show the saved configuration
    Config {
        /// Default backend base URL
        #[arg(long = "set-base-url")]
        set_base_url: Option<String>,
        /// Message shown when a request fails
        #[arg(long)]
        error_message: Option<String>,
        /// How message text is rendered: plain or raw
        #[arg(long)]
        render_mode: Option<RenderMode>,
    },
}

fn init_logging(config: &Config, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ragchat=info,ragchat_core=info"));

    if to_file {
        // The terminal UI owns stderr
        let path = config.log_file()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init()
            .map_err(|e| anyhow!(e))?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow!(e))?;
    }

    if config.render_mode() == RenderMode::Raw {
        tracing::warn!("raw render mode is active: message text is drawn without sanitizing control sequences");
    }

    Ok(())
}

fn update_config(
    mut config: Config,
    base_url: Option<String>,
    error_message: Option<String>,
    render_mode: Option<RenderMode>,
) -> Result<()> {
    let changed = base_url.is_some() || error_message.is_some() || render_mode.is_some();
    if let Some(url) = base_url {
        config.base_url = Some(url);
    }
    if let Some(message) = error_message {
        config.error_message = Some(message);
    }
    if let Some(mode) = render_mode {
        config.render_mode = Some(mode);
    }
    if changed {
        config.save()?;
    }

    println!("{}", Config::get_config_path()?.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config` must still work when the saved file is broken, so it can fix it
    let command = match cli.command.unwrap_or(Commands::Tui) {
        Commands::Config { set_base_url, error_message, render_mode } => {
            init_logging(&Config::new(), false)?;
            return update_config(Config::load_or_new()?, set_base_url, error_message, render_mode);
        }
        command => command,
    };
    let config = Config::load()?;

    init_logging(&config, matches!(command, Commands::Tui))?;

    let base_url = cli.base_url.unwrap_or_else(|| config.base_url());
    let client = ChatClient::new(&base_url);
    tracing::info!(endpoint = client.endpoint(), "chat backend configured");

    match command {
        Commands::Ask { question } => {
            let mut ui = repl::line_surface(&config);
            let mut controller = ChatController::new(config.error_message());
            match repl::ask(&mut ui, &mut controller, &client, &question).await {
                Some(answer) => println!("{answer}"),
                None => return Err(anyhow!("question is empty")),
            }
        }
        Commands::Repl => repl::run(&config, &client).await?,
        Commands::Tui | Commands::Config { .. } => {
            let endpoint = client.endpoint().to_string();
            let app = App::new(&config, Arc::new(client), endpoint);
            run_tui(app).await?;
        }
    }

    Ok(())
}

enum Step {
    Event(Option<AppEvent>),
    Reply(Result<Result<ChatResponse, RequestError>, JoinError>),
}

async fn run_tui(mut app: App) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::draw(frame, &mut app))?;

            // Wait for input, or for the in-flight answer if there is one
            let step = match app.pending.as_mut() {
                Some(handle) => tokio::select! {
                    event = events.next() => Step::Event(event),
                    joined = handle => Step::Reply(joined),
                },
                None => Step::Event(events.next().await),
            };

            match step {
                Step::Event(Some(event)) => handler::handle_event(&mut app, event),
                Step::Event(None) => break,
                Step::Reply(joined) => app.complete(joined),
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}
