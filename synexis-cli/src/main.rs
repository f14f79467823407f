use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use synexis_core::ChatSession;

mod api;
mod chat;
mod config;
mod state;

use chat::Backend;
use config::Config;
use state::SessionStore;

#[derive(Parser, Debug)]
#[command(name = "synexis", version, about = "Synexis chat assistant")]
struct Cli {
    /// Answer from local heuristics only, never contacting the chat endpoint
    #[arg(long, global = true)]
    offline: bool,

    /// Chat endpoint URL (overrides [chat].endpoint in config.toml)
    #[arg(long, env = "SYNEXIS_ENDPOINT", global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (default)
    Chat,

    /// Send a single message and print the reply
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// Print the hint payload a message would be sent with, without sending it
    Hints {
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// Print the stored conversation
    History,

    /// Start a new conversation
    Clear,

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config.toml if none exists
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let (cfg, store, mut session) = open_session()?;
            let backend = Backend::from_config(&cfg, cli.offline, cli.endpoint)?;
            chat::run_chat(&backend, &store, &mut session).await?;
        }

        Command::Ask { message } => {
            let (cfg, store, mut session) = open_session()?;
            let backend = Backend::from_config(&cfg, cli.offline, cli.endpoint)?;
            if let Some(reply) = chat::take_turn(&backend, &mut session, &message.join(" ")).await {
                println!("{reply}");
                store.save(session.history())?;
            }
        }

        Command::Hints { message } => {
            // Not saved: the stored session is left as it was.
            let (_, _, mut session) = open_session()?;
            if let Some(request) = session.begin_turn(&message.join(" ")) {
                println!("{}", serde_json::to_string_pretty(&request).context("serialize request")?);
            }
        }

        Command::History => {
            let (_, _, session) = open_session()?;
            chat::print_history(&session);
        }

        Command::Clear => {
            let (_, store, mut session) = open_session()?;
            session.clear();
            store.save(session.history())?;
            println!("Cleared {}", store.path().display());
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn open_session() -> Result<(Config, SessionStore, ChatSession)> {
    let cfg = config::load_config()?;
    let store = SessionStore::open_default()?;
    let session = ChatSession::resume(store.load()?, cfg.chat.greeting.clone(), cfg.responder);
    Ok((cfg, store, session))
}
