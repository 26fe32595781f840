use std::sync::Arc;

use clap::{Parser, Subcommand};
use donna_core::config;
use donna_dialogue::Orchestrator;
use donna_oracle::OpenAiOracle;
use donna_store::TaskStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "donna", version, about = "Donna — conversational task assistant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session.
    Chat {
        /// Username the session belongs to.
        #[arg(short, long, default_value = "me")]
        user: String,
    },
    /// List stored tasks for a user.
    Tasks {
        /// Username whose tasks to list.
        #[arg(short, long, default_value = "me")]
        user: String,
    },
    /// Check configuration and store health.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Chat { user } => {
            let cfg = config::load(&cli.config)?;
            let store = TaskStore::new(&cfg.store.db_path).await?;
            let oracle = Arc::new(OpenAiOracle::from_config(&cfg.oracle)?);
            let user_id = store.get_or_create_user(&user).await?;

            let mut orchestrator = Orchestrator::new(
                store,
                oracle.clone(),
                oracle,
                cfg.store.context_summaries,
            );

            info!("chat session started for {user}");
            println!("{} is listening. Type 'exit' to leave.", cfg.donna.name);

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut stdout = tokio::io::stdout();
            loop {
                stdout.write_all(b"you> ").await?;
                stdout.flush().await?;
                let Some(line) = lines.next_line().await? else {
                    break;
                };
                let message = line.trim();
                if message.is_empty() {
                    continue;
                }
                if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
                    break;
                }
                let response = orchestrator.process_message(user_id, &user, message).await;
                println!("{}> {response}", cfg.donna.name.to_lowercase());
            }
            println!("Bye!");
        }
        Commands::Tasks { user } => {
            let cfg = config::load(&cli.config)?;
            let store = TaskStore::new(&cfg.store.db_path).await?;
            let user_id = store.get_or_create_user(&user).await?;
            let tasks = store.get_user_tasks(user_id).await?;

            if tasks.is_empty() {
                println!("No tasks stored for {user}.");
            } else {
                println!("Tasks for {user}:");
                for task in &tasks {
                    let mut line = format!("  [{}] {} ({})", task.id, task.title, task.status);
                    if let (Some(date), Some(time)) =
                        (task.due_date.as_deref(), task.due_time.as_deref())
                    {
                        line.push_str(&format!(" due {date} {time}"));
                    }
                    if let (Some(date), Some(time)) =
                        (task.reminder_date.as_deref(), task.reminder_time.as_deref())
                    {
                        line.push_str(&format!(", reminder {date} {time}"));
                    }
                    println!("{line}");
                }
            }
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("Donna — Status Check\n");
            println!("Config: {}", cli.config);
            println!("Model: {}", cfg.oracle.model);
            println!(
                "Oracle key: {}",
                if cfg.oracle.resolve_api_key().is_some() {
                    "configured"
                } else {
                    "missing (set [oracle].api_key or OPENAI_API_KEY)"
                }
            );

            match TaskStore::new(&cfg.store.db_path).await {
                Ok(_) => println!("Store: ok ({})", cfg.store.db_path),
                Err(e) => println!("Store: error ({e})"),
            }
        }
    }

    Ok(())
}
