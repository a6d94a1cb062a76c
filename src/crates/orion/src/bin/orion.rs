//! Orion CLI - chat with the intent dispatch engine
//!
//! Main entry point for the orion command-line tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use orion::chart::{ChartKind, ChartSpec};
use orion::{cli, load_config, DispatchEngine, DispatchRequest};
use tooling::logging::{init_subscriber, LogFormat};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "orion")]
#[command(about = "Orion - intent dispatch and tool invocation for a chat agent", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file applied on top of the user and project files
    #[arg(short, long, global = true, env = "ORION_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Repl,

    /// Dispatch a single message
    Chat {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
        /// Print the envelope as JSON
        #[arg(long)]
        json: bool,
        /// Session id scoping chart artifacts
        #[arg(long)]
        session: Option<Uuid>,
    },

    /// Show the intent a message resolves to, without dispatching it
    Classify {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Evaluate an arithmetic expression
    Calc {
        #[arg(required = true, num_args = 1..)]
        expression: Vec<String>,
    },

    /// Instant-answer web search
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Translate text
    Translate {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Target language code (default from config)
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Current weather for the configured city
    Weather,

    /// Render a chart from a CSV file
    Chart {
        /// CSV file
        csv: PathBuf,
        /// Chart kind: bar, line, pie
        #[arg(short, long, default_value = "bar")]
        kind: ChartKind,
        /// Label column
        #[arg(short)]
        x: Option<String>,
        /// Value columns, comma separated
        #[arg(short, value_delimiter = ',')]
        y: Vec<String>,
        /// Chart title
        #[arg(long)]
        title: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config).await?;
    let format = config
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_default();
    init_subscriber(&config.logging.level, format)?;

    let engine = DispatchEngine::from_config(&config)?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => cli::run_repl(&engine).await?,
        Commands::Chat {
            message,
            json,
            session,
        } => {
            let mut request = DispatchRequest::new(message.join(" "));
            request.session = session;
            let envelope = engine.handle_request(request).await;
            cli::print_envelope(&envelope, json)?;
        }
        Commands::Classify { message } => {
            let intent = engine.classifier().classify(&message.join(" "));
            println!("{}", serde_json::to_string_pretty(&intent)?);
        }
        Commands::Calc { expression } => {
            cli::print_envelope(&engine.calculate(&expression.join(" ")), false)?;
        }
        Commands::Search { query } => {
            cli::print_envelope(&engine.search(&query.join(" ")).await, false)?;
        }
        Commands::Translate { text, target } => {
            let envelope = engine.translate(&text.join(" "), target.as_deref()).await;
            cli::print_envelope(&envelope, false)?;
        }
        Commands::Weather => {
            cli::print_envelope(&engine.weather().await, false)?;
        }
        Commands::Chart {
            csv,
            kind,
            x,
            y,
            title,
        } => {
            let mut spec = ChartSpec::new(kind).with_y(y);
            spec.x = x;
            spec.title = title;
            cli::print_envelope(&engine.chart_from_file(&csv, spec).await, false)?;
        }
    }

    Ok(())
}
