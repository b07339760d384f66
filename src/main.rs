//! askdb - ask a relational database questions in plain language.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use askdb::cli::{is_exit_command, Cli, SEPARATOR};
use askdb::config::{Config, ConnectionConfig};
use askdb::db::{self, DatabaseClient};
use askdb::error::AskError;
use askdb::format::{format_error, format_success};
use askdb::llm::create_generator;
use askdb::logging;
use askdb::pipeline::Pipeline;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

const PROMPT: &str = "Enter your question: ";

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();

    let logging = match &cli.log_file {
        Some(path) => logging::init_file_logging(path, cli.log_level.as_deref()),
        None => logging::init_stderr_logging(cli.log_level.as_deref()),
    };
    if let Err(e) = logging {
        eprintln!("{}", format_error(&e.to_string(), Some("logging")));
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        let category = e
            .downcast_ref::<AskError>()
            .map_or("Error", AskError::category);
        error!("{}: {:#}", category, e);
        eprintln!("{}", format_error(&format!("{e:#}"), Some(category)));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let connection = resolve_connection(&cli, &config)?;
    let generator = create_generator(&config.llm)?;
    let client = db::connect(&connection).await?;

    if let Some(seed) = &cli.seed {
        let script = std::fs::read_to_string(seed)
            .with_context(|| format!("Failed to read seed file {}", seed.display()))?;
        client
            .execute_script(&script)
            .await
            .with_context(|| format!("Failed to run seed file {}", seed.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Seeded database from {}", seed.display()), None)
        );
    }

    let pipeline = Pipeline::new(client.clone(), generator, config.pipeline.clone());

    if cli.is_interactive() {
        interactive(&pipeline).await?;
    } else {
        for question in &cli.questions {
            answer(&pipeline, question).await;
        }
    }

    close(client).await;
    Ok(())
}

/// Resolves the connection with precedence:
/// 1. `--database-url`
/// 2. Named connection from config (`-c`)
/// 3. Default connection from config
/// 4. `DATABASE_URL`
/// 5. `PG*` environment variables
fn resolve_connection(cli: &Cli, config: &Config) -> askdb::error::Result<ConnectionConfig> {
    let mut connection = match cli.to_connection_config()? {
        Some(conn) => conn,
        None => match cli.connection_name() {
            Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
                AskError::config(format!("Connection '{}' not found in config file", name))
            })?,
            None => match config.get_connection(None) {
                Some(conn) => conn.clone(),
                None => match std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()) {
                    Some(url) => ConnectionConfig::from_connection_string(&url)?,
                    None => ConnectionConfig::default(),
                },
            },
        },
    };

    connection.apply_env_defaults();

    if connection.url.is_none() && connection.database.is_none() {
        return Err(AskError::config(
            "No database connection configured. Use --database-url, a [connections] entry, or DATABASE_URL.",
        ));
    }

    Ok(connection)
}

async fn answer(pipeline: &Pipeline, question: &str) {
    println!("\n{SEPARATOR}");
    println!("{}", pipeline.run_query(question).await);
    println!("{SEPARATOR}");
}

async fn interactive(pipeline: &Pipeline) -> anyhow::Result<()> {
    println!("{SEPARATOR}");
    println!("askdb: ask your database in plain language");
    println!("{SEPARATOR}");
    println!("\nTips:");
    println!("  - Describe what you want to query in natural language");
    println!("  - Type 'quit' or 'exit' to quit");
    println!("\nExample questions:");
    println!("  - Show all users");
    println!("  - Count total sales for each product");
    println!("  - Show the 3 most expensive products");
    println!("{SEPARATOR}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n{PROMPT}");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(line) = line else {
            println!();
            break;
        };

        let question = line.trim();
        if is_exit_command(question) {
            break;
        }
        if question.is_empty() {
            continue;
        }

        answer(pipeline, question).await;
    }

    println!("\nGoodbye!");
    Ok(())
}

async fn close(client: Arc<dyn DatabaseClient>) {
    if let Err(e) = client.close().await {
        error!("Failed to close database connection: {}", e);
    }
}
