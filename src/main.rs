use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use commands::{Commands, ConfigCommand};
use order_uploader::api::OrderServiceClient;
use order_uploader::config::{
    get_config_file_path, get_logs_dir, load_config_from, save_config_to, ClientConfig,
};
use order_uploader::controller::{Controller, RunExit, RunUntil};
use order_uploader::display::{
    format_event, format_orders_table, format_pagination, format_progress, format_status,
};
use order_uploader::events::{EventBus, EventReceiver};
use order_uploader::logging::{init_logging, read_component_logs};
use order_uploader::orders::{Pagination, ResultFetcher};
use order_uploader::shutdown::ShutdownCoordinator;
use order_uploader::upload::SelectedFile;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::info;

mod commands;

#[derive(Parser)]
#[command(
    name = "order-uploader",
    version,
    about = "Upload CSV order files in chunks and track their processing"
)]
struct Cli {
    #[arg(long, global = true, help = "Order service base URL")]
    server_url: Option<String>,

    #[arg(long, global = true, help = "Config file path")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logs_dir = get_logs_dir()?;
    if let Err(e) = init_logging(&logs_dir) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => get_config_file_path()?,
    };

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommand::Show => {
                let config = effective_config(&config_path, cli.server_url.as_deref())?;
                println!("# {}", config_path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigCommand::Init { force } => {
                if config_path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }
                save_config_to(&config_path, &ClientConfig::default())?;
                println!("Wrote {}", config_path.display());
            }
        },
        Commands::Logs { component, limit } => {
            let entries = read_component_logs(&logs_dir, &component, Some(limit))
                .map_err(|e| anyhow::anyhow!("Failed to read {} log: {}", component, e))?;
            if entries.is_empty() {
                println!("No {} log entries", component);
            }
            for entry in entries {
                println!(
                    "{} {:<5} {}",
                    entry.timestamp, entry.level, entry.message
                );
            }
        }
        Commands::Status { file_identifier } => {
            let config = effective_config(&config_path, cli.server_url.as_deref())?;
            let client = OrderServiceClient::new(&config)?;
            let status = client
                .processing_status(&file_identifier)
                .await
                .with_context(|| format!("Failed to fetch status for {}", file_identifier))?;
            println!("{}", format_status(&status));
        }
        Commands::Orders { page, per_page } => {
            let config = effective_config(&config_path, cli.server_url.as_deref())?;
            let client = OrderServiceClient::new(&config)?;
            let mut fetcher = ResultFetcher::new(Arc::new(client));
            let result = fetcher
                .seek_page(page, per_page.unwrap_or(config.items_per_page))
                .await?;

            println!("{}", format_orders_table(&result.orders));
            println!(
                "{}",
                format_pagination(&Pagination {
                    page: result.page.max(1),
                    total_pages: result.total_pages.max(1),
                })
            );
        }
        Commands::Upload { file, watch } => {
            let config = effective_config(&config_path, cli.server_url.as_deref())?;
            upload(config, file, watch).await?;
        }
    }

    Ok(())
}

fn effective_config(path: &std::path::Path, server_url: Option<&str>) -> anyhow::Result<ClientConfig> {
    let mut config = load_config_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    if let Some(url) = server_url {
        config.server_url = url.to_string();
    }
    config.validate()?;
    Ok(config)
}

fn spawn_event_printer(mut events: EventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = format_event(&event) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn upload(config: ClientConfig, path: PathBuf, watch: bool) -> anyhow::Result<()> {
    let shutdown = ShutdownCoordinator::new();
    shutdown.listen_for_ctrl_c();

    let events = EventBus::default();
    let printer = spawn_event_printer(events.subscribe());

    let client = OrderServiceClient::new(&config)?;
    let mut controller = Controller::with_client(&config, client, events);

    let file = SelectedFile::from_path(&path)?;
    let file_identifier = controller.select_file(file).await?;
    info!("Uploading {} as {}", path.display(), file_identifier);
    println!("File identifier: {}", file_identifier);

    let until = if watch {
        RunUntil::ProcessingCompleted
    } else {
        RunUntil::UploadFinished
    };
    let exit = controller.run(until, &shutdown).await;

    let state = controller.state().clone();
    drop(controller);
    let _ = printer.await;

    if let Some(session) = &state.session {
        println!("{}", format_progress(session));
    }
    if exit == RunExit::Interrupted {
        bail!("Interrupted before the upload settled");
    }
    if let Some(error) = &state.upload_error {
        bail!("Upload of {} aborted: {}", file_identifier, error);
    }

    if watch {
        if let Some(status) = &state.status {
            println!("{}", format_status(status));
        }
        println!("{}", format_orders_table(&state.orders));
        println!("{}", format_pagination(&state.pagination));
    }

    Ok(())
}
