use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and upload a CSV file in chunks
    Upload {
        file: PathBuf,

        #[arg(
            long,
            help = "Keep polling until processing completes, then print the first page of orders"
        )]
        watch: bool,
    },
    /// Query the processing status of an uploaded file once
    Status {
        file_identifier: String,
    },
    /// Print one page of processed orders
    Orders {
        #[arg(long, default_value_t = 1, help = "Page number, starting at 1")]
        page: u32,

        #[arg(long, help = "Orders per page (defaults to itemsPerPage from config)")]
        per_page: Option<u32>,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Show recent entries from a component log (upload, poller, orders, controller)
    Logs {
        component: String,

        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        #[arg(long, help = "Overwrite an existing config file")]
        force: bool,
    },
}
