use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};

use stepform::app::App;
use stepform::config::Config;
use stepform::submit::HttpSubmitter;
use stepform::{cli, logging, rest, ui};

#[derive(Parser)]
#[command(name = "stepform")]
#[command(about = "Multi-step sign-up wizard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the form interactively (default)
    Fill,

    /// Validate a JSON file of form values against every step
    Check {
        /// JSON object of field values
        file: PathBuf,
    },

    /// Walk a JSON file of form values through the wizard and submit it
    Submit {
        /// JSON object of field values
        file: PathBuf,

        /// Submission endpoint (default: submit.endpoint from config)
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Run the submission endpoint
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = matches!(cli.command, None | Some(Commands::Fill));
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        None | Some(Commands::Fill) => {
            run_tui(&config, logging_handle.log_file_path).await?;
        }
        Some(Commands::Check { file }) => {
            cmd_check(&file)?;
        }
        Some(Commands::Submit { file, endpoint }) => {
            cmd_submit(&config, &file, endpoint).await?;
        }
        Some(Commands::Serve { port }) => {
            cmd_serve(&config, port).await?;
        }
    }

    Ok(())
}

async fn run_tui(config: &Config, log_file_path: Option<PathBuf>) -> Result<()> {
    ui::install_panic_hook();

    let mut app = App::new(config)?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn cmd_check(file: &Path) -> Result<()> {
    cli::run_check(file, &mut io::stdout())
}

async fn cmd_submit(config: &Config, file: &Path, endpoint: Option<String>) -> Result<()> {
    let mut submit_config = config.submit.clone();
    if let Some(endpoint) = endpoint {
        submit_config.endpoint = endpoint;
    }
    let submitter = HttpSubmitter::from_config(&submit_config)?;

    cli::run_submit(file, &submitter, &mut io::stdout()).await?;
    Ok(())
}

async fn cmd_serve(config: &Config, port: Option<u16>) -> Result<()> {
    let addr = match port {
        Some(port) => format!("{}:{}", config.server.host, port),
        None => config.server_addr(),
    };
    println!("Submission endpoint on http://{}{}", addr, rest::SUBMIT_PATH);
    println!("Press Ctrl+C to stop");
    rest::serve(&addr).await
}
