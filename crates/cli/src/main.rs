mod analyze;
mod serve;
mod worker;

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use dossier_core::IntakeForm;

/// Dossier intake and analysis service.
#[derive(Parser)]
#[command(name = "dossier", version, about = "Dossier intake and analysis service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the intake HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Public base URL used in admin links (defaults to DOSSIER_PUBLIC_URL
        /// or http://localhost:<port>)
        #[arg(long)]
        public_url: Option<String>,
    },

    /// Analyze one intake form JSON file offline and print the dossier
    Analyze {
        /// Path to the intake form JSON file
        file: PathBuf,
        /// Upper bound on the analysis call, in seconds
        #[arg(long, default_value = "60")]
        timeout: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, public_url } => {
            let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
            if let Err(e) = rt.block_on(serve::start_server(port, public_url)) {
                eprintln!("Server error: {}", e);
                process::exit(1);
            }
        }
        Commands::Analyze { file, timeout } => {
            cmd_analyze(&file, Duration::from_secs(timeout));
        }
    }
}

/// Run the configured analyzer once against an intake form read from disk
/// and print the resulting dossier JSON to stdout.
///
/// Useful for iterating on prompt or scoring behavior without the HTTP
/// layer or the polling protocol in the way.
fn cmd_analyze(file: &Path, timeout: Duration) {
    let raw = match std::fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", file.display(), e);
            process::exit(1);
        }
    };

    let form: IntakeForm = match serde_json::from_str(&raw) {
        Ok(form) => form,
        Err(e) => {
            eprintln!("error: {} is not a valid intake form: {}", file.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = form.validate() {
        eprintln!("error: {}", e);
        process::exit(1);
    }

    let analyzer = analyze::analyzer_from_env();
    eprintln!("Analysis provider: {}", analyzer.name());

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    let result = rt.block_on(async { tokio::time::timeout(timeout, analyzer.analyze(&form)).await });

    match result {
        Ok(Ok(analysis)) => {
            let json = serde_json::to_string_pretty(&analysis)
                .unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
        Ok(Err(e)) => {
            eprintln!("error: analysis failed: {}", e);
            process::exit(1);
        }
        Err(_) => {
            eprintln!("error: analysis timed out after {:?}", timeout);
            process::exit(1);
        }
    }
}
