use std::env;
use std::sync::Arc;

use clap::Parser;

use compounder::api::{Cli, build_params, run_http_server};
use compounder::capture::FileCaptureStore;
use compounder::core::project;
use compounder::export::snapshots_to_csv;

const DEFAULT_CAPTURE_FILE: &str = "captured_emails.jsonl";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "compounder=info,tower_http=info".into()),
        )
        .init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            let capture_file = raw_args
                .get(3)
                .cloned()
                .unwrap_or_else(|| DEFAULT_CAPTURE_FILE.to_string());
            let store = Arc::new(FileCaptureStore::new(capture_file));
            if let Err(e) = run_http_server(port, store).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("project") => {
            let cli = Cli::parse_from(
                std::iter::once(raw_args[0].clone()).chain(raw_args.iter().skip(2).cloned()),
            );
            let params = match build_params(cli) {
                Ok(params) => params,
                Err(msg) => {
                    eprintln!("{msg}");
                    std::process::exit(1);
                }
            };
            match project(&params).map_err(|e| e.to_string()).and_then(|s| {
                snapshots_to_csv(&s).map_err(|e| e.to_string())
            }) {
                Ok(csv) => print!("{csv}"),
                Err(msg) => {
                    eprintln!("{msg}");
                    std::process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Usage: compounder serve [port] [capture-file]");
            eprintln!("       compounder project [--initial-value N] [--monthly-contribution N] [--monthly-rate PCT] [--periods N]");
            std::process::exit(1);
        }
    }
}
