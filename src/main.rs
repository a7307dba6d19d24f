#[macro_use]
mod log;

mod api;
mod backend;
mod cli;
mod compose;
mod config;
mod controller;
mod surface;
mod tui;

use api::client::MailClient;
use config::{Config, ServerConfig};
use std::path::{Path, PathBuf};
use std::process::Command;

fn default_config_path() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("mailpane").join("config.toml")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home)
            .join(".config")
            .join("mailpane")
            .join("config.toml")
    } else {
        PathBuf::from("config.toml")
    }
}

/// Run the configured shell command and use its stdout as the Cookie header.
fn run_cookie_command(cmd: &str) -> Result<String, String> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .output()
        .map_err(|e| format!("failed to execute session_cookie_command: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "session_cookie_command exited with {}: {}",
            output.status, stderr
        ));
    }

    let cookie = String::from_utf8(output.stdout)
        .map_err(|e| format!("session_cookie_command output is not valid UTF-8: {}", e))?;

    Ok(cookie.trim_end_matches('\n').to_string())
}

fn build_client(server: &ServerConfig) -> Result<MailClient, String> {
    let cookie = match server.session_cookie_command {
        Some(ref cmd) => Some(run_cookie_command(cmd)?),
        None => None,
    };
    Ok(MailClient::new(&server.base_url, &server.collection, cookie))
}

fn show_log(path: &Path) {
    if !path.exists() {
        eprintln!("No log file found at {}", path.display());
        std::process::exit(1);
    }
    let pager = std::env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    match Command::new(&pager).arg(path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => std::process::exit(s.code().unwrap_or(1)),
        Err(e) => {
            eprintln!("Failed to launch pager '{}': {}", pager, e);
            std::process::exit(1);
        }
    }
}

fn print_help_config() {
    println!("Default config file: {}", default_config_path().display());
    println!();
    println!("Available options:");
    println!();
    println!("[server]");
    println!("  base_url = \"http://127.0.0.1:8000\"   # Message store root (required)");
    println!("  collection = \"messages\"              # Path segment for message endpoints (default: \"messages\")");
    println!("  session_cookie_command = \"...\"       # Shell command printing a Cookie header value (optional)");
    println!();
    println!("[log]");
    println!(
        "  path = \"/path/to/file.log\"            # Log file (default: {})",
        log::log_path().display()
    );
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: mailpane [OPTIONS]");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --config=PATH    Use config file at PATH instead of default");
        eprintln!("  --cli            Run in JSON-over-stdin/stdout CLI mode");
        eprintln!("  --help-cli       Print CLI mode protocol documentation");
        eprintln!("  --help-config    Print default config path and all options");
        eprintln!("  --log            View the log file in $PAGER");
        eprintln!("  --clear-log      Truncate the log file at startup");
        eprintln!("  --help           Show this help");
        std::process::exit(0);
    }

    if args.iter().any(|a| a == "--help-cli") {
        cli::print_help_cli();
        std::process::exit(0);
    }

    if args.iter().any(|a| a == "--help-config") {
        print_help_config();
        std::process::exit(0);
    }

    let config_path = args
        .iter()
        .find(|a| a.starts_with("--config="))
        .map(|a| PathBuf::from(&a["--config=".len()..]))
        .unwrap_or_else(default_config_path);

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config from {}: {}", config_path.display(), e);
            eprintln!("Create a config file with:");
            eprintln!();
            eprintln!("  [server]");
            eprintln!("  base_url = \"http://127.0.0.1:8000\"");
            std::process::exit(1);
        }
    };

    let log_path = config.log_path.clone().unwrap_or_else(log::log_path);

    if args.iter().any(|a| a == "--log") {
        show_log(&log_path);
        std::process::exit(0);
    }

    if args.iter().any(|a| a == "--clear-log") {
        if let Err(e) = log::clear(&log_path) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = log::init(&log_path) {
        eprintln!(
            "Warning: cannot open log file {}: {}",
            log_path.display(),
            e
        );
    }

    let client = match build_client(&config.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    log_info!(
        "Starting against {}/{}",
        config.server.base_url,
        config.server.collection
    );

    let (cmd_tx, resp_rx) = backend::spawn(client);

    if args.iter().any(|a| a == "--cli") {
        cli::run_cli(cmd_tx, resp_rx);
        std::process::exit(0);
    }

    if let Err(e) = tui::run(cmd_tx, resp_rx) {
        eprintln!("TUI error: {}", e);
        std::process::exit(1);
    }
}
