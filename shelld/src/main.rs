//! # Shell Host Daemon
//!
//! Replays an input script against a simulated shell and prints the
//! transcript. Logging goes to stderr and is controlled by `RUST_LOG`.

use shelld::{HostRuntime, HostRuntimeConfig};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("shelld");

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(program);
        process::exit(1);
    });

    let mut runtime = HostRuntime::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to create runtime: {}", e);
        process::exit(1);
    });

    match runtime.run() {
        Ok(transcript) => {
            for line in transcript {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            process::exit(1);
        }
    }
}

fn parse_args(args: &[String]) -> Result<HostRuntimeConfig, String> {
    let mut config = HostRuntimeConfig::default();
    let mut rest = args.iter().skip(1);

    while let Some(arg) = rest.next() {
        let mut value = |name: &str| {
            rest.next()
                .cloned()
                .ok_or_else(|| format!("Missing value for {}", name))
        };
        match arg.as_str() {
            "--script" | "-s" => {
                let path = value("--script")?;
                let text = fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read script file: {}", e))?;
                config.script = Some(text);
            }
            "--profile" | "-p" => {
                config.profile = value("--profile")?;
            }
            "--settings" => {
                let path = value("--settings")?;
                let bytes =
                    fs::read(&path).map_err(|e| format!("Failed to read settings file: {}", e))?;
                config.settings = Some(bytes);
            }
            "--ready" => {
                config.start_ready = true;
            }
            "--help" | "-h" => {
                print_usage(args.first().map(String::as_str).unwrap_or("shelld"));
                process::exit(0);
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
    }

    Ok(config)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --script <FILE>      Input script to replay");
    eprintln!("  -p, --profile <NAME>     Settings profile (default: default)");
    eprintln!("  --settings <FILE>        Settings overrides (JSON)");
    eprintln!("  --ready                  Build panes ready instead of waiting for `ready`");
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --script demos/notes.keys", program);
    eprintln!("  RUST_LOG=debug {} --script demos/notes.keys --ready", program);
}
