//! filexfer CLI - move one file between local disk, HTTP and FTP

use clap::Parser;
use filexfer::config::{CliArgs, Commands, LogFormat, TransferConfig};
use filexfer::core::{FileTransferService, TransferRequest};
use filexfer::error::Result;
use filexfer::progress::ProgressReporter;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    init_logging(&args);

    // Handle result
    if let Err(e) = run(args) {
        tracing::debug!(kind = %e.kind(), "transfer failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &CliArgs) {
    let default_level = match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match args.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn run(args: CliArgs) -> Result<()> {
    // Build configuration
    let config = TransferConfig::from_cli(&args)?;

    // Handle subcommands
    if let Some(command) = &args.command {
        return handle_command(command, &config);
    }

    let (Some(source), Some(destination)) = (&args.source, &args.destination) else {
        eprintln!("Usage: filexfer <SOURCE> <DESTINATION> [OPTIONS]");
        eprintln!("       filexfer --help for more information");
        eprintln!("       filexfer show-config - Print the effective configuration");
        std::process::exit(2);
    };

    // Print configuration if verbose
    if args.verbose > 0 && !args.quiet {
        print_config(&config);
    }

    // Create progress reporter
    let progress = if args.progress && !args.quiet {
        ProgressReporter::new()
    } else {
        ProgressReporter::disabled()
    };

    // One service for the whole run; it draws a bar per transfer
    let service = FileTransferService::new(config).with_progress(progress);
    let request = TransferRequest::parse(source, destination)?;

    let stats = service.transfer(&request)?;
    if !args.quiet {
        stats.print_summary();
    }
    Ok(())
}

fn handle_command(command: &Commands, config: &TransferConfig) -> Result<()> {
    match command {
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(config)?);
            Ok(())
        }
    }
}

fn print_config(config: &TransferConfig) {
    println!("=== Configuration ===");
    match config.http_timeout.as_duration() {
        Some(timeout) => println!("HTTP timeout: {:?}", timeout),
        None => println!("HTTP timeout: client default"),
    }
    println!("Field name:   {}", config.multipart_field_name);
    println!("Buffer:       {}", humansize::format_size(config.buffer_size as u64, humansize::BINARY));
    println!("Preserve:     {}", config.preserve_attributes);
}
