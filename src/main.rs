//! devdb - Drop-and-recreate provisioning for project development and test databases.

use std::env;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use devdb::config::Settings;
use devdb::provision::{ProvisionReport, Provisioner};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

fn main() -> ExitCode {
    // Parse command line arguments (simple std::env approach)
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{} {}", NAME, VERSION);
        return ExitCode::SUCCESS;
    }

    let command = match get_command(&args) {
        Some(command) => command,
        None => {
            eprintln!("Error: expected a command ('primary' or 'test')");
            eprintln!("Run '{} --help' for usage.", NAME);
            return ExitCode::FAILURE;
        }
    };

    // Get config path from --config argument or default
    let config_path = get_config_path(&args);

    // Load configuration
    let settings = match Settings::load(&config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging based on configuration
    if let Err(e) = init_logging(&settings) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting {} v{}", NAME, VERSION);
    info!("Configuration loaded from: {}", config_path);

    // Run the async main
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let provisioner = Provisioner::new(settings);
    let report = runtime.block_on(async {
        match command {
            ProvisionCommand::Primary => provisioner.provision_primary().await,
            ProvisionCommand::Test => provisioner.provision_test().await,
        }
    });

    match report {
        Ok(report) => {
            summarize(&report);
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            error!(error = %e, "Provisioning aborted");
            ExitCode::FAILURE
        }
    }
}

/// The two provisioning operations exposed on the command line.
#[derive(Debug, Clone, Copy)]
enum ProvisionCommand {
    Primary,
    Test,
}

/// Log one summary line per engine plus the overall outcome.
fn summarize(report: &ProvisionReport) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => info!(
                "{}: database [{}] ready",
                outcome.engine.display_name(),
                outcome.database
            ),
            Err(e) => error!(
                "{}: database [{}] failed: {}",
                outcome.engine.display_name(),
                outcome.database,
                e
            ),
        }
    }

    if report.succeeded() {
        info!("All engines provisioned successfully");
    } else {
        error!(
            "{} of {} engines failed",
            report.failures().count(),
            report.outcomes.len()
        );
    }
}

/// Print help message.
fn print_help() {
    println!(
        r#"{} {}
Drop-and-recreate provisioning for project development and test databases.

USAGE:
    {} [OPTIONS] <COMMAND>

COMMANDS:
    primary    Drop and recreate the primary database on every configured engine
    test       Drop and recreate the test database on every configured engine

OPTIONS:
    -c, --config <PATH>    Path to configuration file
                           [default: devdb.toml]
    -h, --help             Print help information
    -V, --version          Print version information
"#,
        NAME, VERSION, NAME
    );
}

/// Get the provisioning command from command line arguments.
fn get_command(args: &[String]) -> Option<ProvisionCommand> {
    let mut skip_next = false;
    for arg in args.iter().skip(1) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--config" || arg == "-c" {
            skip_next = true;
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return match arg.as_str() {
            "primary" => Some(ProvisionCommand::Primary),
            "test" => Some(ProvisionCommand::Test),
            _ => None,
        };
    }
    None
}

/// Get configuration file path from command line arguments.
fn get_config_path(args: &[String]) -> String {
    for (i, arg) in args.iter().enumerate() {
        if (arg == "--config" || arg == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    // Default path
    "devdb.toml".to_string()
}

/// Initialize logging based on settings.
///
/// The "json" format maps to tracing-subscriber's JSON formatter, which is
/// behind its `json` cargo feature.
fn init_logging(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    match settings.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Default to pretty format
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
