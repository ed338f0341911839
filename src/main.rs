use certsplit::{CertSplit, Cli, OutputFormatter, OutputMode, UserFriendlyError};
use clap::Parser;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments; --version and --help exit here
    let cli = Cli::parse();

    setup_logging(&cli);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let certsplit = match CertSplit::from_cli(&cli) {
        Ok(certsplit) => certsplit,
        Err(e) => {
            let formatter = OutputFormatter::new(OutputMode::detect(), 0, false);
            formatter.print_user_friendly_error(&e);
            return 1;
        }
    };

    match certsplit.run() {
        Ok(_) => 0,
        Err(e) => {
            log::debug!("Run failed: {:?}", e);
            certsplit.handle_error(&e);
            1
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "certsplit.toml".to_string());

    match CertSplit::generate_sample_config(&config_path) {
        Ok(()) => {
            eprintln!("Generated sample configuration file: {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn setup_logging(cli: &Cli) {
    // RUST_LOG takes precedence over -v/-q
    let env = env_logger::Env::default().default_filter_or(cli.log_filter());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
}
