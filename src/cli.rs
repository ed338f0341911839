use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "certsplit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Split certificate authority JSON responses into separate files")]
#[command(
    long_about = "certsplit reads a JSON response from a certificate authority API and writes the \
                  certificate, private key, CSR, bundle and OCSP response it contains to \
                  separate files, or prints them to standard output."
)]
#[command(after_help = "EXAMPLES:\n  \
    certsplit -f response.json server\n  \
    cfssl gencert -initca csr.json | certsplit ca\n  \
    certsplit --bare -f sign.json --json intermediate")]
pub struct Cli {
    /// Base name of the output files (e.g. <BASE>.pem, <BASE>-key.pem)
    pub base_name: Option<String>,

    /// JSON input file, or - for standard input
    #[arg(short, long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// The response is not wrapped in the API standard response
    #[arg(long)]
    pub bare: bool,

    /// Output the response instead of saving to a file
    #[arg(long)]
    pub stdout: bool,

    /// Output the response as JSON. Implies --stdout
    #[arg(long)]
    pub json: bool,

    /// Directory for output files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are reported)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_bare(self.bare)
            .with_source(self.file.clone())
            .with_base_name(self.base_name.clone())
            .with_directory(self.output_dir.clone())
            .with_stdout(self.stdout)
            .with_json(self.json)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default `env_logger` filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }

        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
