pub mod artifact;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod sink;
pub mod ui;

// Public API re-exports
pub use artifact::{Artifact, ArtifactKind, Contents};
pub use cli::Cli;
pub use config::{CliOverrides, Config, InputConfig, OutputConfig};
pub use envelope::{unwrap_envelope, Response, ResponseMessage};
pub use error::{CertSplitError, Result, UserFriendlyError};
pub use extract::{extract_artifacts, BundlePair, FieldRule};
pub use sink::{Sink, SinkMode, SinkReport};
pub use ui::{OutputFormatter, OutputMode};

use log::debug;
use std::fs;
use std::io::{self, Read, Write};

/// Main library interface: one configured input-to-output run.
pub struct CertSplit {
    config: Config,
    output_formatter: OutputFormatter,
}

impl CertSplit {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
        }
    }

    /// Create a CertSplit instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::new(
            config,
            OutputMode::detect(),
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Unwrap and extract, without emitting anything.
    pub fn split(&self, data: &[u8]) -> Result<Vec<Artifact>> {
        let fields = unwrap_envelope(data, self.config.input.bare)?;
        debug!("Result mapping has {} fields", fields.len());
        extract_artifacts(&self.config.output.base_name, &fields)
    }

    /// Split `data` and hand the artifacts to the configured sink.
    pub fn process<W: Write>(&self, data: &[u8], out: &mut W) -> Result<SinkReport> {
        let artifacts = self.split(data)?;
        self.sink().emit(&artifacts, out)
    }

    /// Read the configured input source and process it, printing to stdout.
    pub fn run(&self) -> Result<SinkReport> {
        let data = read_input(&self.config.input.source)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let report = self.process(&data, &mut out)?;

        self.output_formatter.print_sink_summary(&report);
        Ok(report)
    }

    pub fn sink(&self) -> Sink {
        Sink::new(self.config.sink_mode()).with_directory(self.config.output.directory.clone())
    }

    /// Write a sample configuration file
    pub fn generate_sample_config<P: AsRef<std::path::Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &CertSplitError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Read all bytes from a file, or from stdin when `source` is `-`.
pub fn read_input(source: &str) -> Result<Vec<u8>> {
    let to_read_error = |e: io::Error| CertSplitError::Read {
        source_name: if source == config::STDIN_SOURCE {
            "standard input".to_string()
        } else {
            source.to_string()
        },
        source: e,
    };

    if source == config::STDIN_SOURCE {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer).map_err(to_read_error)?;
        debug!("Read {} bytes from standard input", buffer.len());
        Ok(buffer)
    } else {
        let buffer = fs::read(source).map_err(to_read_error)?;
        debug!("Read {} bytes from {}", buffer.len(), source);
        Ok(buffer)
    }
}
