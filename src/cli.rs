//! Command-line interface for voicebank
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Collect voice samples, transcribe them, publish a dataset
#[derive(Parser, Debug)]
#[command(
    name = "voicebank",
    version,
    about = "Collect voice samples, transcribe them, publish a HuggingFace dataset"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Prevent automatic model download if the configured model is missing
    #[arg(long, global = true)]
    pub no_download: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a voice sample from the microphone and submit it
    Record {
        /// Audio input device (e.g., pipewire)
        #[arg(long, value_name = "DEVICE")]
        device: Option<String>,

        /// Whisper model (default: base, multilingual). Use base.en for English-only
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Language code for transcription (default: auto-detect)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Submit an existing audio file (wav, mp3, m4a, or mp4)
    Upload {
        /// Audio file to submit
        file: PathBuf,

        /// Whisper model (default: base, multilingual). Use base.en for English-only
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Language code for transcription (default: auto-detect)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Show the metadata ledger
    Ledger,

    /// Push the current local audio tree and ledger to the dataset repository
    Publish,

    /// List available audio input devices
    Devices,

    /// Manage Whisper models
    Models {
        /// Action to perform
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// Inspect configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List available models
    List,

    /// Download and install a model
    Install {
        /// Model name (e.g., base, small.en)
        name: String,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    List,

    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_record_with_overrides() {
        let cli = Cli::parse_from([
            "voicebank", "record", "--device", "pipewire", "--model", "tiny", "--language", "en",
        ]);
        match cli.command {
            Commands::Record {
                device,
                model,
                language,
            } => {
                assert_eq!(device.as_deref(), Some("pipewire"));
                assert_eq!(model.as_deref(), Some("tiny"));
                assert_eq!(language.as_deref(), Some("en"));
            }
            other => panic!("Expected Record, got {:?}", other),
        }
    }

    #[test]
    fn cli_parses_upload_with_file() {
        let cli = Cli::parse_from(["voicebank", "upload", "clip.mp3"]);
        match cli.command {
            Commands::Upload { file, .. } => assert_eq!(file, PathBuf::from("clip.mp3")),
            other => panic!("Expected Upload, got {:?}", other),
        }
    }

    #[test]
    fn cli_global_flags_apply_after_subcommand() {
        let cli = Cli::parse_from(["voicebank", "publish", "--quiet", "-vv"]);
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["voicebank"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
