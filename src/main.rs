use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use voicebank::app::{
    run_ledger_command, run_publish_command, run_record_command, run_upload_command,
};
use voicebank::audio::capture::list_devices;
use voicebank::cli::{Cli, Commands, ConfigAction, ModelsAction};
use voicebank::config::Config;
use voicebank::models::catalog::list_models;
use voicebank::models::download::{download_model, format_model_info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Record {
            device,
            model,
            language,
        } => {
            run_record_command(config, device, model, language, cli.quiet, cli.no_download)
                .await?;
        }
        Commands::Upload {
            file,
            model,
            language,
        } => {
            run_upload_command(config, &file, model, language, cli.quiet, cli.no_download)
                .await?;
        }
        Commands::Ledger => {
            run_ledger_command(config)?;
        }
        Commands::Publish => {
            run_publish_command(config, cli.quiet).await?;
        }
        Commands::Devices => {
            list_audio_devices()?;
        }
        Commands::Models { action } => {
            handle_models_command(action).await?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref(), &config)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "voicebank",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/voicebank/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

/// List available audio input devices.
fn list_audio_devices() -> Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

/// Handle model management commands.
async fn handle_models_command(action: ModelsAction) -> Result<()> {
    match action {
        ModelsAction::List => {
            println!("Available models:");
            for model in list_models() {
                println!("  {}", format_model_info(model));
            }
        }
        ModelsAction::Install { name } => {
            let path = download_model(&name, true).await?;
            println!("{}", format!("Model '{}' installed successfully", name).green());
            println!("Location: {}", path.display());
        }
    }
    Ok(())
}

/// Handle configuration commands.
fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
    config: &Config,
) -> Result<()> {
    match action {
        ConfigAction::List => {
            print!("{}", config.to_display_toml()?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
