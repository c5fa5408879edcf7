//! The `durance config` command for configuration management.

use clap::{Args, Subcommand};
use console::Style;
use durance_core::Config;

use super::act::Provider;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Store an API key for a description provider
    SetKey {
        /// Provider the key belongs to
        #[arg(value_enum)]
        provider: Provider,

        /// API key, or an ${ENV_VAR} reference
        key: String,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            let toml = config.to_toml()?;
            println!("{}", toml);
        }

        ConfigCommand::Path => {
            let path = Config::default_path();
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let config = Config::default();
            let toml = config.to_toml()?;
            std::fs::write(&path, toml)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::SetKey { provider, key } => {
            let path = Config::default_path();
            let content = if path.exists() {
                std::fs::read_to_string(&path)?
            } else {
                String::new()
            };

            let updated = set_key(&content, &provider.to_string(), &key)?;

            // Refuse to write a file the loader would reject.
            Config::from_toml(&updated)?;

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, updated)?;

            let dim = Style::new().for_stderr().dim();
            eprintln!(
                "  {}",
                dim.apply_to(format!("{provider} key saved to {}", path.display()))
            );
        }
    }

    Ok(())
}

/// Set `[service.<provider>] api_key` in a TOML document, preserving comments.
fn set_key(content: &str, provider: &str, key: &str) -> anyhow::Result<String> {
    let mut doc: toml_edit::DocumentMut = content.parse()?;

    if !doc.contains_key("service") {
        doc["service"] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    if !doc["service"]
        .as_table()
        .is_some_and(|t| t.contains_key(provider))
    {
        doc["service"][provider] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    doc["service"][provider]["api_key"] = toml_edit::value(key);

    Ok(doc.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_key_on_empty_document() {
        let out = set_key("", "gemini", "abc123").unwrap();
        let config = Config::from_toml(&out).unwrap();
        assert_eq!(config.service.gemini.unwrap().api_key, "abc123");
    }

    #[test]
    fn set_key_preserves_comments_and_other_tables() {
        let input = "# my settings\n[limits]\nretry_attempts = 2 # keep\n\n[service]\nprovider = \"openai\"\n";
        let out = set_key(input, "openai", "sk-real").unwrap();

        assert!(out.contains("# my settings"));
        assert!(out.contains("# keep"));

        let config = Config::from_toml(&out).unwrap();
        assert_eq!(config.limits.retry_attempts, 2);
        assert_eq!(config.service.provider, "openai");
        assert_eq!(config.service.openai.unwrap().api_key, "sk-real");
    }

    #[test]
    fn set_key_replaces_existing_key() {
        let input = "[service.anthropic]\napi_key = \"old\"\nmodel = \"custom\"\n";
        let out = set_key(input, "anthropic", "new").unwrap();
        let anthropic = Config::from_toml(&out).unwrap().service.anthropic.unwrap();
        assert_eq!(anthropic.api_key, "new");
        assert_eq!(anthropic.model, "custom");
    }

    #[test]
    fn set_key_rejects_invalid_toml() {
        assert!(set_key("[service", "gemini", "k").is_err());
    }
}
