//! The `durance act` and `durance actions` commands.

use clap::{Args, ValueEnum};
use console::Style;
use durance_core::config::LimitsConfig;
use durance_core::{
    ActionError, ActionOutcome, ActionTier, Config, DescriptionServiceFactory, Photo,
    PhotoActionEngine, PersistenceClient, PhotoLock,
};
use std::sync::Arc;
use std::time::Duration;

use super::{load_gallery, open_store};

/// Supported description providers.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Provider {
    /// Google Gemini
    Gemini,
    /// Anthropic API
    Anthropic,
    /// OpenAI API
    Openai,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Openai => write!(f, "openai"),
        }
    }
}

/// Arguments for the `act` command.
#[derive(Args, Debug)]
pub struct ActArgs {
    /// Photo id
    pub photo_id: String,

    /// Action tier: primary, secondary or bonus
    pub tier: ActionTier,

    /// Action label from the tier's catalog
    pub label: String,

    /// Description provider (overrides config)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (provider-specific)
    #[arg(long)]
    pub model: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `actions` command.
#[derive(Args, Debug)]
pub struct ActionsArgs {
    /// Photo id
    pub photo_id: String,

    /// Description provider (overrides config)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Print the board as JSON
    #[arg(long)]
    pub json: bool,
}

fn build_engine(
    config: &Config,
    store: Arc<dyn PersistenceClient>,
    provider: Option<Provider>,
    model: Option<&str>,
) -> anyhow::Result<PhotoActionEngine> {
    let provider = provider.map(|p| p.to_string());
    let service = DescriptionServiceFactory::create(config, provider.as_deref(), model)?;
    tracing::debug!(
        "Description provider: {} (configured: {})",
        service.name(),
        service.is_configured()
    );
    Ok(PhotoActionEngine::from_config(
        config,
        Arc::from(service),
        store,
    ))
}

fn find_photo(gallery: &durance_core::Gallery, id: &str) -> anyhow::Result<Photo> {
    gallery
        .get(id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No photo with id {id}. See `durance gallery list`."))
}

/// Show a photo's action board with availability per tier.
pub async fn show_board(args: ActionsArgs, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config);
    let gallery = load_gallery(store.clone()).await?;
    let photo = find_photo(&gallery, &args.photo_id)?;
    let engine = build_engine(config, store, args.provider, None)?;
    let board = engine.board(&photo.id);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let warn = Style::new().yellow();

    println!("{}", super::gallery::format_row(&photo));
    for catalog in board.tiers() {
        let status = match engine.can_apply(&photo, catalog.tier) {
            Ok(()) => String::new(),
            Err(reason) => format!("  {}", warn.apply_to(reason)),
        };
        println!(
            "\n{} {}{}",
            bold.apply_to(catalog.tier),
            dim.apply_to(format!(
                "({}/{} rights/day)",
                catalog.rights.remaining, catalog.rights.allowance
            )),
            status
        );
        for action in &catalog.actions {
            println!("  {:>2}. {}", action.id, action.label);
        }
    }

    Ok(())
}

/// Execute the act command.
pub async fn execute(args: ActArgs, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config);

    // Held across load, describe and write so concurrent processes cannot
    // both decrement from the same stored value.
    let _lock = if args.tier == ActionTier::Primary {
        let lock = PhotoLock::acquire(
            &config.locks_dir(),
            &args.photo_id,
            lock_lifetime(&config.limits),
        )?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "A primary action on photo {} is already running in another process",
                args.photo_id
            )
        })?;
        Some(lock)
    } else {
        None
    };

    let gallery = load_gallery(store.clone()).await?;
    let mut photo = find_photo(&gallery, &args.photo_id)?;
    let engine = build_engine(config, store, args.provider, args.model.as_deref())?;

    let progress = (args.tier == ActionTier::Primary && !args.json).then(|| spinner(&args.label));
    let result = engine.apply_action(&mut photo, args.tier, &args.label).await;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(ActionError::Persistence {
            description,
            new_percentage,
            message,
        }) => {
            tracing::warn!("Saving durability failed ({message}), retrying the write once");
            let description = retry_save(&engine, &mut photo, new_percentage, description).await?;
            let pressed = engine
                .board(&photo.id)
                .find(args.tier, &args.label)
                .is_some_and(|action| action.pressed);
            ActionOutcome {
                percentage_changed: true,
                new_percentage: Some(new_percentage),
                description: Some(description),
                pressed,
            }
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&args, &photo, &outcome);
    }

    Ok(())
}

/// Retry only the durable write; the description stays in the error if it fails again.
async fn retry_save(
    engine: &PhotoActionEngine,
    photo: &mut Photo,
    new_percentage: u8,
    description: String,
) -> anyhow::Result<String> {
    match engine.save_percentage(photo, new_percentage).await {
        Ok(()) => Ok(description),
        Err(e) => Err(anyhow::Error::new(e).context(format!(
            "Durability {new_percentage}% for photo {} was not saved. Description:\n{description}",
            photo.id
        ))),
    }
}

/// Longest a primary action can take before its lock counts as abandoned.
fn lock_lifetime(limits: &LimitsConfig) -> Duration {
    let attempts = u64::from(limits.retry_attempts) + 1;
    Duration::from_millis(limits.describe_timeout_ms.saturating_mul(attempts))
        + Duration::from_secs(30 * u64::from(limits.retry_attempts))
        + Duration::from_secs(60)
}

fn print_outcome(args: &ActArgs, photo: &Photo, outcome: &ActionOutcome) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();

    println!("{} applied to {}", bold.apply_to(&args.label), photo.name);
    if let Some(description) = &outcome.description {
        println!("\n{description}\n");
    }
    match outcome.new_percentage {
        Some(pct) => println!("Remaining durability: {pct}%"),
        None => println!(
            "{}",
            dim.apply_to(format!(
                "{} action {}",
                args.tier,
                if outcome.pressed { "on" } else { "off" }
            ))
        ),
    }
}

fn spinner(label: &str) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Applying {label}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use durance_core::{JsonGalleryStore, MemoryGalleryStore};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        act: ActArgs,
    }

    #[test]
    fn act_args_parse_tier_alias() {
        let cli = TestCli::parse_from(["durance", "3", "main", "Poke", "--provider", "openai"]);
        assert_eq!(cli.act.tier, ActionTier::Primary);
        assert_eq!(cli.act.label, "Poke");
        assert!(matches!(cli.act.provider, Some(Provider::Openai)));
    }

    #[test]
    fn act_args_reject_unknown_tier() {
        assert!(TestCli::try_parse_from(["durance", "3", "gold", "Poke"]).is_err());
    }

    fn offline_engine(store: Arc<dyn PersistenceClient>) -> PhotoActionEngine {
        build_engine(&Config::default(), store, None, None).unwrap()
    }

    #[tokio::test]
    async fn retry_save_writes_new_percentage() {
        let store = Arc::new(MemoryGalleryStore::new(vec![Photo::new("1", "cat")]));
        let engine = offline_engine(store.clone());
        let mut photo = Photo::new("1", "cat");

        let description = retry_save(&engine, &mut photo, 85, "A ruffled cat.".into())
            .await
            .unwrap();
        assert_eq!(description, "A ruffled cat.");
        assert_eq!(photo.percentage, 85);
        assert_eq!(store.snapshot()[0].percentage, 85);
    }

    #[tokio::test]
    async fn retry_save_failure_keeps_description() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = Arc::new(JsonGalleryStore::new(blocker.join("photo_gallery.json")));
        let engine = offline_engine(store);
        let mut photo = Photo::new("1", "cat");

        let err = retry_save(&engine, &mut photo, 85, "A ruffled cat.".into())
            .await
            .unwrap_err();
        let report = format!("{err:#}");
        assert!(report.contains("A ruffled cat."), "{report}");
        assert!(report.contains("85%"), "{report}");
        assert_eq!(photo.percentage, 100);
    }

    #[test]
    fn lock_lifetime_covers_every_attempt() {
        let limits = LimitsConfig::default();
        assert!(lock_lifetime(&limits) > Duration::from_millis(limits.describe_timeout_ms));

        let retrying = LimitsConfig {
            retry_attempts: 2,
            ..LimitsConfig::default()
        };
        assert!(
            lock_lifetime(&retrying)
                >= Duration::from_millis(3 * retrying.describe_timeout_ms)
        );
    }

    #[test]
    fn provider_display_matches_config_names() {
        for provider in [Provider::Gemini, Provider::Anthropic, Provider::Openai] {
            assert!(durance_core::describe::PROVIDERS.contains(&provider.to_string().as_str()));
        }
    }
}
