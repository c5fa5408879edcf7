//! Photo action engine: durability rules, description calls and persistence.
//!
//! The engine decides whether an action may run against a photo, performs
//! the one remote side effect (a description call) for primary actions, and
//! writes the decremented durability through the injected
//! [`PersistenceClient`]. At most one primary action per photo is in flight
//! at any time; different photos proceed independently.

use crate::catalog::ActionBoard;
use crate::config::{CatalogConfig, Config, LimitsConfig};
use crate::describe::retry;
use crate::describe::DescriptionService;
use crate::error::{ActionError, DuranceError, RejectionReason, ServiceError};
use crate::store::PersistenceClient;
use crate::types::{ActionOutcome, ActionTier, Description, Photo};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Durability consumed by every successful primary action.
pub const DURABILITY_COST: u8 = 15;

/// Timeout and retry policy for description calls.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries for transient failures
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_limits(&LimitsConfig::default())
    }
}

impl EngineOptions {
    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self {
            timeout_ms: limits.describe_timeout_ms,
            retry_attempts: limits.retry_attempts,
            retry_delay_ms: limits.retry_delay_ms,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a photo id as busy until dropped.
struct InFlightGuard<'a> {
    ids: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(ids: &'a Mutex<HashSet<String>>, id: &str) -> Option<Self> {
        if !lock(ids).insert(id.to_string()) {
            return None;
        }
        Some(Self {
            ids,
            id: id.to_string(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock(self.ids).remove(&self.id);
    }
}

/// Applies tiered actions to photos.
pub struct PhotoActionEngine {
    service: Arc<dyn DescriptionService>,
    store: Arc<dyn PersistenceClient>,
    catalog: CatalogConfig,
    options: EngineOptions,
    in_flight: Mutex<HashSet<String>>,
    boards: Mutex<HashMap<String, ActionBoard>>,
}

impl PhotoActionEngine {
    pub fn new(
        service: Arc<dyn DescriptionService>,
        store: Arc<dyn PersistenceClient>,
        options: EngineOptions,
    ) -> Self {
        Self {
            service,
            store,
            catalog: CatalogConfig::default(),
            options,
            in_flight: Mutex::new(HashSet::new()),
            boards: Mutex::new(HashMap::new()),
        }
    }

    /// Build an engine with the catalog and limits from `config`.
    pub fn from_config(
        config: &Config,
        service: Arc<dyn DescriptionService>,
        store: Arc<dyn PersistenceClient>,
    ) -> Self {
        Self::new(service, store, EngineOptions::from_limits(&config.limits))
            .with_catalog(config.catalog.clone())
    }

    pub fn with_catalog(mut self, catalog: CatalogConfig) -> Self {
        self.catalog = catalog;
        lock(&self.boards).clear();
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Check whether an action of `tier` may run against `photo`.
    ///
    /// Configuration is checked first; durability only gates primary actions.
    pub fn can_apply(&self, photo: &Photo, tier: ActionTier) -> Result<(), RejectionReason> {
        if !self.service.is_configured() {
            return Err(RejectionReason::ServiceNotConfigured);
        }
        if tier == ActionTier::Primary && photo.percentage == 0 {
            return Err(RejectionReason::DurabilityExhausted);
        }
        Ok(())
    }

    /// Apply the action `label` of `tier` to `photo`.
    ///
    /// Secondary and bonus actions only toggle their pressed flag. Primary
    /// actions call the description service, then persist
    /// `max(0, percentage - 15)`; `photo` is updated only once the write
    /// succeeds. Each call is one user action: repeating it repeats the
    /// remote call and the decrement.
    pub async fn apply_action(
        &self,
        photo: &mut Photo,
        tier: ActionTier,
        label: &str,
    ) -> Result<ActionOutcome, ActionError> {
        let label = self
            .with_board(&photo.id, |board| board.find(tier, label).map(|a| a.label.clone()))
            .ok_or_else(|| ActionError::UnknownAction {
                tier: tier.to_string(),
                label: label.trim().to_string(),
            })?;

        if let Err(reason) = self.can_apply(photo, tier) {
            tracing::warn!("Rejected {tier} action '{label}' on photo {}: {reason}", photo.id);
            return Err(reason.into());
        }

        if tier != ActionTier::Primary {
            let pressed = self.toggle(&photo.id, tier, &label);
            tracing::debug!("Toggled {tier} action '{label}' on photo {} -> {pressed}", photo.id);
            return Ok(ActionOutcome::toggled(pressed));
        }

        let uri = match photo.uri.as_deref() {
            Some(uri) if !uri.is_empty() => uri.to_string(),
            _ => return Err(ActionError::PhotoUnassigned(photo.id.clone())),
        };

        let _guard = InFlightGuard::acquire(&self.in_flight, &photo.id)
            .ok_or_else(|| ActionError::AlreadyInProgress(photo.id.clone()))?;

        let pressed = self.toggle(&photo.id, tier, &label);

        let description = self.describe(&uri, &label).await.map_err(|e| {
            tracing::warn!("Description for '{label}' on photo {} failed: {e}", photo.id);
            ActionError::ServiceFailure(e.to_string())
        })?;

        photo.clamp();
        let new_percentage = photo.percentage.saturating_sub(DURABILITY_COST);

        if let Err(e) = self.store.update_percentage(&photo.id, new_percentage).await {
            tracing::error!(
                "Description obtained but saving {new_percentage}% for photo {} failed: {e}",
                photo.id
            );
            return Err(ActionError::Persistence {
                description: description.text,
                new_percentage,
                message: e.to_string(),
            });
        }

        tracing::info!(
            "Applied '{label}' to photo {}: {}% -> {new_percentage}% ({}ms, {})",
            photo.id,
            photo.percentage,
            description.latency_ms,
            description.model
        );
        photo.percentage = new_percentage;

        Ok(ActionOutcome {
            percentage_changed: true,
            new_percentage: Some(new_percentage),
            description: Some(description.text),
            pressed,
        })
    }

    /// Retry only the durable write after an `ActionError::Persistence`.
    ///
    /// Durability never goes up, so a value above the photo's current
    /// percentage is refused.
    pub async fn save_percentage(
        &self,
        photo: &mut Photo,
        new_percentage: u8,
    ) -> Result<(), DuranceError> {
        if new_percentage > photo.percentage {
            return Err(ActionError::PercentageIncrease {
                current: photo.percentage,
                requested: new_percentage,
            }
            .into());
        }
        self.store.update_percentage(&photo.id, new_percentage).await?;
        photo.percentage = new_percentage;
        Ok(())
    }

    /// Whether a primary action for this photo is awaiting its result.
    pub fn is_in_flight(&self, photo_id: &str) -> bool {
        lock(&self.in_flight).contains(photo_id)
    }

    /// Snapshot of a photo's action board.
    pub fn board(&self, photo_id: &str) -> ActionBoard {
        self.with_board(photo_id, |board| board.clone())
    }

    /// Restore daily rights and clear pressed flags on every board.
    pub fn reset_daily(&self) {
        for board in lock(&self.boards).values_mut() {
            board.reset_daily();
        }
    }

    fn with_board<R>(&self, photo_id: &str, f: impl FnOnce(&mut ActionBoard) -> R) -> R {
        let mut boards = lock(&self.boards);
        let board = boards
            .entry(photo_id.to_string())
            .or_insert_with(|| ActionBoard::from_config(&self.catalog));
        f(board)
    }

    fn toggle(&self, photo_id: &str, tier: ActionTier, label: &str) -> bool {
        self.with_board(photo_id, |board| board.toggle(tier, label))
            .unwrap_or_default()
    }

    /// Call the description service under the timeout and retry policy.
    async fn describe(&self, uri: &str, label: &str) -> Result<Description, ServiceError> {
        let timeout = Duration::from_millis(self.options.timeout_ms);
        let mut last_error = ServiceError::Timeout {
            timeout_ms: self.options.timeout_ms,
        };

        for attempt in 0..=self.options.retry_attempts {
            if attempt > 0 {
                let delay = retry::backoff_duration(attempt - 1, self.options.retry_delay_ms);
                tracing::debug!(
                    "Retry {attempt}/{} via {} after {delay:?}",
                    self.options.retry_attempts,
                    self.service.name()
                );
                tokio::time::sleep(delay).await;
            }

            match tokio::time::timeout(timeout, self.service.describe(uri, label)).await {
                Ok(Ok(description)) => return Ok(description),
                Ok(Err(e)) => {
                    let retryable = retry::is_retryable(&e);
                    last_error = e;
                    if !retryable {
                        break;
                    }
                }
                Err(_) => {
                    last_error = ServiceError::Timeout {
                        timeout_ms: self.options.timeout_ms,
                    };
                }
            }
        }

        Err(last_error)
    }
}
