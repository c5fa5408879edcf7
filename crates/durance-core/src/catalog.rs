//! Action catalogs, pressed flags and daily rights counters.
//!
//! An [`ActionBoard`] is the per-photo view of every tier: which actions
//! exist, which ones are currently toggled on, and how many rights are left.
//! Rights are display state; nothing here enforces them.

use crate::config::CatalogConfig;
use crate::types::ActionTier;
use serde::Serialize;

/// A named action in a tier's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub id: String,
    pub label: String,
    /// Display echo of the last press; no effect on domain rules
    pub pressed: bool,
}

/// Remaining uses for a tier against its daily allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rights {
    pub remaining: u32,
    pub allowance: u32,
}

impl Rights {
    fn full(allowance: u32) -> Self {
        Self {
            remaining: allowance,
            allowance,
        }
    }
}

/// Catalog and counter for a single tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierCatalog {
    pub tier: ActionTier,
    pub actions: Vec<Action>,
    pub rights: Rights,
}

/// All tiers for one photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionBoard {
    tiers: Vec<TierCatalog>,
}

impl ActionBoard {
    /// Build a fresh board from configured labels.
    ///
    /// Action ids are assigned in order across tiers starting at "1", so the
    /// default catalog yields ids 1-4 (primary), 5-7 (secondary), 8-11 (bonus).
    pub fn from_config(config: &CatalogConfig) -> Self {
        let mut next_id = 1usize;
        let tiers = [
            (ActionTier::Primary, &config.primary, config.primary_rights),
            (ActionTier::Secondary, &config.secondary, config.secondary_rights),
            (ActionTier::Bonus, &config.bonus, config.bonus_rights),
        ]
        .into_iter()
        .map(|(tier, labels, allowance)| {
            let actions = labels
                .iter()
                .map(|label| {
                    let action = Action {
                        id: next_id.to_string(),
                        label: label.trim().to_string(),
                        pressed: false,
                    };
                    next_id += 1;
                    action
                })
                .collect();
            TierCatalog {
                tier,
                actions,
                rights: Rights::full(allowance),
            }
        })
        .collect();

        Self { tiers }
    }

    fn tier(&self, tier: ActionTier) -> &TierCatalog {
        // Boards are always built with all three tiers, in declaration order.
        &self.tiers[tier as usize]
    }

    fn tier_mut(&mut self, tier: ActionTier) -> &mut TierCatalog {
        &mut self.tiers[tier as usize]
    }

    pub fn actions(&self, tier: ActionTier) -> &[Action] {
        &self.tier(tier).actions
    }

    pub fn rights(&self, tier: ActionTier) -> Rights {
        self.tier(tier).rights
    }

    /// Look up an action by label within a tier.
    pub fn find(&self, tier: ActionTier, label: &str) -> Option<&Action> {
        let label = label.trim();
        self.actions(tier).iter().find(|a| a.label == label)
    }

    /// Flip an action's pressed flag, returning the new value.
    pub fn toggle(&mut self, tier: ActionTier, label: &str) -> Option<bool> {
        let label = label.trim();
        let action = self
            .tier_mut(tier)
            .actions
            .iter_mut()
            .find(|a| a.label == label)?;
        action.pressed = !action.pressed;
        Some(action.pressed)
    }

    /// Start a new day: restore every allowance and clear pressed flags.
    pub fn reset_daily(&mut self) {
        for catalog in &mut self.tiers {
            catalog.rights.remaining = catalog.rights.allowance;
            for action in &mut catalog.actions {
                action.pressed = false;
            }
        }
    }

    pub fn tiers(&self) -> &[TierCatalog] {
        &self.tiers
    }
}

impl Default for ActionBoard {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board_layout() {
        let board = ActionBoard::default();
        assert_eq!(board.actions(ActionTier::Primary).len(), 4);
        assert_eq!(board.actions(ActionTier::Secondary).len(), 3);
        assert_eq!(board.actions(ActionTier::Bonus).len(), 4);
        assert_eq!(board.actions(ActionTier::Primary)[0].id, "1");
        assert_eq!(board.actions(ActionTier::Secondary)[0].id, "5");
        assert_eq!(board.actions(ActionTier::Bonus)[3].id, "11");
    }

    #[test]
    fn test_default_rights() {
        let board = ActionBoard::default();
        assert_eq!(board.rights(ActionTier::Primary).remaining, 3);
        assert_eq!(board.rights(ActionTier::Secondary).remaining, 1);
        assert_eq!(board.rights(ActionTier::Bonus).allowance, 1);
    }

    #[test]
    fn test_find_is_scoped_to_tier() {
        let board = ActionBoard::default();
        assert!(board.find(ActionTier::Primary, "Poke").is_some());
        assert!(board.find(ActionTier::Secondary, "Poke").is_none());
        assert!(board.find(ActionTier::Primary, " Poke ").is_some());
        assert!(board.find(ActionTier::Primary, "poke").is_none());
    }

    #[test]
    fn test_toggle_flips_flag() {
        let mut board = ActionBoard::default();
        assert_eq!(board.toggle(ActionTier::Bonus, "Kiss"), Some(true));
        assert_eq!(board.toggle(ActionTier::Bonus, "Kiss"), Some(false));
        assert_eq!(board.toggle(ActionTier::Bonus, "Nope"), None);
    }

    #[test]
    fn test_reset_daily_clears_pressed() {
        let mut board = ActionBoard::default();
        board.toggle(ActionTier::Secondary, "Pat");
        board.reset_daily();
        assert!(board
            .tiers()
            .iter()
            .flat_map(|t| t.actions.iter())
            .all(|a| !a.pressed));
        assert_eq!(board.rights(ActionTier::Secondary).remaining, 1);
    }

    #[test]
    fn test_custom_catalog() {
        let config = CatalogConfig {
            primary: vec!["Zap".into()],
            secondary: vec![],
            bonus: vec!["Wave".into()],
            primary_rights: 5,
            secondary_rights: 0,
            bonus_rights: 2,
        };
        let board = ActionBoard::from_config(&config);
        assert_eq!(board.find(ActionTier::Bonus, "Wave").unwrap().id, "2");
        assert_eq!(board.rights(ActionTier::Primary).allowance, 5);
        assert!(board.actions(ActionTier::Secondary).is_empty());
    }
}
