//! Core data types for photos, tiers and action outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound of the durability percentage.
pub const MAX_PERCENTAGE: u8 = 100;

/// A gallery slot and its durability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Stable identifier, unique within the gallery
    pub id: String,

    /// Reference to the image bytes; `None` is an unassigned slot
    #[serde(default)]
    pub uri: Option<String>,

    /// Display label
    pub name: String,

    /// Remaining durability, 0 to 100
    pub percentage: u8,

    /// Presentation hint only
    #[serde(default)]
    pub color_tag: String,
}

impl Photo {
    /// Create an unassigned slot at full durability.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: None,
            name: name.into(),
            percentage: MAX_PERCENTAGE,
            color_tag: String::new(),
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_percentage(mut self, percentage: u8) -> Self {
        self.percentage = percentage.min(MAX_PERCENTAGE);
        self
    }

    /// Whether the slot has image bytes.
    pub fn is_assigned(&self) -> bool {
        self.uri.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn durability(&self) -> Durability {
        if self.percentage > 0 {
            Durability::Active
        } else {
            Durability::Exhausted
        }
    }

    /// Pull an out-of-range stored percentage back into bounds.
    pub fn clamp(&mut self) {
        if self.percentage > MAX_PERCENTAGE {
            tracing::warn!(
                "Photo {} stored with percentage {}, clamping to {MAX_PERCENTAGE}",
                self.id,
                self.percentage
            );
            self.percentage = MAX_PERCENTAGE;
        }
    }
}

/// Durability state of a photo for primary actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    /// Percentage above zero
    Active,
    /// Percentage at zero; terminal for primary actions
    Exhausted,
}

/// Classification of an action catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionTier {
    /// Consumes durability and calls the description service
    Primary,
    Secondary,
    Bonus,
}

impl ActionTier {
    pub const ALL: [ActionTier; 3] = [ActionTier::Primary, ActionTier::Secondary, ActionTier::Bonus];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTier::Primary => "primary",
            ActionTier::Secondary => "secondary",
            ActionTier::Bonus => "bonus",
        }
    }
}

impl fmt::Display for ActionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "main" => Ok(ActionTier::Primary),
            "secondary" => Ok(ActionTier::Secondary),
            "bonus" => Ok(ActionTier::Bonus),
            other => Err(format!(
                "Unknown tier '{other}' (expected primary, secondary or bonus)"
            )),
        }
    }
}

/// Result of a successful `apply_action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    /// Whether durability was decremented
    pub percentage_changed: bool,

    /// Durability after the action, when it changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_percentage: Option<u8>,

    /// Text returned by the description service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The action's toggled display flag after this call
    pub pressed: bool,
}

impl ActionOutcome {
    /// Outcome of an action that only toggles display state.
    pub fn toggled(pressed: bool) -> Self {
        Self {
            percentage_changed: false,
            new_percentage: None,
            description: None,
            pressed,
        }
    }
}

/// Text produced by a description service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub text: String,
    /// Model identifier reported by the provider
    pub model: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}
