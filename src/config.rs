use crate::bot::classify::AllyIdentity;
use crate::bot::constants::{feeding, nav, tick};
use crate::bot::obstacles::WallPolicy;
use crate::world::snapshot::EntityId;

/// Agent configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// Decision period in milliseconds
    pub tick_ms: u64,
    /// Entity id of the ally to feed (feeding is off without one)
    pub ally_id: Option<EntityId>,
    /// Display name the ally must also carry, if set
    pub ally_name: Option<String>,
    /// Walls closer than this become must-avoid sectors
    pub wall_margin: f64,
    /// When wall sectors are added
    pub wall_policy: WallPolicy,
    /// Distance travelled along an escape bearing
    pub lookahead: f64,
    /// Ally-seeking gives up after this long without contact
    pub ally_timeout_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            tick_ms: tick::INTERVAL_MS,
            ally_id: None,
            ally_name: None,
            wall_margin: nav::WALL_MARGIN,
            wall_policy: WallPolicy::Always,
            lookahead: nav::LOOKAHEAD,
            ally_timeout_ms: feeding::ALLY_TIMEOUT_MS,
        }
    }
}

impl BotConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Invalid values are logged and skipped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(tick_ms) = lookup("BOT_TICK_MS") {
            match tick_ms.parse::<u64>() {
                Ok(parsed) if parsed > 0 && parsed <= 10_000 => config.tick_ms = parsed,
                Ok(_) => tracing::warn!("BOT_TICK_MS must be 1-10000, using default"),
                Err(_) => tracing::warn!("Invalid BOT_TICK_MS '{}', using default", tick_ms),
            }
        }

        if let Some(ally_id) = lookup("BOT_ALLY_ID") {
            if let Ok(parsed) = ally_id.parse::<EntityId>() {
                config.ally_id = Some(parsed);
            } else {
                tracing::warn!("Invalid BOT_ALLY_ID '{}', feeding disabled", ally_id);
            }
        }

        if let Some(ally_name) = lookup("BOT_ALLY_NAME") {
            if !ally_name.is_empty() {
                config.ally_name = Some(ally_name);
            }
        }

        if let Some(margin) = lookup("BOT_WALL_MARGIN") {
            match margin.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => config.wall_margin = parsed,
                Ok(_) => tracing::warn!("BOT_WALL_MARGIN must be non-negative, using default"),
                Err(_) => tracing::warn!("Invalid BOT_WALL_MARGIN '{}', using default", margin),
            }
        }

        if let Some(policy) = lookup("BOT_WALL_POLICY") {
            match policy.parse::<WallPolicy>() {
                Ok(parsed) => config.wall_policy = parsed,
                Err(e) => tracing::warn!("{}, using default", e),
            }
        }

        if let Some(lookahead) = lookup("BOT_LOOKAHEAD") {
            match lookahead.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() && parsed > 0.0 => config.lookahead = parsed,
                Ok(_) => tracing::warn!("BOT_LOOKAHEAD must be > 0, using default"),
                Err(_) => tracing::warn!("Invalid BOT_LOOKAHEAD '{}', using default", lookahead),
            }
        }

        if let Some(timeout) = lookup("BOT_ALLY_TIMEOUT_MS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                config.ally_timeout_ms = parsed;
            } else {
                tracing::warn!("Invalid BOT_ALLY_TIMEOUT_MS '{}', using default", timeout);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if !self.wall_margin.is_finite() || self.wall_margin < 0.0 {
            return Err(ConfigError::InvalidDistance(
                "wall_margin",
                self.wall_margin,
            ));
        }
        if !self.lookahead.is_finite() || self.lookahead <= 0.0 {
            return Err(ConfigError::InvalidDistance("lookahead", self.lookahead));
        }
        if self.ally_name.is_some() && self.ally_id.is_none() {
            return Err(ConfigError::AllyNameWithoutId);
        }
        Ok(())
    }

    pub fn ally(&self) -> AllyIdentity {
        AllyIdentity::new(self.ally_id, self.ally_name.clone())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Tick period cannot be 0")]
    ZeroTick,
    #[error("{0} must be a positive finite distance, got {1}")]
    InvalidDistance(&'static str, f64),
    #[error("Ally name is set but no ally id")]
    AllyNameWithoutId,
}
