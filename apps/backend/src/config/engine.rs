use std::env;
use std::time::Duration;

use crate::domain::rules::{DEFAULT_TARGET_ROUNDS, WIN_THRESHOLD};
use crate::error::AppError;

/// When a roll's points reach `totalPoints`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalPointsMode {
    /// Round points are folded into the total during the round transition.
    AtRoundEnd,
    /// Every scoring roll also increments the total immediately.
    PerRoll,
}

/// Presentation delays and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub roll_presentation: Duration,
    pub bot_roll_presentation: Duration,
    pub bot_result_display: Duration,
    pub bot_final_pause: Duration,
    pub zero_roll_advance: Duration,
    pub end_turn_enable_delay: Duration,
    pub auto_end_turn_timeout: Duration,
    pub monitor_poll_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            roll_presentation: Duration::from_millis(2000),
            bot_roll_presentation: Duration::from_millis(3000),
            bot_result_display: Duration::from_millis(1000),
            bot_final_pause: Duration::from_millis(2000),
            zero_roll_advance: Duration::from_millis(1000),
            end_turn_enable_delay: Duration::from_millis(1000),
            auto_end_turn_timeout: Duration::from_millis(4000),
            monitor_poll_interval: Duration::from_millis(3000),
        }
    }
}

impl Timings {
    /// No presentation delays. The poll interval stays small but non-zero so
    /// polling agents still yield.
    pub fn instant() -> Self {
        Self {
            roll_presentation: Duration::ZERO,
            bot_roll_presentation: Duration::ZERO,
            bot_result_display: Duration::ZERO,
            bot_final_pause: Duration::ZERO,
            zero_roll_advance: Duration::ZERO,
            end_turn_enable_delay: Duration::ZERO,
            auto_end_turn_timeout: Duration::ZERO,
            monitor_poll_interval: Duration::from_millis(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub win_threshold: i64,
    pub default_target_rounds: u32,
    pub seating_retry_limit: u32,
    pub total_points_mode: TotalPointsMode,
    pub seed: Option<u64>,
    /// Run the round transition as soon as "next round ready" is seen,
    /// without waiting for the host.
    pub auto_advance_rounds: bool,
    pub timings: Timings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            win_threshold: WIN_THRESHOLD,
            default_target_rounds: DEFAULT_TARGET_ROUNDS,
            seating_retry_limit: 10,
            total_points_mode: TotalPointsMode::AtRoundEnd,
            seed: None,
            auto_advance_rounds: false,
            timings: Timings::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults with every delay removed.
    pub fn instant() -> Self {
        Self {
            timings: Timings::instant(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let mut timings = if parse_flag(&lookup, "BUNCO_INSTANT_TIMINGS")?.unwrap_or(false) {
            Timings::instant()
        } else {
            defaults.timings.clone()
        };

        override_ms(&lookup, "BUNCO_ROLL_PRESENTATION_MS", &mut timings.roll_presentation)?;
        override_ms(&lookup, "BUNCO_BOT_ROLL_PRESENTATION_MS", &mut timings.bot_roll_presentation)?;
        override_ms(&lookup, "BUNCO_BOT_RESULT_DISPLAY_MS", &mut timings.bot_result_display)?;
        override_ms(&lookup, "BUNCO_BOT_FINAL_PAUSE_MS", &mut timings.bot_final_pause)?;
        override_ms(&lookup, "BUNCO_ZERO_ROLL_ADVANCE_MS", &mut timings.zero_roll_advance)?;
        override_ms(&lookup, "BUNCO_END_TURN_ENABLE_DELAY_MS", &mut timings.end_turn_enable_delay)?;
        override_ms(&lookup, "BUNCO_AUTO_END_TURN_TIMEOUT_MS", &mut timings.auto_end_turn_timeout)?;
        override_ms(&lookup, "BUNCO_MONITOR_POLL_INTERVAL_MS", &mut timings.monitor_poll_interval)?;

        let total_points_mode = match lookup("BUNCO_TOTAL_POINTS_MODE").as_deref() {
            None | Some("round_end") => TotalPointsMode::AtRoundEnd,
            Some("per_roll") => TotalPointsMode::PerRoll,
            Some(other) => {
                return Err(AppError::config(format!(
                    "BUNCO_TOTAL_POINTS_MODE must be 'round_end' or 'per_roll', got '{other}'"
                )))
            }
        };

        let default_target_rounds = parse_num(&lookup, "BUNCO_TARGET_ROUNDS")?
            .unwrap_or(defaults.default_target_rounds);
        if default_target_rounds == 0 {
            return Err(AppError::config("BUNCO_TARGET_ROUNDS must be at least 1"));
        }

        Ok(Self {
            win_threshold: parse_num(&lookup, "BUNCO_WIN_THRESHOLD")?
                .unwrap_or(defaults.win_threshold),
            default_target_rounds,
            seating_retry_limit: parse_num(&lookup, "BUNCO_SEATING_RETRY_LIMIT")?
                .unwrap_or(defaults.seating_retry_limit),
            total_points_mode,
            seed: parse_num(&lookup, "BUNCO_SEED")?,
            auto_advance_rounds: parse_flag(&lookup, "BUNCO_AUTO_ADVANCE")?
                .unwrap_or(defaults.auto_advance_rounds),
            timings,
        })
    }
}

fn parse_num<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::config(format!("{key} must be a number, got '{raw}'"))),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<bool>, AppError> {
    match lookup(key).as_deref().map(str::trim) {
        None => Ok(None),
        Some("1" | "true" | "yes") => Ok(Some(true)),
        Some("0" | "false" | "no") => Ok(Some(false)),
        Some(other) => Err(AppError::config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

fn override_ms(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut Duration,
) -> Result<(), AppError> {
    if let Some(ms) = parse_num::<u64>(lookup, key)? {
        *slot = Duration::from_millis(ms);
    }
    Ok(())
}
