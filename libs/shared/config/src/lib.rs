use std::env;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Signed contribution of each scoring rule to a slot's desirability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub gap_filler: i32,
    pub prime_time: i32,
    pub early_bird: i32,
    pub lunch_penalty: i32,
    pub same_day: i32,
    pub patient_history: i32,
    pub load_balance: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            gap_filler: 30,
            prime_time: 20,
            early_bird: 10,
            lunch_penalty: -15,
            same_day: 25,
            patient_history: 15,
            load_balance: -10,
        }
    }
}

impl ScoringWeights {
    /// Default rubric with any `SCORING_WEIGHT_*` variables applied on top.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gap_filler: env_or("SCORING_WEIGHT_GAP_FILLER", defaults.gap_filler),
            prime_time: env_or("SCORING_WEIGHT_PRIME_TIME", defaults.prime_time),
            early_bird: env_or("SCORING_WEIGHT_EARLY_BIRD", defaults.early_bird),
            lunch_penalty: env_or("SCORING_WEIGHT_LUNCH_PENALTY", defaults.lunch_penalty),
            same_day: env_or("SCORING_WEIGHT_SAME_DAY", defaults.same_day),
            patient_history: env_or("SCORING_WEIGHT_PATIENT_HISTORY", defaults.patient_history),
            load_balance: env_or("SCORING_WEIGHT_LOAD_BALANCE", defaults.load_balance),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clinic_timezone: Tz,
    pub default_slot_interval_minutes: u32,
    pub average_daily_bookings: u32,
    pub max_alternatives: usize,
    pub scoring_weights: ScoringWeights,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clinic_timezone: Tz::UTC,
            default_slot_interval_minutes: 30,
            average_daily_bookings: 8,
            max_alternatives: 5,
            scoring_weights: ScoringWeights::default(),
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let clinic_timezone = match env::var("CLINIC_TIMEZONE") {
            Ok(name) => Tz::from_str(&name).unwrap_or_else(|_| {
                warn!("CLINIC_TIMEZONE '{}' is not a known IANA zone, using UTC", name);
                Tz::UTC
            }),
            Err(_) => {
                warn!("CLINIC_TIMEZONE not set, using UTC");
                Tz::UTC
            }
        };

        let mut default_slot_interval_minutes =
            env_or("DEFAULT_SLOT_INTERVAL_MINUTES", defaults.default_slot_interval_minutes);
        if default_slot_interval_minutes == 0 {
            warn!("DEFAULT_SLOT_INTERVAL_MINUTES must be positive, using 30");
            default_slot_interval_minutes = 30;
        }

        let config = Self {
            clinic_timezone,
            default_slot_interval_minutes,
            average_daily_bookings: env_or("AVERAGE_DAILY_BOOKINGS", defaults.average_daily_bookings),
            max_alternatives: env_or("MAX_ALTERNATIVES", defaults.max_alternatives),
            scoring_weights: ScoringWeights::from_env(),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        };

        if config.scoring_weights != ScoringWeights::default() {
            warn!("Scoring weights overridden from environment: {:?}", config.scoring_weights);
        }

        config
    }

    /// Current calendar date in the clinic's timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.clinic_timezone).date_naive()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
