use std::env;

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use tracing::warn;

/// Brasília standard time, where the clinic front desk operates.
pub const DEFAULT_CLINIC_UTC_OFFSET_MINUTES: i32 = -180;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub clinic_utc_offset_minutes: i32,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            clinic_utc_offset_minutes: parse_var(
                "CLINIC_UTC_OFFSET_MINUTES",
                DEFAULT_CLINIC_UTC_OFFSET_MINUTES,
            ),
            port: parse_var("PORT", DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Configuration pointing at a given store, with default clinic settings.
    pub fn for_store(supabase_url: impl Into<String>, supabase_anon_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into(),
            supabase_anon_key: supabase_anon_key.into(),
            clinic_utc_offset_minutes: DEFAULT_CLINIC_UTC_OFFSET_MINUTES,
            port: DEFAULT_PORT,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    /// Offset used to turn the current UTC instant into clinic wall-clock time.
    /// Falls back to UTC when the configured minutes are out of range.
    pub fn clinic_offset(&self) -> FixedOffset {
        self.clinic_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(
                    "CLINIC_UTC_OFFSET_MINUTES={} is out of range, using UTC",
                    self.clinic_utc_offset_minutes
                );
                Utc.fix()
            })
    }
}

fn parse_var<T: std::str::FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinic_offset_uses_configured_minutes() {
        let config = AppConfig::for_store("http://localhost:54321", "anon");
        assert_eq!(config.clinic_offset().local_minus_utc(), -180 * 60);
    }

    #[test]
    fn clinic_offset_falls_back_to_utc_when_out_of_range() {
        let mut config = AppConfig::for_store("http://localhost:54321", "anon");
        config.clinic_utc_offset_minutes = 24 * 60;
        assert_eq!(config.clinic_offset().local_minus_utc(), 0);
    }

    #[test]
    fn clinic_offset_falls_back_to_utc_when_seconds_overflow() {
        let mut config = AppConfig::for_store("http://localhost:54321", "anon");
        for minutes in [40_000_000, i32::MIN, i32::MAX] {
            config.clinic_utc_offset_minutes = minutes;
            assert_eq!(config.clinic_offset().local_minus_utc(), 0, "minutes {}", minutes);
        }
    }

    #[test]
    fn unconfigured_without_store_url() {
        let config = AppConfig::for_store("", "anon");
        assert!(!config.is_configured());
    }
}
