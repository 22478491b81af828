use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domains::membership::formatter::{western_indonesia_time, MessageLocale};
use crate::domains::membership::publisher::{DEFAULT_PUBLISH_TIMEOUT, DEFAULT_SUBJECT};

/// Display name of the custom field holding a user's phone number.
pub const DEFAULT_PHONE_ATTRIBUTE: &str = "Phone Number";

/// How membership notifications are addressed and rendered.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub subject: String,
    pub publish_timeout: Duration,
    pub phone_attribute: String,
    pub locale: MessageLocale,
    pub utc_offset: FixedOffset,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
            phone_attribute: DEFAULT_PHONE_ATTRIBUTE.to_string(),
            locale: MessageLocale::default(),
            utc_offset: western_indonesia_time(),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub nats_url: String,
    pub nats_connect_timeout: Duration,
    pub notifications: NotificationSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (environment, test maps).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = NotificationSettings::default();

        let publish_timeout = match lookup("NOTIFY_PUBLISH_TIMEOUT_MS") {
            Some(ms) => Duration::from_millis(
                ms.parse()
                    .context("NOTIFY_PUBLISH_TIMEOUT_MS must be a valid number")?,
            ),
            None => defaults.publish_timeout,
        };

        let locale = match lookup("NOTIFY_LOCALE") {
            Some(raw) => raw
                .parse::<MessageLocale>()
                .map_err(|e| anyhow!(e))
                .context("NOTIFY_LOCALE must be 'id' or 'en'")?,
            None => defaults.locale,
        };

        let utc_offset = match lookup("NOTIFY_UTC_OFFSET") {
            Some(raw) => parse_utc_offset(&raw).context("NOTIFY_UTC_OFFSET must look like +07:00")?,
            None => defaults.utc_offset,
        };

        Ok(Self {
            nats_url: lookup("NATS_URL").context("NATS_URL must be set")?,
            nats_connect_timeout: Duration::from_millis(
                lookup("NOTIFY_CONNECT_TIMEOUT_MS")
                    .unwrap_or_else(|| "5000".to_string())
                    .parse()
                    .context("NOTIFY_CONNECT_TIMEOUT_MS must be a valid number")?,
            ),
            notifications: NotificationSettings {
                subject: lookup("NOTIFY_SUBJECT").unwrap_or(defaults.subject),
                publish_timeout,
                phone_attribute: lookup("PHONE_ATTRIBUTE_NAME").unwrap_or(defaults.phone_attribute),
                locale,
                utc_offset,
            },
        })
    }
}

/// Parse `+HH:MM` / `-HH:MM` into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    let (sign, rest) = match raw.chars().next() {
        Some('+') => (1, &raw[1..]),
        Some('-') => (-1, &raw[1..]),
        _ => return Err(anyhow!("offset '{}' must start with + or -", raw)),
    };

    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| anyhow!("offset '{}' must be HH:MM", raw))?;
    let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(hours) || !is_digits(minutes) {
        return Err(anyhow!("offset '{}' must be HH:MM", raw));
    }
    let hours: i32 = hours.parse().context("invalid offset hours")?;
    let minutes: i32 = minutes.parse().context("invalid offset minutes")?;
    if minutes >= 60 {
        return Err(anyhow!("offset minutes out of range in '{}'", raw));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow!("offset '{}' out of range", raw))
}
