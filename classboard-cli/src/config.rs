use anyhow::{Context, Result};
use chrono_tz::Tz;
use classboard_core::DEFAULT_CLASS;
use classboard_core::time::parse_timezone;
use classboard_feed::FeedSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_classboard_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Path or http(s) URL of data.json.
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA timezone the timetable is written in.
    pub timezone: String,
    /// Used until a class is chosen with `classboard class set`.
    pub default_class: String,
    /// How often the dashboard re-reads the feed.
    pub refresh_seconds: u64,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            source: "./data.json".to_string(),
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Tokyo".to_string(),
            default_class: DEFAULT_CLASS.to_string(),
            refresh_seconds: 60,
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.display.timezone)
    }

    pub fn feed_source(&self) -> Result<FeedSource> {
        self.feed.source.parse()
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_classboard_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        tracing::debug!(path = %p.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg = parse_config("[feed]\nsource = \"https://school.example/data.json\"\n").unwrap();
        assert_eq!(cfg.display.timezone, "Asia/Tokyo");
        assert_eq!(cfg.display.refresh_seconds, 60);
        assert!(matches!(cfg.feed_source().unwrap(), FeedSource::Url(_)));
    }

    #[test]
    fn default_config_roundtrips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let cfg = parse_config(&s).unwrap();
        assert_eq!(cfg.display.default_class, "21HR");
        assert!(cfg.timezone().is_ok());
    }

    #[test]
    fn bad_timezone_is_reported() {
        let cfg = parse_config("[display]\ntimezone = \"Nowhere\"\n").unwrap();
        assert!(cfg.timezone().is_err());
    }
}
