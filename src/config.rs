use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// IANA zone used when a request does not name one.
    pub default_timezone: String,
    /// Decides numeric date order: `en-US`/`en` read `MM/DD`, others `DD/MM`.
    pub default_locale: String,
    pub default_duration_minutes: i64,
    pub max_input_chars: usize,
    pub title_fallback_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_timezone: "UTC".to_string(),
            default_locale: "en-US".to_string(),
            default_duration_minutes: 60,
            max_input_chars: 10_000,
            title_fallback_chars: 50,
        }
    }
}

/// Confidence weights. Only the ordering they produce matters to callers:
/// explicit candidates outrank partial ones, which outrank a bare fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base: f64,
    pub title_explicit: f64,
    pub title_phrase: f64,
    pub title_lead: f64,
    pub time_meridiem: f64,
    pub time_24_hour: f64,
    pub time_named: f64,
    pub date_due_label: f64,
    pub date_explicit: f64,
    pub date_relative: f64,
    pub date_weekday: f64,
    pub location_precise: f64,
    pub location_address: f64,
    pub location_prepositional: f64,
    pub fallback_title_cap: f64,
    pub accept_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: 0.40,
            title_explicit: 0.15,
            title_phrase: 0.12,
            title_lead: 0.10,
            time_meridiem: 0.15,
            time_24_hour: 0.12,
            time_named: 0.10,
            date_due_label: 0.20,
            date_explicit: 0.15,
            date_relative: 0.12,
            date_weekday: 0.10,
            location_precise: 0.15,
            location_address: 0.12,
            location_prepositional: 0.08,
            fallback_title_cap: 0.65,
            accept_threshold: 0.70,
        }
    }
}

impl ScoringConfig {
    /// Whether a candidate with this confidence should be offered as-is.
    pub fn accepts(&self, confidence: f64) -> bool {
        confidence >= self.accept_threshold
    }

    fn weights(&self) -> [(&'static str, f64); 16] {
        [
            ("base", self.base),
            ("title_explicit", self.title_explicit),
            ("title_phrase", self.title_phrase),
            ("title_lead", self.title_lead),
            ("time_meridiem", self.time_meridiem),
            ("time_24_hour", self.time_24_hour),
            ("time_named", self.time_named),
            ("date_due_label", self.date_due_label),
            ("date_explicit", self.date_explicit),
            ("date_relative", self.date_relative),
            ("date_weekday", self.date_weekday),
            ("location_precise", self.location_precise),
            ("location_address", self.location_address),
            ("location_prepositional", self.location_prepositional),
            ("fallback_title_cap", self.fallback_title_cap),
            ("accept_threshold", self.accept_threshold),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 3000 }
    }
}

impl Config {
    /// Load the user's config file, creating it with defaults if missing, and
    /// apply `SNAPCAL_*` environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            default_config
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(tz) = env::var("SNAPCAL_TIMEZONE") {
            debug!("Timezone overridden from environment: {}", tz);
            self.extraction.default_timezone = tz;
        }
        if let Ok(locale) = env::var("SNAPCAL_LOCALE") {
            self.extraction.default_locale = locale;
        }
        if let Ok(host) = env::var("SNAPCAL_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SNAPCAL_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("SNAPCAL_PORT is not a valid port: {}", port))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.default_timezone.parse::<Tz>().is_err() {
            bail!("Unknown default timezone: {}", self.extraction.default_timezone);
        }
        if self.extraction.default_duration_minutes <= 0 {
            bail!("default_duration_minutes must be positive");
        }
        if self.extraction.max_input_chars == 0 || self.extraction.title_fallback_chars == 0 {
            bail!("max_input_chars and title_fallback_chars must be positive");
        }
        for (name, weight) in self.scoring.weights() {
            if !(0.0..=1.0).contains(&weight) {
                bail!("scoring.{} must be between 0 and 1, got {}", name, weight);
            }
        }
        if self.scoring.fallback_title_cap >= self.scoring.accept_threshold {
            bail!("scoring.fallback_title_cap must be below scoring.accept_threshold");
        }
        Ok(())
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "snapcal", "snapcal")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
