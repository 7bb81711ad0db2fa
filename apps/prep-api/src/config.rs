use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::profile::topics::{MatcherKind, SkillTopicMap};

/// Application configuration loaded from environment variables.
/// Nothing is strictly required: the CLI pipeline needs no API key, and the
/// HTTP handlers report a missing key per request.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Base HTML template for the personalized prep page.
    pub base_template_file: PathBuf,
    pub output_dir: PathBuf,
    pub auto_backup: bool,
    pub validate_before_generation: bool,
    /// Locked resume template relayed to the model by the HTTP handlers.
    pub resume_template_path: PathBuf,
    /// Optional JSON skill→topic table replacing the built-in one.
    pub skill_map_path: Option<PathBuf>,
    pub topic_matcher: MatcherKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
            base_template_file: PathBuf::from("structured.html"),
            output_dir: PathBuf::from("./"),
            auto_backup: true,
            validate_before_generation: true,
            resume_template_path: PathBuf::from("templates/resume_template_locked.html"),
            skill_map_path: None,
            topic_matcher: MatcherKind::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            base_template_file: optional_env("BASE_TEMPLATE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.base_template_file),
            output_dir: optional_env("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            auto_backup: bool_env("AUTO_BACKUP", defaults.auto_backup)?,
            validate_before_generation: bool_env(
                "VALIDATE_BEFORE_GENERATION",
                defaults.validate_before_generation,
            )?,
            resume_template_path: optional_env("RESUME_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.resume_template_path),
            skill_map_path: optional_env("SKILL_MAP_PATH").map(PathBuf::from),
            topic_matcher: match optional_env("TOPIC_MATCHER") {
                Some(raw) => raw
                    .parse::<MatcherKind>()
                    .map_err(|e| anyhow!(e))
                    .context("TOPIC_MATCHER is invalid")?,
                None => defaults.topic_matcher,
            },
        })
    }

    /// The configured lookup table: `SKILL_MAP_PATH` if set, else the built-in.
    pub fn skill_topic_map(&self) -> Result<SkillTopicMap> {
        match &self.skill_map_path {
            Some(path) => SkillTopicMap::from_file(path)
                .with_context(|| format!("Failed to load skill map from {}", path.display())),
            None => Ok(SkillTopicMap::default()),
        }
    }
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn bool_env(key: &str, default: bool) -> Result<bool> {
    match optional_env(key) {
        Some(raw) => parse_bool(&raw)
            .with_context(|| format!("{key} must be a boolean (true/false), got '{raw}'")),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
