//! Application configuration for Ballot.
//!
//! User config lives at `~/.ballot/ballot.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BallotError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "ballot.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".ballot";

// ---------------------------------------------------------------------------
// Config structs (matching ballot.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the source document lives.
    #[serde(default)]
    pub source: SourceConfig,

    /// Document retrieval settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Tabular sections to extract, in output order.
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionConfig>,

    /// Label phrases searched in the campaign cell.
    #[serde(default)]
    pub labels: LabelsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            fetch: FetchConfig::default(),
            sections: default_sections(),
            labels: LabelsConfig::default(),
        }
    }
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Site origin that relative `/wiki/...` links are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the election article listing the candidates.
    #[serde(default = "default_election_path")]
    pub election_path: String,

    /// Class token identifying a page's main content region.
    #[serde(default = "default_content_class")]
    pub content_class: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            election_path: default_election_path(),
            content_class: default_content_class(),
        }
    }
}

fn default_base_url() -> String {
    "https://en.wikipedia.org".into()
}
fn default_election_path() -> String {
    "/wiki/2020_United_States_presidential_election".into()
}
fn default_content_class() -> String {
    "mw-parser-output".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum concurrent profile fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Whether fetched documents are cached on disk.
    #[serde(default = "default_true")]
    pub cache: bool,

    /// Cache directory (defaults to `~/.ballot/cache`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            cache: true,
            cache_dir: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_concurrency() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

/// `[[sections]]` entry: a heading to look for and the output key it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Exact heading text preceding the table.
    pub heading: String,
    /// Key used in the output object.
    pub label: String,
}

fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig {
            heading: "Democratic Party".into(),
            label: "democratic".into(),
        },
        SectionConfig {
            heading: "Republican Party".into(),
            label: "republican".into(),
        },
    ]
}

/// `[labels]` section. Each list is tried in order; the first phrase found wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    /// Phrases preceding the exploratory committee date.
    #[serde(default = "default_exploratory_labels")]
    pub exploratory: Vec<String>,

    /// Phrases preceding the campaign announcement date.
    #[serde(default = "default_announcement_labels")]
    pub announcement: Vec<String>,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            exploratory: default_exploratory_labels(),
            announcement: default_announcement_labels(),
        }
    }
}

fn default_exploratory_labels() -> Vec<String> {
    vec![
        "Exploratory committee announced: ".into(),
        "Exploratory committee: ".into(),
    ]
}
fn default_announcement_labels() -> Vec<String> {
    vec![
        "Campaign announced: ".into(),
        "Announced: ".into(),
        "Campaign: ".into(),
    ]
}

// ---------------------------------------------------------------------------
// Extract config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime extraction configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Origin for relative links.
    pub base_url: Url,
    /// Absolute URL of the election article.
    pub election_url: Url,
    /// Class token of the main content region.
    pub content_class: String,
    /// Sections to extract.
    pub sections: Vec<SectionConfig>,
    /// Maximum concurrent biography fetches.
    pub concurrency: u32,
    /// Exploratory committee label phrases, in fallback order.
    pub exploratory_labels: Vec<String>,
    /// Campaign announcement label phrases, in fallback order.
    pub announcement_labels: Vec<String>,
}

impl TryFrom<&AppConfig> for ExtractConfig {
    type Error = BallotError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.source.base_url).map_err(|e| {
            BallotError::config(format!("invalid base_url {:?}: {e}", config.source.base_url))
        })?;
        let election_url = base_url.join(&config.source.election_path).map_err(|e| {
            BallotError::config(format!(
                "invalid election_path {:?}: {e}",
                config.source.election_path
            ))
        })?;

        if config.sections.is_empty() {
            return Err(BallotError::config("at least one [[sections]] entry is required"));
        }

        Ok(Self {
            base_url,
            election_url,
            content_class: config.source.content_class.clone(),
            sections: config.sections.clone(),
            concurrency: config.fetch.concurrency.max(1),
            exploratory_labels: config.labels.exploratory.clone(),
            announcement_labels: config.labels.announcement.clone(),
        })
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        let base_url = Url::parse("https://en.wikipedia.org").expect("valid default base url");
        let election_url = base_url
            .join(&default_election_path())
            .expect("valid default election path");
        Self {
            base_url,
            election_url,
            content_class: default_content_class(),
            sections: default_sections(),
            concurrency: default_concurrency(),
            exploratory_labels: default_exploratory_labels(),
            announcement_labels: default_announcement_labels(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.ballot/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| BallotError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.ballot/ballot.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BallotError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BallotError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BallotError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BallotError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BallotError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
