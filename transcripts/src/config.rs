use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::content::encoding::Encoding;
use crate::error::{Result, TranscriptError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptsConfig {
    #[serde(default)]
    pub google: GoogleConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub locator: LocatorConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Path to a Google OAuth client secret JSON file. When absent the
    /// client id and secret are taken from `GOOGLE_CLIENT_ID` and
    /// `GOOGLE_CLIENT_SECRET`.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Path to store the OAuth token cache
    #[serde(default = "default_token_cache")]
    pub token_cache_path: PathBuf,

    /// Calendar to read meetings from
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Local port used for the OAuth redirect
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,

    #[serde(skip)]
    pub client_id: Option<String>,

    #[serde(skip)]
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// How many months of past meetings to list
    #[serde(default = "default_months_back")]
    pub months_back: u32,

    /// How many days of upcoming meetings to include
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,

    /// Events requested per page
    #[serde(default = "default_calendar_page_size")]
    pub page_size: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Conventional name of the folder holding transcripts
    #[serde(default = "default_folder_name")]
    pub folder_name: String,

    /// Names tried in order when the conventional folder does not exist
    #[serde(default = "default_alternate_folder_names")]
    pub alternate_folder_names: Vec<String>,

    /// Token every transcript file name carries
    #[serde(default = "default_transcript_marker")]
    pub transcript_marker: String,

    /// Files requested per page
    #[serde(default = "default_drive_page_size")]
    pub page_size: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory where downloaded transcripts are stored
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Directory for temporary artifacts; defaults to `<download_dir>/.scratch`
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Encodings tried in order when reading downloaded bytes as text
    #[serde(default = "default_encodings")]
    pub encodings: Vec<Encoding>,

    /// Binary used to read word-processing documents
    #[serde(default = "default_pandoc_path")]
    pub pandoc_path: PathBuf,

    #[serde(default = "default_reader_timeout")]
    pub reader_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per remote call, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_token_cache() -> PathBuf {
    PathBuf::from("token_cache.json")
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_redirect_port() -> u16 {
    8080
}

fn default_months_back() -> u32 {
    3
}

fn default_days_ahead() -> u32 {
    30
}

fn default_calendar_page_size() -> i32 {
    250
}

fn default_folder_name() -> String {
    "Meet Recordings".to_string()
}

fn default_alternate_folder_names() -> Vec<String> {
    vec![
        "Meet recordings".to_string(),
        "Google Meet Recordings".to_string(),
        "Meeting Recordings".to_string(),
        "Recordings".to_string(),
    ]
}

fn default_transcript_marker() -> String {
    "Transcript".to_string()
}

fn default_drive_page_size() -> i32 {
    100
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("transcripts")
}

fn default_encodings() -> Vec<Encoding> {
    vec![Encoding::Utf8, Encoding::Latin1, Encoding::Windows1252]
}

fn default_pandoc_path() -> PathBuf {
    PathBuf::from("pandoc")
}

fn default_reader_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    8_000
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            token_cache_path: default_token_cache(),
            calendar_id: default_calendar_id(),
            redirect_port: default_redirect_port(),
            client_id: None,
            client_secret: None,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            months_back: default_months_back(),
            days_ahead: default_days_ahead(),
            page_size: default_calendar_page_size(),
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            folder_name: default_folder_name(),
            alternate_folder_names: default_alternate_folder_names(),
            transcript_marker: default_transcript_marker(),
            page_size: default_drive_page_size(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            scratch_dir: None,
            encodings: default_encodings(),
            pandoc_path: default_pandoc_path(),
            reader_timeout_secs: default_reader_timeout(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl ContentConfig {
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| self.download_dir.join(".scratch"))
    }

    pub fn reader_timeout(&self) -> Duration {
        Duration::from_secs(self.reader_timeout_secs)
    }
}

impl TranscriptsConfig {
    /// Parse a TOML document. Missing sections fall back to their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TranscriptError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load the file when present, then apply environment overrides.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load(path)?,
            Some(path) => {
                tracing::warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Credentials always come from the environment when set there.
    pub fn apply_env(&mut self) {
        if let Ok(id) = std::env::var("GOOGLE_CLIENT_ID") {
            self.google.client_id = Some(id);
        }
        if let Ok(secret) = std::env::var("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = Some(secret);
        }
        if let Ok(path) = std::env::var("GOOGLE_CREDENTIALS_PATH") {
            self.google.credentials_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("TOKEN_CACHE_PATH") {
            self.google.token_cache_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("TRANSCRIPTS_DIR") {
            self.content.download_dir = PathBuf::from(dir);
        }
    }
}
