//! Configuration layer: typed settings with layered precedence (file → env →
//! CLI), plus the command-line surface whose subcommands are the app's views.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::types::{SortKey, Theme};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "wayfare";
const DEFAULT_POSTS_TABLE: &str = "Travel";
const DEFAULT_GEOCODE_URL: &str = "https://api.opencagedata.com";
const DEFAULT_SESSION_FILE: &str = ".wayfare/session.json";

/// Command-line arguments for the Wayfare binary.
#[derive(Debug, Parser)]
#[command(name = "wayfare", version, about = "Wayfare travel journal client")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "WAYFARE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the backend base URL.
    #[arg(long = "backend-url", env = "WAYFARE_BACKEND_URL", value_name = "URL")]
    pub backend_url: Option<String>,

    /// Backend API key (flag hidden to keep keys out of shell history).
    #[arg(long = "backend-api-key", hide = true, env = "WAYFARE_API_KEY")]
    pub backend_api_key: Option<String>,

    /// Override the posts table name.
    #[arg(long = "backend-table", value_name = "NAME")]
    pub backend_table: Option<String>,

    /// Override the session cache file location.
    #[arg(long = "session-file", env = "WAYFARE_SESSION_FILE", value_name = "PATH")]
    pub session_file: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the reverse-geocoding endpoint.
    #[arg(long = "geocode-url", value_name = "URL")]
    pub geocode_url: Option<String>,

    /// Reverse-geocoding API key (flag hidden, same reason as above).
    #[arg(long = "geocode-api-key", hide = true, env = "WAYFARE_GEOCODE_API_KEY")]
    pub geocode_api_key: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Browse the journey feed (the default view).
    Feed(FeedArgs),
    /// Show one post with its comment thread.
    Show(ShowArgs),
    /// Share a new journey.
    Create(Box<CreateArgs>),
    /// Edit a post you own (requires its secret key).
    Edit(Box<EditArgs>),
    /// Delete a post you own (requires its secret key).
    Delete(DeleteArgs),
    /// Add a like to a post.
    Like(LikeArgs),
    /// Append a comment to a post.
    Comment(CommentArgs),
    /// Sign in and cache the session.
    Login(LoginArgs),
    /// Sign out and clear the cached session.
    Logout,
    /// Print the active identity.
    Whoami(WhoamiArgs),
    /// Set or toggle the colour theme.
    Theme(ThemeArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct FeedArgs {
    /// Case-insensitive search over title and location.
    #[arg(long)]
    pub search: Option<String>,

    /// Keep only posts of this journey type (exact match).
    #[arg(long = "type", value_name = "TYPE")]
    pub travel_type: Option<String>,

    /// Sort key for the derived view.
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Include story previews and photo links in the cards.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub content: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    pub id: i64,
}

#[derive(Debug, Args, Clone)]
pub struct CreateArgs {
    /// Journey title.
    #[arg(long)]
    pub title: String,

    /// Where the journey happened, e.g. "Santorini, Greece".
    #[arg(long)]
    pub location: Option<String>,

    /// Journey type, e.g. Adventure, Relaxation, Cultural.
    #[arg(long = "type", value_name = "TYPE")]
    pub travel_type: Option<String>,

    /// Photo URL.
    #[arg(long)]
    pub photos: Option<String>,

    /// Story text inline.
    #[arg(long)]
    pub story: Option<String>,

    /// Read the story text from a file (takes precedence over --story).
    #[arg(long, value_name = "PATH")]
    pub story_file: Option<PathBuf>,

    /// Secret key required to edit or delete the post later.
    #[arg(long, env = "WAYFARE_POST_SECRET")]
    pub secret: Option<String>,

    /// Repost: reference the original post by id.
    #[arg(long = "repost-of", value_name = "ID")]
    pub repost_of: Option<i64>,

    /// Coordinates "lat,lon" used to pre-fill the location when none is
    /// given.
    #[arg(long, value_name = "LAT,LON")]
    pub coords: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct EditArgs {
    pub id: i64,

    /// Replacement journey title.
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long = "type", value_name = "TYPE")]
    pub travel_type: Option<String>,

    #[arg(long)]
    pub photos: Option<String>,

    /// Replacement story text; overwrites the whole field, comments
    /// included.
    #[arg(long)]
    pub story: Option<String>,

    /// Read the replacement story from a file.
    #[arg(long, value_name = "PATH")]
    pub story_file: Option<PathBuf>,

    /// The post's secret key.
    #[arg(long, env = "WAYFARE_POST_SECRET")]
    pub secret: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct DeleteArgs {
    pub id: i64,

    /// The post's secret key.
    #[arg(long, env = "WAYFARE_POST_SECRET")]
    pub secret: Option<String>,

    /// Skip the interactive confirmation.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub yes: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LikeArgs {
    pub id: i64,
}

#[derive(Debug, Args, Clone)]
pub struct CommentArgs {
    pub id: i64,

    /// Comment text inline.
    #[arg(long)]
    pub text: Option<String>,

    /// Read the comment text from a file (takes precedence over --text).
    #[arg(long, value_name = "PATH")]
    pub text_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// Password (flag hidden to keep credentials out of shell history).
    #[arg(long, hide = true, env = "WAYFARE_PASSWORD")]
    pub password: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct WhoamiArgs {
    /// Re-validate the cached session against the auth service.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub remote: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ThemeArgs {
    /// Theme to apply; toggles when omitted.
    #[arg(value_enum)]
    pub theme: Option<ThemeArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortArg {
    CreatedAt,
    Like,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::CreatedAt => SortKey::CreatedAt,
            SortArg::Like => SortKey::Like,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    pub geocode: GeocodeSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct GeocodeSettings {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("WAYFARE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both
/// for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    backend: RawBackendSettings,
    geocode: RawGeocodeSettings,
    session: RawSessionSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBackendSettings {
    url: Option<String>,
    api_key: Option<String>,
    table: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGeocodeSettings {
    url: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(url) = overrides.backend_url.as_ref() {
            self.backend.url = Some(url.clone());
        }
        if let Some(key) = overrides.backend_api_key.as_ref() {
            self.backend.api_key = Some(key.clone());
        }
        if let Some(table) = overrides.backend_table.as_ref() {
            self.backend.table = Some(table.clone());
        }
        if let Some(file) = overrides.session_file.as_ref() {
            self.session.file = Some(file.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.geocode_url.as_ref() {
            self.geocode.url = Some(url.clone());
        }
        if let Some(key) = overrides.geocode_api_key.as_ref() {
            self.geocode.api_key = Some(key.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            backend,
            geocode,
            session,
            logging,
        } = raw;

        Ok(Self {
            backend: build_backend_settings(backend)?,
            geocode: build_geocode_settings(geocode)?,
            session: build_session_settings(session)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_backend_settings(backend: RawBackendSettings) -> Result<BackendSettings, LoadError> {
    let url = backend.url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });
    if let Some(url) = url.as_deref() {
        url::Url::parse(url)
            .map_err(|err| LoadError::invalid("backend.url", format!("failed to parse: {err}")))?;
    }

    let table = backend
        .table
        .unwrap_or_else(|| DEFAULT_POSTS_TABLE.to_string());
    if table.trim().is_empty() {
        return Err(LoadError::invalid("backend.table", "must not be empty"));
    }

    Ok(BackendSettings {
        url,
        api_key: backend.api_key,
        table,
    })
}

fn build_geocode_settings(geocode: RawGeocodeSettings) -> Result<GeocodeSettings, LoadError> {
    let url = geocode
        .url
        .unwrap_or_else(|| DEFAULT_GEOCODE_URL.to_string());
    url::Url::parse(&url)
        .map_err(|err| LoadError::invalid("geocode.url", format!("failed to parse: {err}")))?;

    Ok(GeocodeSettings {
        url,
        api_key: geocode.api_key,
    })
}

fn build_session_settings(session: RawSessionSettings) -> Result<SessionSettings, LoadError> {
    let file = session
        .file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
    if file.as_os_str().is_empty() {
        return Err(LoadError::invalid("session.file", "path must not be empty"));
    }
    Ok(SessionSettings { file })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_take_highest_precedence() {
        let mut raw = RawSettings::default();
        raw.backend.url = Some("https://file.example.com".to_string());
        raw.logging.level = Some("info".to_string());

        let overrides = GlobalOverrides {
            backend_url: Some("https://cli.example.com".to_string()),
            log_level: Some("debug".to_string()),
            ..GlobalOverrides::default()
        };

        raw.apply_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert_eq!(
            settings.backend.url.as_deref(),
            Some("https://cli.example.com")
        );
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    }

    #[test]
    fn posts_table_defaults_to_travel() {
        let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
        assert_eq!(settings.backend.table, "Travel");
    }

    #[test]
    fn invalid_backend_url_names_the_key() {
        let mut raw = RawSettings::default();
        raw.backend.url = Some("not a url".to_string());
        match Settings::from_raw(raw) {
            Err(LoadError::Invalid { key, .. }) => assert_eq!(key, "backend.url"),
            other => panic!("expected invalid backend.url, got {other:?}"),
        }
    }

    #[test]
    fn cli_json_logging_enforces_format() {
        let mut raw = RawSettings::default();
        let overrides = GlobalOverrides {
            log_json: Some(true),
            ..GlobalOverrides::default()
        };

        raw.apply_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert!(matches!(settings.logging.format, LogFormat::Json));
    }

    #[test]
    fn default_to_feed_command() {
        let args = CliArgs::parse_from(["wayfare"]);
        let command = args
            .command
            .unwrap_or(Command::Feed(FeedArgs::default()));
        assert!(matches!(command, Command::Feed(_)));
    }

    #[test]
    fn parse_feed_arguments() {
        let args = CliArgs::parse_from([
            "wayfare", "feed", "--search", "paris", "--type", "Cultural", "--sort", "like",
            "--content",
        ]);

        match args.command.expect("feed command") {
            Command::Feed(feed) => {
                assert_eq!(feed.search.as_deref(), Some("paris"));
                assert_eq!(feed.travel_type.as_deref(), Some("Cultural"));
                assert!(matches!(feed.sort, Some(SortArg::Like)));
                assert!(feed.content);
            }
            _ => panic!("wrong command parsed"),
        }
    }

    #[test]
    fn parse_create_arguments() {
        let args = CliArgs::parse_from([
            "wayfare",
            "create",
            "--title",
            "Sunset at Santorini",
            "--secret",
            "open-sesame",
            "--repost-of",
            "12",
            "--coords",
            "36.39,25.46",
        ]);

        match args.command.expect("create command") {
            Command::Create(create) => {
                assert_eq!(create.title, "Sunset at Santorini");
                assert_eq!(create.secret.as_deref(), Some("open-sesame"));
                assert_eq!(create.repost_of, Some(12));
                assert_eq!(create.coords.as_deref(), Some("36.39,25.46"));
            }
            _ => panic!("wrong command parsed"),
        }
    }

    #[test]
    fn parse_delete_arguments() {
        let args = CliArgs::parse_from(["wayfare", "delete", "7", "--secret", "k", "--yes"]);

        match args.command.expect("delete command") {
            Command::Delete(delete) => {
                assert_eq!(delete.id, 7);
                assert_eq!(delete.secret.as_deref(), Some("k"));
                assert!(delete.yes);
            }
            _ => panic!("wrong command parsed"),
        }
    }

    #[test]
    fn parse_theme_toggle() {
        let args = CliArgs::parse_from(["wayfare", "theme"]);
        match args.command.expect("theme command") {
            Command::Theme(theme) => assert!(theme.theme.is_none()),
            _ => panic!("wrong command parsed"),
        }
    }
}
