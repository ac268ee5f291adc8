use std::{env, time::Duration};

use clap::Parser;
use darkest_hour_core::{
    find_config_file, load_config, ConfigSource, Coordinate, DEFAULT_FLY_DURATION_MS,
    DEFAULT_FORECAST_URL, DEFAULT_GATEWAY_PORT, DEFAULT_REFRESH_DEBOUNCE_MS,
    DEFAULT_SEARCH_DEBOUNCE_MS, DEFAULT_SEARCH_URL,
};
use slog::{o, Drain, Level, Logger};

use crate::ViewportSettings;

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Darkest Hour observer - observing conditions for wherever the map is pointed"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $DARKEST_HOUR_OBSERVER_CONFIG, ./observer.toml,
    /// $XDG_CONFIG_HOME/darkest-hour/observer.toml, /etc/darkest-hour/observer.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "DARKEST_HOUR_OBSERVER_LEVEL")]
    pub level: Option<String>,

    /// Forecast provider endpoint (Open-Meteo compatible)
    #[arg(long, env = "DARKEST_HOUR_FORECAST_URL")]
    pub forecast_url: Option<String>,

    /// Place search endpoint (Nominatim compatible)
    #[arg(long, env = "DARKEST_HOUR_SEARCH_URL")]
    pub search_url: Option<String>,

    /// Reverse-IP location endpoint returning latitude/longitude JSON
    #[arg(long, env = "DARKEST_HOUR_GEO_URL")]
    pub geo_url: Option<String>,

    /// HTTP User-Agent header for provider requests
    #[arg(short, long, env = "DARKEST_HOUR_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Quiet window in milliseconds before conditions are refetched
    #[arg(long, env = "DARKEST_HOUR_REFRESH_DEBOUNCE_MS")]
    pub refresh_debounce_ms: Option<u64>,

    /// Quiet window in milliseconds before a search query is sent
    #[arg(long, env = "DARKEST_HOUR_SEARCH_DEBOUNCE_MS")]
    pub search_debounce_ms: Option<u64>,

    /// Animated move duration in milliseconds
    #[arg(long, env = "DARKEST_HOUR_FLY_DURATION_MS")]
    pub fly_duration_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, env = "DARKEST_HOUR_REQUEST_TIMEOUT")]
    pub request_timeout_secs: Option<u64>,

    /// Start here instead of looking up the location by IP
    #[arg(long, allow_hyphen_values = true, requires = "longitude")]
    pub latitude: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "latitude")]
    pub longitude: Option<f64>,
}

impl Cli {
    pub fn forecast_url(&self) -> String {
        self.forecast_url
            .clone()
            .unwrap_or_else(|| DEFAULT_FORECAST_URL.to_string())
    }

    pub fn search_url(&self) -> String {
        self.search_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string())
    }

    pub fn geo_url(&self) -> String {
        self.geo_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}/api/geo", DEFAULT_GATEWAY_PORT))
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("darkest-hour-observer/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(10))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(
            self.search_debounce_ms
                .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS),
        )
    }

    pub fn viewport_settings(&self) -> ViewportSettings {
        ViewportSettings {
            refresh_debounce: Duration::from_millis(
                self.refresh_debounce_ms
                    .unwrap_or(DEFAULT_REFRESH_DEBOUNCE_MS),
            ),
            fly_duration: Duration::from_millis(
                self.fly_duration_ms.unwrap_or(DEFAULT_FLY_DURATION_MS),
            ),
        }
    }

    /// Configured start location, if both halves are present and in range
    pub fn start_location(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinate::checked(lng, lat),
            _ => None,
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("DARKEST_HOUR_OBSERVER_CONFIG", "observer.toml")
    };

    let file_config: Cli = load_config(&source).unwrap_or_default();
    merge_config(cli_args, file_config)
}

/// CLI args (and their env vars) win over the config file
pub fn merge_config(cli_args: Cli, file_config: Cli) -> Cli {
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        forecast_url: cli_args.forecast_url.or(file_config.forecast_url),
        search_url: cli_args.search_url.or(file_config.search_url),
        geo_url: cli_args.geo_url.or(file_config.geo_url),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
        refresh_debounce_ms: cli_args
            .refresh_debounce_ms
            .or(file_config.refresh_debounce_ms),
        search_debounce_ms: cli_args
            .search_debounce_ms
            .or(file_config.search_debounce_ms),
        fly_duration_ms: cli_args.fly_duration_ms.or(file_config.fly_duration_ms),
        request_timeout_secs: cli_args
            .request_timeout_secs
            .or(file_config.request_timeout_secs),
        latitude: cli_args.latitude.or(file_config.latitude),
        longitude: cli_args.longitude.or(file_config.longitude),
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .map(|level| parse_level(&level))
        .unwrap_or(Level::Info);

    // Logs go to stderr so they do not interleave with the read-out on stdout
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}
