use std::{env, net::SocketAddr, time::Duration};

use anyhow::Context;

use clap::Parser;
use darkest_hour_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_FORECAST_URL, DEFAULT_GATEWAY_PORT,
    DEFAULT_SEARCH_URL,
};
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use time::{macros::format_description, OffsetDateTime};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Darkest Hour gateway - observing conditions, place search and geolocation over HTTP"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $DARKEST_HOUR_GATEWAY_CONFIG, ./gateway.toml,
    /// $XDG_CONFIG_HOME/darkest-hour/gateway.toml, /etc/darkest-hour/gateway.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "DARKEST_HOUR_GATEWAY_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "DARKEST_HOUR_GATEWAY_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "DARKEST_HOUR_GATEWAY_PORT")]
    pub port: Option<String>,

    /// Forecast provider endpoint (Open-Meteo compatible)
    #[arg(long, env = "DARKEST_HOUR_FORECAST_URL")]
    pub forecast_url: Option<String>,

    /// Place search endpoint (Nominatim compatible)
    #[arg(long, env = "DARKEST_HOUR_SEARCH_URL")]
    pub search_url: Option<String>,

    /// HTTP User-Agent header for provider requests
    #[arg(short, long, env = "DARKEST_HOUR_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "DARKEST_HOUR_REQUEST_TIMEOUT")]
    pub request_timeout_secs: Option<u64>,

    /// Answer /api/geo with a fixed development location instead of reading headers
    #[arg(
        long,
        env = "DARKEST_HOUR_DEV_GEO",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub dev_geo: Option<bool>,
}

impl Cli {
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_GATEWAY_PORT.to_string())
    }

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

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("darkest-hour-gateway/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(10))
    }

    pub fn dev_geo(&self) -> bool {
        self.dev_geo.unwrap_or(false)
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host(), self.port());
        addr.parse()
            .with_context(|| format!("invalid listen address {:?}", addr))
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("DARKEST_HOUR_GATEWAY_CONFIG", "gateway.toml")
    };

    if let Some(path) = source.path() {
        log::info!("Loading config from: {}", path.display());
    }

    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        domain: cli_args.domain.or(file_config.domain),
        port: cli_args.port.or(file_config.port),
        forecast_url: cli_args.forecast_url.or(file_config.forecast_url),
        search_url: cli_args.search_url.or(file_config.search_url),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
        request_timeout_secs: cli_args
            .request_timeout_secs
            .or(file_config.request_timeout_secs),
        dev_geo: cli_args.dev_geo.or(file_config.dev_geo),
    }
}

/// `--level`, then `RUST_LOG`, then info; unknown names fall back to info
pub fn get_log_level(cli: &Cli) -> LevelFilter {
    cli.level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .and_then(|level| level.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Coloured `HH:MM:SS.mmm LEVEL target: message` lines on stdout
///
/// Dependencies stay at warn unless the gateway itself is below that.
pub fn setup_logger(level: LevelFilter) -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .debug(Color::Cyan)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);
    let clock = format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

    Dispatch::new()
        .format(move |out, message, record| {
            let now = OffsetDateTime::now_utc().format(clock).unwrap_or_default();
            out.finish(format_args!(
                "{} {:5} {}: {}",
                now,
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level.min(LevelFilter::Warn))
        .level_for("gateway", level)
        .level_for("observer", level)
        .level_for("http", level)
        .chain(std::io::stdout())
}
