//! Darkest Hour Core Library
//!
//! Shared pieces for the observer and gateway services:
//! - Configuration loading (XDG-compliant)
//! - The `Coordinate` value type
//! - Default timings and endpoints

mod config;
mod coordinate;

pub use config::{find_config_file, load_config, parse_config, ConfigSource};
pub use coordinate::Coordinate;

/// Application name used for XDG paths
pub const APP_NAME: &str = "darkest-hour";

/// Default gateway port
pub const DEFAULT_GATEWAY_PORT: u16 = 9810;

/// Quiet window before conditions are refetched after the map settles
pub const DEFAULT_REFRESH_DEBOUNCE_MS: u64 = 1000;

/// Quiet window before a typed search query is sent
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Animated move duration, also the settle fallback timeout
pub const DEFAULT_FLY_DURATION_MS: u64 = 2000;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Map center before any location is known, matching the basemap's initial view
pub const DEFAULT_MAP_CENTER: Coordinate = Coordinate::new(0.0, 20.0);
