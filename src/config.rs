use crate::domain::geofence::Geofence;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Fence used until an admin writes the first geofence_config row.
    pub default_geofence: Geofence,

    /// Geofence enforcement is selectable per attempt type.
    pub geofence_on_check_in: bool,
    pub geofence_on_check_out: bool,
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env_parse("ACCESS_TOKEN_TTL", 900), // 15 min
            refresh_token_ttl: env_parse("REFRESH_TOKEN_TTL", 604_800), // 7 days

            rate_login_per_min: env_parse("RATE_LOGIN_PER_MIN", 60),
            rate_register_per_min: env_parse("RATE_REGISTER_PER_MIN", 30),
            rate_refresh_per_min: env_parse("RATE_REFRESH_PER_MIN", 30),
            rate_protected_per_min: env_parse("RATE_PROTECTED_PER_MIN", 1000),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            default_geofence: Geofence {
                latitude: env_parse("GEOFENCE_DEFAULT_LAT", 28.7041),
                longitude: env_parse("GEOFENCE_DEFAULT_LON", 77.1025),
                radius_m: env_parse("GEOFENCE_DEFAULT_RADIUS_M", 100.0),
            },

            geofence_on_check_in: env_parse("GEOFENCE_ON_CHECK_IN", true),
            geofence_on_check_out: env_parse("GEOFENCE_ON_CHECK_OUT", false),
        }
    }
}
