//! Environment-backed configuration, loaded once at startup.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address for the REST server.
    pub addr: SocketAddr,
    /// Simulated store latency; zero disables it.
    pub latency: Duration,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    /// Seed the demo dataset at startup.
    pub seed_demo: bool,
}

impl Config {
    /// Read `QUICKDESK_*` variables, falling back to development
    /// defaults. Unparseable values fall back rather than abort.
    pub fn from_env() -> Self {
        let addr = env::var("QUICKDESK_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
        let latency = env::var("QUICKDESK_LATENCY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_millis(300), Duration::from_millis);
        let jwt_secret = env::var("QUICKDESK_JWT_SECRET")
            .unwrap_or_else(|_| "quickdesk-dev-secret".to_string());
        let seed_demo = env::var("QUICKDESK_SEED_DEMO")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            addr,
            latency,
            jwt_secret,
            seed_demo,
        }
    }
}
