//! User agent handling for HTTP requests.

pub const USER_AGENT: &str = concat!("gazette-harvest/", env!("CARGO_PKG_VERSION"), " (archival)");

/// Browser user agents for sites that turn away unknown clients.
const IMPERSONATE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

fn random_user_agent() -> &'static str {
    let idx = uuid::Uuid::new_v4().as_bytes()[0] as usize;
    IMPERSONATE_USER_AGENTS[idx % IMPERSONATE_USER_AGENTS.len()]
}

/// Resolve user agent from config value.
/// - None => default gazette-harvest user agent
/// - "impersonate" => browser user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None => USER_AGENT.to_string(),
        Some("impersonate") => random_user_agent().to_string(),
        Some(custom) => custom.to_string(),
    }
}
