use anyhow::Context as _;
use serde::Deserialize;
use url::Url;

/// Environment variable naming the YAML config file for the demo binary.
pub const CONFIG_ENV: &str = "COURIER_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub requests: Vec<RequestConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Plain `http://` URL to fetch.
    pub url: String,
    /// Cancel the request this many milliseconds after issuing it.
    #[serde(default)]
    pub cancel_after_ms: Option<u64>,
}

impl Config {
    /// Load from the file named by `COURIER_CONFIG`, falling back to a
    /// single default request when the variable is unset.
    pub fn load() -> anyhow::Result<Config> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {path}"))?;
                let config = serde_yaml::from_str(&text)
                    .with_context(|| format!("failed to parse config file {path}"))?;
                Ok(config)
            }
            Err(_) => Ok(Config {
                requests: vec![RequestConfig {
                    url: "http://example.com/".to_string(),
                    cancel_after_ms: None,
                }],
            }),
        }
    }
}

/// Split a plain http URL into the (host, port, path) triple a request
/// needs. The port defaults to 80 and the path keeps any query string.
pub fn split_url(raw: &str) -> anyhow::Result<(String, u16, String)> {
    let parsed = Url::parse(raw).with_context(|| format!("invalid URL {raw}"))?;
    anyhow::ensure!(
        parsed.scheme() == "http",
        "only plain http URLs are supported, got {raw}"
    );
    let host = parsed
        .host_str()
        .with_context(|| format!("URL has no host: {raw}"))?
        .to_string();
    let port = parsed.port().unwrap_or(80);
    let path = match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_string(),
    };
    Ok((host, port, path))
}
