use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_API_URL: &str = "https://github-contributions-api.jogruber.de";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `CONTRIB_API_URL` and `CONTRIB_API_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("CONTRIB_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("CONTRIB_API_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("CONTRIB_API_TIMEOUT_SECS must be whole seconds, got {raw:?}"))?;
            anyhow::ensure!(secs > 0, "CONTRIB_API_TIMEOUT_SECS must be greater than zero");
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn overrides_are_trimmed() {
        let config = Config::from_lookup(lookup(&[
            ("CONTRIB_API_URL", "http://localhost:8080/"),
            ("CONTRIB_API_TIMEOUT_SECS", " 3 "),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        assert!(Config::from_lookup(lookup(&[("CONTRIB_API_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CONTRIB_API_TIMEOUT_SECS", "0")])).is_err());
    }
}
