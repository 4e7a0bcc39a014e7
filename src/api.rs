use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::Config;
use crate::models::ContributionsResponse;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("username is required")]
    MissingUsername,
    #[error("could not find contribution data for user {0:?}")]
    NotFound(String),
    #[error("API request failed with status: {0}")]
    Status(StatusCode),
    #[error("no contribution data found for {0:?}")]
    Empty(String),
    #[error("request to contributions API failed")]
    Http(#[from] reqwest::Error),
}

pub struct ContributionsClient {
    http: reqwest::Client,
    base_url: String,
}

impl ContributionsClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    /// Every available year for `username`.
    pub async fn fetch_all(&self, username: &str) -> Result<ContributionsResponse, FetchError> {
        let result = self.fetch_inner(username).await;
        if let Err(e) = &result {
            error!("contributions fetch failed for {username:?}: {e}");
        }
        result
    }

    async fn fetch_inner(&self, username: &str) -> Result<ContributionsResponse, FetchError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(FetchError::MissingUsername);
        }

        let url = contributions_url(&self.base_url, username);
        debug!("GET {url}");
        let response = self.http.get(&url).send().await?;
        check_status(response.status(), username)?;

        let body: ContributionsResponse = response.json().await?;
        check_body(body, username)
    }
}

pub fn contributions_url(base_url: &str, username: &str) -> String {
    format!("{}/v4/{}?y=all", base_url.trim_end_matches('/'), username)
}

fn check_status(status: StatusCode, username: &str) -> Result<(), FetchError> {
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound(username.to_string()));
    }
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(())
}

fn check_body(
    body: ContributionsResponse,
    username: &str,
) -> Result<ContributionsResponse, FetchError> {
    if body.contributions.is_empty() {
        return Err(FetchError::Empty(username.to_string()));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_includes_all_years() {
        assert_eq!(
            contributions_url("https://example.test/", "octocat"),
            "https://example.test/v4/octocat?y=all"
        );
    }

    #[test]
    fn status_codes_map_to_errors() {
        assert!(check_status(StatusCode::OK, "a").is_ok());
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, "ghost"),
            Err(FetchError::NotFound(user)) if user == "ghost"
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY, "a"),
            Err(FetchError::Status(StatusCode::BAD_GATEWAY))
        ));
    }

    #[test]
    fn body_parses_and_rejects_empty_lists() {
        let raw = r#"{
            "total": {"2023": 5, "2024": 2},
            "contributions": [
                {"date": "2023-03-15", "count": 5, "level": 2},
                {"date": "2024-01-02", "count": 2, "level": 1}
            ]
        }"#;
        let body: ContributionsResponse = serde_json::from_str(raw).unwrap();
        let body = check_body(body, "octocat").unwrap();
        assert_eq!(body.contributions.len(), 2);
        assert_eq!(body.total.get("2023"), Some(&5));

        let empty: ContributionsResponse =
            serde_json::from_str(r#"{"total": {}, "contributions": []}"#).unwrap();
        assert!(matches!(check_body(empty, "octocat"), Err(FetchError::Empty(_))));
    }

    #[tokio::test]
    async fn blank_username_fails_before_any_request() {
        let client = ContributionsClient::new(&Config::default()).unwrap();
        assert!(matches!(
            client.fetch_all("   ").await,
            Err(FetchError::MissingUsername)
        ));
    }
}
