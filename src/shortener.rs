//! TinyURL client. Shortening is best-effort everywhere it is used; callers
//! fall back to the long URL on any failure.

use reqwest::Client;

const API_BASE: &str = "https://tinyurl.com";

#[derive(Clone)]
pub struct ShortenerClient {
    base_url: String,
    http: Client,
}

impl ShortenerClient {
    pub fn new() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            http: Client::new(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            http: Client::new(),
        }
    }

    /// Shorten a long URL. The API answers with the short URL as plain text.
    pub async fn shorten(&self, url: &str) -> Result<String, ShortenerError> {
        let resp = self
            .http
            .get(format!("{}/api-create.php", self.base_url))
            .query(&[("url", url)])
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(ShortenerError::Api(text));
        }

        let short = resp.text().await?.trim().to_string();
        if short.is_empty() {
            return Err(ShortenerError::Api("empty response".to_string()));
        }

        Ok(short)
    }
}

impl Default for ShortenerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum ShortenerError {
    Http(reqwest::Error),
    Api(String),
}

impl From<reqwest::Error> for ShortenerError {
    fn from(e: reqwest::Error) -> Self {
        ShortenerError::Http(e)
    }
}

impl std::fmt::Display for ShortenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShortenerError::Http(e) => write!(f, "HTTP error: {}", e),
            ShortenerError::Api(s) => write!(f, "shortener API error: {}", s),
        }
    }
}

impl std::error::Error for ShortenerError {}
