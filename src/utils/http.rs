// src/utils/http.rs
use std::time::Duration;
use anyhow::{Result, Context};
use reqwest::{Client, RequestBuilder, header};
use serde::Serialize;
use tracing::debug;

/// HTTP client for the remote issue tracker
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client. Every request is bounded by `timeout_secs`.
    pub fn new(user_agent: Option<String>, timeout_secs: Option<u64>) -> Result<Self> {
        let user_agent = user_agent.unwrap_or_else(|| format!("openice/{}", env!("CARGO_PKG_VERSION")));
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(30));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, user_agent })
    }

    /// Prepare a POST with a JSON body and optional `token` authorization
    pub fn post_json<T: Serialize>(&self, url: &str, data: &T, token: Option<&str>) -> RequestBuilder {
        debug!("POST {}", url);

        let request = self.client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(data);

        match token {
            Some(token) => request.header(header::AUTHORIZATION, format!("token {}", token)),
            None => request,
        }
    }

    /// Get the user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
