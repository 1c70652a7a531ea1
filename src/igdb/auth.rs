//! Twitch app-token exchange. IGDB authenticates with a client-credentials
//! bearer token; one token is fetched per run and reused for every request.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::util::env::env_req;

const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Client credentials for the token exchange. Built explicitly (or via
/// `from_env`) and handed in, so tests can substitute their own.
#[derive(Debug, Clone)]
pub struct TwitchCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl TwitchCredentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: env_req("TWITCH_CLIENT_ID")?,
            client_secret: env_req("TWITCH_CLIENT_SECRET")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TwitchTokenResponse {
    access_token: String,
}

/// Bearer token plus the client id IGDB expects alongside it on every request.
#[derive(Debug, Clone)]
pub struct AppToken {
    pub access_token: String,
    pub client_id: String,
}

/// Exchanges client credentials for an app token. Failure here is fatal to the
/// run; nothing can be queried without it.
pub async fn fetch_app_token(http: &Client, creds: &TwitchCredentials) -> Result<AppToken> {
    let response = http
        .post(TWITCH_TOKEN_URL)
        .query(&[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ])
        .send()
        .await
        .context("requesting Twitch OAuth token")?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(anyhow!(
            "twitch token request failed (status={}): {}",
            status,
            text
        ));
    }
    let token: TwitchTokenResponse = response.json().await?;
    Ok(AppToken {
        access_token: token.access_token,
        client_id: creds.client_id.clone(),
    })
}
