use async_trait::async_trait;
use huddle_error::{HuddleResult, SleeperError, SleeperErrorKind};
use huddle_interface::{
    LeagueInfo, LeagueRoster, LeagueUser, MatchupEntry, PlayerDirectory, SportsDataSource,
    Transaction, validate_week,
};
use huddle_rate_limit::{EndpointConfig, HuddleConfig, MinIntervalLimiter, RetryPolicy};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Client for one Sleeper league.
#[derive(Debug, Clone)]
pub struct SleeperClient {
    http: Client,
    base_url: String,
    league_id: String,
    timeout: Duration,
    limiter: MinIntervalLimiter,
    retry: RetryPolicy,
    players: Arc<OnceCell<Arc<PlayerDirectory>>>,
}

impl SleeperClient {
    /// Creates a client for `league_id` from endpoint settings.
    ///
    /// # Errors
    ///
    /// Returns `MissingLeagueId` for a blank id, or a request error if the
    /// HTTP client cannot be built.
    #[instrument(skip(endpoint), fields(url = %endpoint.base_url))]
    pub fn new(league_id: &str, endpoint: &EndpointConfig) -> Result<Self, SleeperError> {
        let league_id = league_id.trim();
        if league_id.is_empty() {
            return Err(SleeperError::new(SleeperErrorKind::MissingLeagueId));
        }

        let http = Client::builder().gzip(true).build().map_err(|e| {
            SleeperError::new(SleeperErrorKind::Request {
                path: endpoint.base_url.clone(),
                message: format!("Failed to build HTTP client: {}", e),
                connection: false,
            })
        })?;

        Ok(Self {
            http,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            league_id: league_id.to_string(),
            timeout: Duration::from_secs(endpoint.timeout_secs),
            limiter: MinIntervalLimiter::from_millis(endpoint.min_interval_ms),
            retry: endpoint.retry,
            players: Arc::new(OnceCell::new()),
        })
    }

    /// Creates a client for the configured league.
    ///
    /// # Errors
    ///
    /// Returns `MissingLeagueId` when no league is configured.
    pub fn from_config(config: &HuddleConfig) -> HuddleResult<Self> {
        let league_id = config
            .league_id
            .as_deref()
            .ok_or_else(|| SleeperError::new(SleeperErrorKind::MissingLeagueId))?;
        Ok(Self::new(league_id, &config.sleeper)?)
    }

    /// League this client reads.
    pub fn league_id(&self) -> &str {
        &self.league_id
    }

    fn league_path(&self, suffix: &str) -> String {
        format!("/league/{}{}", self.league_id, suffix)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SleeperError> {
        self.retry
            .run(path, || self.get_once(path))
            .await
    }

    #[instrument(skip(self))]
    async fn get_once<T: DeserializeOwned>(&self, path: &str) -> Result<T, SleeperError> {
        self.limiter.acquire().await;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(path, status, &body));
        }

        let bytes = response.bytes().await.map_err(|e| transport_error(path, e))?;
        decode(path, &bytes)
    }
}

/// Maps a non-success status to `NotFound` (404) or `Status`.
fn status_error(path: &str, status: StatusCode, body: &str) -> SleeperError {
    if status == StatusCode::NOT_FOUND {
        return SleeperError::new(SleeperErrorKind::NotFound(path.to_string()));
    }
    warn!(path, status = %status, "Sleeper request rejected");
    SleeperError::new(SleeperErrorKind::Status {
        status_code: status.as_u16(),
        path: path.to_string(),
        message: body.chars().take(300).collect(),
    })
}

fn transport_error(path: &str, e: reqwest::Error) -> SleeperError {
    SleeperError::new(SleeperErrorKind::Request {
        path: path.to_string(),
        message: e.to_string(),
        connection: e.is_connect() || e.is_timeout() || e.is_request() || e.is_body(),
    })
}

/// Decodes a body; a JSON `null` (unknown league or week) is not found.
fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, SleeperError> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| {
        SleeperError::new(SleeperErrorKind::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    })?;
    if value.is_null() {
        return Err(SleeperError::new(SleeperErrorKind::NotFound(path.to_string())));
    }
    serde_json::from_value(value).map_err(|e| {
        SleeperError::new(SleeperErrorKind::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    })
}

#[async_trait]
impl SportsDataSource for SleeperClient {
    async fn league(&self) -> HuddleResult<LeagueInfo> {
        Ok(self.get_json(&self.league_path("")).await?)
    }

    async fn users(&self) -> HuddleResult<Vec<LeagueUser>> {
        Ok(self.get_json(&self.league_path("/users")).await?)
    }

    async fn rosters(&self) -> HuddleResult<Vec<LeagueRoster>> {
        Ok(self.get_json(&self.league_path("/rosters")).await?)
    }

    async fn matchups(&self, week: u32) -> HuddleResult<Vec<MatchupEntry>> {
        let week = validate_week(week)?;
        Ok(self
            .get_json(&self.league_path(&format!("/matchups/{}", week)))
            .await?)
    }

    async fn transactions(&self, week: u32) -> HuddleResult<Vec<Transaction>> {
        let week = validate_week(week)?;
        Ok(self
            .get_json(&self.league_path(&format!("/transactions/{}", week)))
            .await?)
    }

    async fn players(&self) -> HuddleResult<Arc<PlayerDirectory>> {
        let players = self
            .players
            .get_or_try_init(|| async {
                info!("Fetching NFL player database");
                let directory: PlayerDirectory = self.get_json("/players/nfl").await?;
                debug!(players = directory.len(), "Player database loaded");
                Ok::<_, SleeperError>(Arc::new(directory))
            })
            .await?;
        Ok(Arc::clone(players))
    }
}
