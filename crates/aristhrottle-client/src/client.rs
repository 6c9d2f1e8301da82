//! [`ApiClient`] — async HTTP client for the Aristhrottle JSON API.

use std::time::Duration;

use aristhrottle_core::{
  api::{
    EngagementApi, FeedPage, FeedQuery, LeaderboardPage, LeaderboardQuery,
    PAGE_SIZE, RelatedTag,
  },
  engagement::Receipt,
  meme::{Meme, MemeId, MemeRecord, UserId},
  milestones::{RewardSummary, RewardTrack},
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
  ClientError, Result,
  wire::{
    CooccurrenceResponse, DetailResponse, EngageBody, EngagementResponse,
    ErrorBody, LeaderboardResponse, ListResponse, RewardsResponse, VoteBody,
  },
};

/// Request timeout used unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token attached to every request when set.
  pub token:    Option<String>,
  pub timeout:  Duration,
}

impl ApiConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), token: None, timeout: DEFAULT_TIMEOUT }
  }
}

/// Async HTTP client for the Aristhrottle REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(ClientError::Build)?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &ApiConfig { &self.config }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, self.url(path));
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send `req` and return the body of a successful response.
  pub(crate) async fn send(
    &self,
    method: Method,
    path: &str,
    req: RequestBuilder,
  ) -> Result<Vec<u8>> {
    let transport = |source| ClientError::Transport {
      method: method.clone(),
      path: path.to_owned(),
      source,
    };

    let resp = req.send().await.map_err(transport)?;
    let status = resp.status();
    let body = resp.bytes().await.map_err(transport)?;

    if !status.is_success() {
      let message = ErrorBody::parse(&body);
      debug!(%method, path, status = status.as_u16(), %message, "request rejected");
      return Err(ClientError::Status {
        method,
        path: path.to_owned(),
        status: status.as_u16(),
        message,
      });
    }
    Ok(body.to_vec())
  }

  fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
      .map_err(|source| ClientError::Decode { path: path.to_owned(), source })
  }

  // ── Engagement helpers ────────────────────────────────────────────────────

  async fn engage(
    &self,
    path: &str,
    meme: &MemeId,
    viewer: &UserId,
  ) -> Result<EngagementResponse> {
    let body = EngageBody { meme_id: meme.as_str(), user_id: viewer.as_str() };
    let req = self.request(Method::POST, path).json(&body);
    let bytes = self.send(Method::POST, path, req).await?;
    EngagementResponse::parse(&bytes)
      .map_err(|source| ClientError::Decode { path: path.to_owned(), source })
  }
}

impl EngagementApi for ApiClient {
  type Error = ClientError;

  /// `GET /api/meme?offset=<n>[&userId=][&name=][&created_by=]`
  async fn list_memes<'a>(
    &'a self,
    query: &'a FeedQuery,
    viewer: Option<&'a UserId>,
  ) -> Result<FeedPage> {
    let mut req = self
      .request(Method::GET, "/meme")
      .query(&[("offset", query.offset().to_string())]);
    if let Some(viewer) = viewer {
      req = req.query(&[("userId", viewer.as_str())]);
    }
    if let Some(name) = &query.name {
      req = req.query(&[("name", name.as_str())]);
    }
    if let Some(creator) = &query.created_by {
      req = req.query(&[("created_by", creator.as_str())]);
    }

    let body = self.send(Method::GET, "/meme", req).await?;
    let list: ListResponse = Self::decode("/meme", &body)?;
    let (memes, total) = list.into_memes(viewer);
    Ok(FeedPage { memes, total })
  }

  /// `GET /api/meme?id=<id>`
  async fn get_meme<'a>(
    &'a self,
    id: &'a MemeId,
    viewer: Option<&'a UserId>,
  ) -> Result<Option<Meme>> {
    let mut req = self.request(Method::GET, "/meme").query(&[("id", id.as_str())]);
    if let Some(viewer) = viewer {
      req = req.query(&[("userId", viewer.as_str())]);
    }

    let body = match self.send(Method::GET, "/meme", req).await {
      Ok(body) => body,
      Err(ClientError::Status { status: 404, .. }) => return Ok(None),
      Err(e) => return Err(e),
    };
    let detail: DetailResponse = Self::decode("/meme", &body)?;
    match detail.meme {
      Some(value) if !value.is_null() => {
        Ok(Some(MemeRecord::from_value(value)?.into_meme(viewer)?))
      }
      _ => Ok(None),
    }
  }

  /// `GET /api/tags/cooccurrence?tagId=<id>&limit=<n>`
  async fn related_tags<'a>(
    &'a self,
    tag_id: &'a str,
    limit: usize,
  ) -> Result<Vec<RelatedTag>> {
    let path = "/tags/cooccurrence";
    let req = self
      .request(Method::GET, path)
      .query(&[("tagId", tag_id.to_owned()), ("limit", limit.to_string())]);
    let body = self.send(Method::GET, path, req).await?;
    let resp: CooccurrenceResponse = Self::decode(path, &body)?;
    Ok(resp.cooccurrences)
  }

  /// `GET /api/leaderboard?offset=<n>&daily=<bool>`
  async fn list_leaderboard<'a>(
    &'a self,
    query: &'a LeaderboardQuery,
  ) -> Result<LeaderboardPage> {
    let path = "/leaderboard";
    let req = self.request(Method::GET, path).query(&[
      ("offset", query.offset().to_string()),
      ("daily", query.daily.to_string()),
    ]);
    let body = self.send(Method::GET, path, req).await?;
    let resp: LeaderboardResponse = Self::decode(path, &body)?;
    let first_rank = (query.offset() - PAGE_SIZE) as u64 + 1;
    Ok(resp.into_page(first_rank))
  }

  /// `GET /api/rewards/votes?userId=` or `GET /api/rewards/upload?userId=`
  async fn rewards<'a>(
    &'a self,
    track: RewardTrack,
    viewer: &'a UserId,
  ) -> Result<RewardSummary> {
    let path = match track {
      RewardTrack::Votes => "/rewards/votes",
      RewardTrack::Uploads => "/rewards/upload",
    };
    let req = self
      .request(Method::GET, path)
      .query(&[("userId", viewer.as_str())]);
    let body = self.send(Method::GET, path, req).await?;
    let resp: RewardsResponse = Self::decode(path, &body)?;
    Ok(resp.into_summary(track))
  }

  /// `POST /api/vote` to cast, `DELETE /api/vote` to retract.
  async fn toggle_vote<'a>(
    &'a self,
    meme: &'a MemeId,
    viewer: &'a UserId,
    cast: bool,
  ) -> Result<Receipt> {
    let method = if cast { Method::POST } else { Method::DELETE };
    let body = VoteBody { vote_to: meme.as_str(), vote_by: viewer.as_str() };
    let req = self.request(method.clone(), "/vote").json(&body);
    self.send(method, "/vote", req).await?;
    Ok(Receipt { count: None, active: Some(cast) })
  }

  /// `POST /api/bookmark`
  async fn toggle_bookmark<'a>(
    &'a self,
    meme: &'a MemeId,
    viewer: &'a UserId,
  ) -> Result<Receipt> {
    Ok(self.engage("/bookmark", meme, viewer).await?.bookmark_receipt())
  }

  /// `POST /api/share`
  async fn record_share<'a>(
    &'a self,
    meme: &'a MemeId,
    viewer: &'a UserId,
  ) -> Result<Receipt> {
    Ok(self.engage("/share", meme, viewer).await?.share_receipt())
  }
}
