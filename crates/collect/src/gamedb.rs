//! Game-database provider client.
//!
//! Authenticates with an OAuth client-credentials exchange and speaks the
//! provider's query language (`fields …; search "…"; where …;`) against the
//! `games` and `platforms` endpoints.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use crate::CollectError;
use crate::limit::Pacer;

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const BASE_URL: &str = "https://api.igdb.com/v4";

/// Refresh the cached token this long before its reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

pub struct GameDbClient {
    client_id: String,
    client_secret: String,
    client: reqwest::Client,
    pacer: Pacer,
    token: Option<CachedToken>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn needs_refresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

impl GameDbClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            client: reqwest::Client::new(),
            pacer: Pacer::default(),
            token: None,
        }
    }

    /// Return a bearer token, exchanging client credentials when the cache
    /// is empty or close to expiry. Validity is checked on every call.
    async fn ensure_token(&mut self) -> Result<String, CollectError> {
        if let Some(token) = &self.token {
            if !token.needs_refresh() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("requesting game-database access token");
        let resp = self
            .client
            .post(TOKEN_URL)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| CollectError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CollectError::Api(format!(
                "token endpoint returned {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| CollectError::Decode(format!("token response: {e}")))?;

        let access_token = body["access_token"]
            .as_str()
            .ok_or_else(|| CollectError::Decode("token response missing access_token".into()))?
            .to_string();
        let expires_in = body["expires_in"].as_u64().unwrap_or(3600);

        self.token = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        });

        Ok(access_token)
    }

    async fn post_query(
        &mut self,
        endpoint: &str,
        body: String,
    ) -> Result<Vec<Value>, CollectError> {
        let token = self.ensure_token().await?;

        self.pacer.wait().await;

        let url = format!("{BASE_URL}/{endpoint}");
        debug!(url = %url, body = %body, "game-database request");

        let resp = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Client-ID", self.client_id.as_str())
            .header("Authorization", format!("Bearer {token}"))
            .body(body)
            .send()
            .await
            .map_err(|e| CollectError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CollectError::Api(format!(
                "{endpoint} returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| CollectError::Decode(format!("{endpoint} response: {e}")))
    }

    /// Query the games endpoint. Failures are logged and yield `None`; the
    /// pipeline is re-run rather than retried.
    pub async fn games(&mut self, query: &GameQuery) -> Option<Vec<Value>> {
        match self.post_query("games", query.body()).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(error = %e, "games query failed");
                None
            }
        }
    }

    /// Fetch one game by its provider id.
    pub async fn game_by_id(&mut self, id: u64, fields: &str) -> Option<Vec<Value>> {
        let body = format!("fields {fields}; where id={id};");
        match self.post_query("games", body).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(id, error = %e, "game lookup failed");
                None
            }
        }
    }

    /// Search the platforms endpoint.
    pub async fn platforms(&mut self, search: &str, fields: &str) -> Option<Vec<Value>> {
        let body = format!("fields {fields}; search \"{search}\";");
        match self.post_query("platforms", body).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(search, error = %e, "platform search failed");
                None
            }
        }
    }

    /// Resolve a platform name to its id. Yielding no rows is a lookup
    /// failure the caller must guard against.
    pub async fn resolve_platform(&mut self, name: &str) -> Result<u64, CollectError> {
        let rows = self.platforms(name, "id,name").await.unwrap_or_default();

        rows.first()
            .and_then(|row| row["id"].as_u64())
            .ok_or_else(|| CollectError::Lookup(format!("no platform matches {name:?}")))
    }
}

/// Builder for the provider's query-language request body.
#[derive(Debug, Clone)]
pub struct GameQuery {
    name: String,
    fields: String,
    exclude: Option<String>,
    platform: Option<u64>,
    year: Option<YearFilter>,
}

impl GameQuery {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: "*".to_string(),
            exclude: None,
            platform: None,
            year: None,
        }
    }

    pub fn fields(mut self, fields: &str) -> Self {
        self.fields = fields.to_string();
        self
    }

    pub fn exclude(mut self, exclude: &str) -> Self {
        self.exclude = Some(exclude.to_string());
        self
    }

    pub fn platform(mut self, platform_id: u64) -> Self {
        self.platform = Some(platform_id);
        self
    }

    pub fn year(mut self, year: YearFilter) -> Self {
        self.year = Some(year);
        self
    }

    /// Render the `fields …; search "…"; [exclude …;] [where …;]` body.
    pub fn body(&self) -> String {
        let mut body = format!("fields {}; search \"{}\";", self.fields, self.name);

        if let Some(exclude) = &self.exclude {
            body.push_str(&format!(" exclude {exclude};"));
        }

        let mut clauses = Vec::new();
        if let Some(platform) = self.platform {
            clauses.push(format!("release_dates.platform={platform}"));
        }
        match self.year {
            Some(YearFilter::Exact(year)) => clauses.push(format!("release_dates.y={year}")),
            Some(YearFilter::Range(from, to)) => {
                clauses.push(format!("release_dates.y>={from}"));
                clauses.push(format!("release_dates.y<={to}"));
            }
            None => {}
        }
        if !clauses.is_empty() {
            body.push_str(&format!(" where {};", clauses.join(" & ")));
        }

        body
    }
}

/// A release-year restriction: a single year or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearFilter {
    Exact(u16),
    Range(u16, u16),
}

impl YearFilter {
    /// Parse `"1997"` or `"1995-1997"`.
    pub fn parse(raw: &str) -> Result<Self, CollectError> {
        let bad = |raw: &str| CollectError::Query(format!("bad year filter {raw:?}"));

        match raw.split_once('-') {
            Some((from, to)) => {
                let from = from.trim().parse().map_err(|_| bad(raw))?;
                let to = to.trim().parse().map_err(|_| bad(raw))?;
                Ok(Self::Range(from, to))
            }
            None => raw.trim().parse().map(Self::Exact).map_err(|_| bad(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_with_search_only() {
        let query = GameQuery::new("OverBlood");
        assert_eq!(query.body(), "fields *; search \"OverBlood\";");
    }

    #[test]
    fn body_with_fields_and_exclude() {
        let query = GameQuery::new("Rayman")
            .fields("id,name,platforms.*")
            .exclude("platforms.websites");
        assert_eq!(
            query.body(),
            "fields id,name,platforms.*; search \"Rayman\"; exclude platforms.websites;"
        );
    }

    #[test]
    fn body_with_platform_and_exact_year() {
        let query = GameQuery::new("Metal Gear Solid 3: Snake Eater")
            .platform(8)
            .year(YearFilter::Exact(2004));
        assert_eq!(
            query.body(),
            "fields *; search \"Metal Gear Solid 3: Snake Eater\"; \
             where release_dates.platform=8 & release_dates.y=2004;"
        );
    }

    #[test]
    fn body_with_year_range() {
        let query = GameQuery::new("Rayman").year(YearFilter::Range(1995, 1997));
        assert_eq!(
            query.body(),
            "fields *; search \"Rayman\"; where release_dates.y>=1995 & release_dates.y<=1997;"
        );
    }

    #[test]
    fn body_with_platform_only() {
        let query = GameQuery::new("Goldeneye 007").platform(4);
        assert_eq!(
            query.body(),
            "fields *; search \"Goldeneye 007\"; where release_dates.platform=4;"
        );
    }

    #[test]
    fn year_filter_parses_single_and_range() {
        assert_eq!(YearFilter::parse("1997").unwrap(), YearFilter::Exact(1997));
        assert_eq!(
            YearFilter::parse("1995-1997").unwrap(),
            YearFilter::Range(1995, 1997)
        );
        assert!(YearFilter::parse("soon").is_err());
        assert!(YearFilter::parse("1995-never").is_err());
    }

    #[test]
    fn token_refresh_window() {
        let expired = CachedToken {
            access_token: "t".to_string(),
            expires_at: Instant::now(),
        };
        assert!(expired.needs_refresh());

        let fresh = CachedToken {
            access_token: "t".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        };
        assert!(!fresh.needs_refresh());

        // inside the refresh margin counts as expiring
        let expiring = CachedToken {
            access_token: "t".to_string(),
            expires_at: Instant::now() + EXPIRY_MARGIN / 2,
        };
        assert!(expiring.needs_refresh());
    }
}
