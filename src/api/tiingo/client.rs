use chrono::{Duration, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{ApiError, ErrorResponse};
use crate::api::MarketData;
use crate::models::{HistoricalPoint, StockQuote, WatchlistStock};
use crate::utils::api_ratelimit::rate_limit_tiingo_api;

/// Tiingo API client for quotes, daily history and the watchlist
pub struct TiingoClient {
    http_client: HttpClient,
    api_token: String,
    base_url: String,
    watchlist_url: Option<String>,
    default_watchlist: Vec<WatchlistStock>,
    history_lookback_days: i64,
}

impl TiingoClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.tiingo.com";

    /// Create a new Tiingo API client
    pub fn new(api_token: String) -> Self {
        Self::with_base_url(api_token, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(api_token: String, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            watchlist_url: None,
            default_watchlist: Vec::new(),
            history_lookback_days: 5 * 365,
        }
    }

    /// Fetch the watchlist from `url` instead of serving the default list
    pub fn with_watchlist_url(mut self, url: Option<String>) -> Self {
        self.watchlist_url = url;
        self
    }

    /// Watchlist served when no watchlist endpoint is configured
    pub fn with_default_watchlist(mut self, watchlist: Vec<WatchlistStock>) -> Self {
        self.default_watchlist = watchlist;
        self
    }

    pub fn with_history_lookback_days(mut self, days: i64) -> Self {
        self.history_lookback_days = days;
        self
    }

    /// Create default headers with authorization
    fn create_headers(&self) -> Result<HeaderMap, String> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Token {}", self.api_token))
            .map_err(|e| format!("Failed to create auth header: {}", e))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    fn quote_url(&self, symbol: &str) -> String {
        format!("{}/iex/{}", self.base_url, symbol)
    }

    fn history_url(&self, symbol: &str, start_date: NaiveDate) -> String {
        format!(
            "{}/tiingo/daily/{}/prices?startDate={}",
            self.base_url,
            symbol,
            start_date.format("%Y-%m-%d")
        )
    }

    /// First date of the history window ending at `today`
    fn history_start(&self, today: NaiveDate) -> Result<NaiveDate, ApiError> {
        Duration::try_days(self.history_lookback_days)
            .and_then(|lookback| today.checked_sub_signed(lookback))
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "History lookback of {} days is out of range",
                    self.history_lookback_days
                ))
            })
    }

    /// Map a non-success status and its body to an [`ApiError`]
    fn error_from_status(status_code: u16, body_text: String) -> ApiError {
        let message = serde_json::from_str::<ErrorResponse>(&body_text)
            .ok()
            .and_then(|err| err.text().map(str::to_string))
            .unwrap_or(body_text);

        match status_code {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => {
                warn!("Tiingo rate limit hit: {}", message);
                ApiError::RateLimited(message)
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }

    /// GET `url` with auth headers and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str, with_auth: bool) -> Result<T, ApiError> {
        rate_limit_tiingo_api().await;

        let mut request = self.http_client.get(url);
        if with_auth {
            let headers = self.create_headers().map_err(ApiError::RequestError)?;
            request = request.headers(headers);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::error_from_status(status.as_u16(), body_text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}

impl MarketData for TiingoClient {
    /// GET /iex/{symbol}
    ///
    /// Returns the list of quote snapshots; callers use the first one.
    async fn fetch_stock_quote(&self, symbol: &str) -> Result<Vec<StockQuote>, ApiError> {
        debug!("Fetching quote for {}", symbol);
        self.get_json(&self.quote_url(symbol), true).await
    }

    /// GET /tiingo/daily/{symbol}/prices?startDate=...
    ///
    /// The start date is `history_lookback_days` before today, which bounds
    /// what the "all" timeframe can show.
    async fn fetch_historical_data(&self, symbol: &str) -> Result<Vec<HistoricalPoint>, ApiError> {
        let start_date = self.history_start(Utc::now().date_naive())?;
        debug!("Fetching history for {} since {}", symbol, start_date);
        self.get_json(&self.history_url(symbol, start_date), true).await
    }

    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistStock>, ApiError> {
        match &self.watchlist_url {
            Some(url) => self.get_json(url, false).await,
            None => Ok(self.default_watchlist.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_urls() {
        let client = TiingoClient::with_base_url("key".into(), "http://localhost:9999/".into());
        assert_eq!(client.quote_url("AAPL"), "http://localhost:9999/iex/AAPL");
        assert_eq!(
            client.history_url("MSFT", NaiveDate::from_ymd_opt(2020, 1, 5).unwrap()),
            "http://localhost:9999/tiingo/daily/MSFT/prices?startDate=2020-01-05"
        );
    }

    #[test]
    fn auth_header_uses_token_scheme() {
        let client = TiingoClient::new("abc123".into());
        let headers = client.create_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Token abc123");
    }

    #[test]
    fn maps_status_codes_to_errors() {
        let err = TiingoClient::error_from_status(404, r#"{"detail":"Ticker 'ZZZZ' not found"}"#.into());
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Ticker 'ZZZZ' not found"));

        let err = TiingoClient::error_from_status(401, "nope".into());
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "nope"));

        assert!(matches!(
            TiingoClient::error_from_status(503, String::new()),
            ApiError::ServerError(503, _)
        ));
        assert!(matches!(
            TiingoClient::error_from_status(418, String::new()),
            ApiError::HttpError(418, _)
        ));
    }

    #[test]
    fn history_start_is_checked() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let client = TiingoClient::new("key".into()).with_history_lookback_days(28);
        assert_eq!(client.history_start(today).unwrap(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());

        let client = client.with_history_lookback_days(100_000_000);
        assert!(matches!(client.history_start(today), Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn oversized_lookback_fails_without_request() {
        let client = TiingoClient::with_base_url("key".into(), "http://127.0.0.1:9".into())
            .with_history_lookback_days(i64::MAX);
        let err = client.fetch_historical_data("AAPL").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn serves_default_watchlist_without_endpoint() {
        let client = TiingoClient::new("key".into())
            .with_default_watchlist(vec![WatchlistStock::new("AAPL", "Apple Inc.")]);
        let watchlist = client.fetch_watchlist().await.unwrap();
        assert_eq!(watchlist, vec![WatchlistStock::new("AAPL", "Apple Inc.")]);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let client = TiingoClient::with_base_url("key".into(), "http://127.0.0.1:9".into());
        let err = client.fetch_stock_quote("AAPL").await.unwrap_err();
        assert!(matches!(err, ApiError::RequestError(_)));
    }
}
