use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::media::{ApiError, Episode, Genre, MediaId, SeriesDetail};
use crate::settings::AppSettings;

const CACHE_TTL_SECONDS: u64 = 300;
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

pub fn url_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                result.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    result
}

/// Builds `path?k=v&...` with every value percent-encoded.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, url_encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

/// The one upstream contract the catalog depends on: a relative TMDB path
/// (with query) in, a parsed JSON body out.
#[async_trait]
pub trait TmdbFetch: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<serde_json::Value, ApiError>;
}

/// Decodes the `results` array of a list response. Entries that do not fit
/// `T` are skipped instead of failing the page.
pub fn parse_results<T: DeserializeOwned>(body: serde_json::Value) -> Result<Vec<T>, ApiError> {
    let serde_json::Value::Object(mut body) = body else {
        return Err(ApiError::Parse(String::from("response is not an object")));
    };
    let Some(serde_json::Value::Array(results)) = body.remove("results") else {
        return Err(ApiError::Parse(String::from("response has no results array")));
    };

    Ok(results
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<T>(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("skipping malformed result entry: {}", e);
                None
            }
        })
        .collect())
}

pub fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Parse(e.to_string()))
}

pub async fn fetch_image_bytes(url: String) -> Result<Vec<u8>, String> {
    reqwest::get(&url)
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Deserialize)]
struct GenreListResponse {
    genres: Vec<Genre>,
}

#[derive(Debug, Clone, Deserialize)]
struct SeasonResponse {
    #[serde(default)]
    episodes: Vec<Episode>,
}

struct CacheEntry<T> {
    data: T,
    created_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            created_at: Instant::now(),
        }
    }

    fn is_valid(&self) -> bool {
        self.created_at.elapsed() < Duration::from_secs(CACHE_TTL_SECONDS)
    }
}

#[derive(Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    language: String,
    http_client: Arc<reqwest::Client>,
    response_cache: Arc<RwLock<HashMap<String, CacheEntry<serde_json::Value>>>>,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    pub fn new(api_key: String, language: String) -> Self {
        Self {
            api_key,
            base_url: String::from(DEFAULT_BASE_URL),
            language,
            http_client: Arc::new(reqwest::Client::new()),
            response_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.api_key.clone(), settings.effective_language())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_url(&self, path: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}api_key={}&language={}",
            self.base_url,
            path,
            separator,
            url_encode(&self.api_key),
            url_encode(&self.language)
        )
    }

    fn get_cached(&self, key: &str) -> Option<serde_json::Value> {
        self.response_cache
            .read()
            .ok()?
            .get(key)
            .filter(|e| e.is_valid())
            .map(|e| e.data.clone())
    }

    fn set_cached(&self, key: String, data: serde_json::Value) {
        if let Ok(mut cache) = self.response_cache.write() {
            cache.insert(key, CacheEntry::new(data));
        }
    }

    async fn fetch_response(&self, url: &str) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        match response.status().as_u16() {
            401 => Err(ApiError::Unauthorized),
            404 => Err(ApiError::NotFound),
            429 => Err(ApiError::RateLimit),
            s if s >= 400 => Err(ApiError::Network(format!("HTTP error: {}", s))),
            _ => Ok(response),
        }
    }

    pub async fn fetch_genres(&self) -> Result<Vec<Genre>, ApiError> {
        let movie_response: GenreListResponse = parse_body(self.fetch("/genre/movie/list").await?)?;
        let tv_response: GenreListResponse = parse_body(self.fetch("/genre/tv/list").await?)?;

        let mut genres = movie_response.genres;
        for tv_genre in tv_response.genres {
            if !genres.iter().any(|g| g.id == tv_genre.id) {
                genres.push(tv_genre);
            }
        }
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    pub async fn fetch_series_detail(&self, id: MediaId) -> Result<SeriesDetail, ApiError> {
        parse_body(self.fetch(&format!("/tv/{}", id)).await?)
    }

    pub async fn fetch_season_episodes(
        &self,
        tv_id: MediaId,
        season_number: u32,
    ) -> Result<Vec<Episode>, ApiError> {
        let season: SeasonResponse = parse_body(
            self.fetch(&format!("/tv/{}/season/{}", tv_id, season_number))
                .await?,
        )?;
        Ok(season.episodes)
    }
}

#[async_trait]
impl TmdbFetch for TmdbClient {
    async fn fetch(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        if let Some(cached) = self.get_cached(path) {
            tracing::debug!(path, "tmdb cache hit");
            return Ok(cached);
        }

        tracing::debug!(path, "tmdb request");
        let body: serde_json::Value = self
            .fetch_response(&self.build_url(path))
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        self.set_cached(path.to_string(), body.clone());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TmdbClient {
        TmdbClient::new(String::from("test-key"), String::from("zh-CN")).with_base_url(server.uri())
    }

    #[test]
    fn query_values_are_percent_encoded() {
        assert_eq!(
            with_query("/discover/movie", &[("with_origin_country", "CN|HK|TW")]),
            "/discover/movie?with_origin_country=CN%7CHK%7CTW"
        );
        assert_eq!(
            with_query("/search/multi", &[("query", "修仙")]),
            "/search/multi?query=%E4%BF%AE%E4%BB%99"
        );
        assert_eq!(with_query("/genre/tv/list", &[]), "/genre/tv/list");
    }

    #[test]
    fn parse_results_skips_entries_without_id() {
        let body = json!({ "results": [ { "id": 1 }, { "title": "no id" }, { "id": 2 } ] });
        let items: Vec<crate::media::RawMediaItem> = parse_results(body).unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn parse_results_needs_a_results_array() {
        let err = parse_results::<crate::media::RawMediaItem>(json!({ "page": 1 })).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
        let err = parse_results::<crate::media::RawMediaItem>(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn fetch_appends_credentials_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/multi"))
            .and(query_param("query", "xianxia"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("language", "zh-CN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let first = client.fetch("/search/multi?query=xianxia").await.unwrap();
        let second = client.fetch("/search/multi?query=xianxia").await.unwrap();
        assert_eq!(first, json!({ "results": [] }));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn http_statuses_translate_to_api_errors() {
        let server = MockServer::start().await;
        for (route, status) in [("/a", 401), ("/b", 404), ("/c", 429), ("/d", 503)] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        assert!(matches!(client.fetch("/a").await, Err(ApiError::Unauthorized)));
        assert!(matches!(client.fetch("/b").await, Err(ApiError::NotFound)));
        assert!(matches!(client.fetch("/c").await, Err(ApiError::RateLimit)));
        match client.fetch("/d").await {
            Err(ApiError::Network(msg)) => assert_eq!(msg, "HTTP error: 503"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(client.fetch("/broken").await, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn genres_merge_movie_and_tv_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/genre/movie/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "genres": [ { "id": 16, "name": "Animation" }, { "id": 14, "name": "Fantasy" } ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/genre/tv/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "genres": [ { "id": 16, "name": "Animation" }, { "id": 10759, "name": "Action & Adventure" } ]
            })))
            .mount(&server)
            .await;

        let genres = client_for(&server).fetch_genres().await.unwrap();
        let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Action & Adventure", "Animation", "Fantasy"]);
    }

    #[tokio::test]
    async fn season_episodes_are_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tv/42/season/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "episodes": [
                    { "id": 1, "episode_number": 1, "season_number": 1, "name": "Ep 1", "still_path": "/s.jpg" },
                    { "id": 2, "episode_number": 2, "season_number": 1, "name": null }
                ]
            })))
            .mount(&server)
            .await;

        let episodes = client_for(&server).fetch_season_episodes(42, 1).await.unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].still_path.as_deref(), Some("/s.jpg"));
        assert_eq!(episodes[1].name, "");
    }
}
