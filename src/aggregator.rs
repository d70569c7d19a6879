//! Builds the donghua film and series catalogs from TMDB.
//!
//! Films come from one filtered discover query plus a series of keyword
//! searches against `/search/multi`; both passes are merged by id with the
//! later entry winning. Every call is awaited in turn and the first failure
//! aborts the whole aggregation.

use std::collections::BTreeMap;

use crate::media::{
    ApiError, MediaId, NormalizedMovie, NormalizedSeries, RawMediaItem, RawSeriesItem,
    ANIMATION_GENRE,
};
use crate::status::{id_to_status, string_to_id, MediaKind};
use crate::tmdb::{parse_results, with_query, TmdbFetch};

pub const CHINESE_LANGUAGE: &str = "zh";
pub const ORIGIN_COUNTRIES: &str = "CN|HK|TW";

pub const FALLBACK_KEYWORDS: [&str; 6] = ["xianxia", "xiuxian", "cultivation", "修仙", "仙侠", "仙逆"];

fn discover_path(endpoint: &str, sort_by: &str) -> String {
    let genre = ANIMATION_GENRE.to_string();
    with_query(
        endpoint,
        &[
            ("with_genres", genre.as_str()),
            ("with_original_language", CHINESE_LANGUAGE),
            ("with_origin_country", ORIGIN_COUNTRIES),
            ("include_adult", "false"),
            ("sort_by", sort_by),
            ("page", "1"),
        ],
    )
}

pub fn movie_discover_path() -> String {
    discover_path("/discover/movie", "primary_release_date.desc")
}

pub fn series_discover_path() -> String {
    discover_path("/discover/tv", "first_air_date.desc")
}

pub fn search_path(keyword: &str) -> String {
    with_query("/search/multi", &[("query", keyword)])
}

fn is_donghua_film(item: &RawMediaItem) -> bool {
    item.media_type.as_deref() == Some("movie")
        && item.original_language == CHINESE_LANGUAGE
        && item.genre_ids.contains(&ANIMATION_GENRE)
        && !item.has_excluded_genre()
}

fn normalize_movie(item: RawMediaItem) -> NormalizedMovie {
    // TMDB list results carry no status, so the lookup always starts empty.
    let status = id_to_status(MediaKind::Movie, string_to_id("", MediaKind::Movie));
    NormalizedMovie {
        id: item.id,
        title: item.title,
        original_title: item.original_title,
        overview: item.overview,
        poster_path: item.poster_path,
        backdrop_path: item.backdrop_path,
        release_date: item.release_date,
        vote_average: item.vote_average,
        popularity: item.popularity,
        original_language: item.original_language,
        genre_ids: item.genre_ids,
        status,
        kind: MediaKind::Movie,
    }
}

fn normalize_series(item: RawSeriesItem) -> NormalizedSeries {
    NormalizedSeries {
        id: item.id,
        name: item.name,
        original_name: item.original_name,
        overview: item.overview,
        poster_path: item.poster_path,
        backdrop_path: item.backdrop_path,
        first_air_date: item.first_air_date,
        vote_average: item.vote_average,
        popularity: item.popularity,
        original_language: item.original_language,
        genre_ids: item.genre_ids,
        status: id_to_status(MediaKind::Tv, None),
        kind: MediaKind::Tv,
    }
}

pub async fn get_chinese_movies<F>(client: &F) -> Result<Vec<NormalizedMovie>, ApiError>
where
    F: TmdbFetch + ?Sized,
{
    let discovered: Vec<RawMediaItem> = parse_results(client.fetch(&movie_discover_path()).await?)?;
    let discovered_count = discovered.len();

    let mut collected: Vec<RawMediaItem> = discovered
        .into_iter()
        .filter(|item| !item.has_excluded_genre())
        .collect();

    for keyword in FALLBACK_KEYWORDS {
        let results: Vec<RawMediaItem> = parse_results(client.fetch(&search_path(keyword)).await?)?;
        let before = collected.len();
        collected.extend(results.into_iter().filter(is_donghua_film));
        tracing::debug!(keyword, matches = collected.len() - before, "fallback search");
    }

    let mut by_id: BTreeMap<MediaId, RawMediaItem> = BTreeMap::new();
    for item in collected {
        by_id.insert(item.id, item);
    }

    let movies: Vec<NormalizedMovie> = by_id.into_values().map(normalize_movie).collect();
    tracing::info!(
        discovered = discovered_count,
        total = movies.len(),
        "aggregated donghua films"
    );
    Ok(movies)
}

pub async fn get_chinese_series<F>(client: &F) -> Result<Vec<NormalizedSeries>, ApiError>
where
    F: TmdbFetch + ?Sized,
{
    let discovered: Vec<RawSeriesItem> =
        parse_results(client.fetch(&series_discover_path()).await?)?;

    let mut by_id: BTreeMap<MediaId, RawSeriesItem> = BTreeMap::new();
    for item in discovered.into_iter().filter(|s| !s.has_excluded_genre()) {
        by_id.insert(item.id, item);
    }

    let series: Vec<NormalizedSeries> = by_id.into_values().map(normalize_series).collect();
    tracing::info!(total = series.len(), "aggregated donghua series");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockTmdb {
        responses: HashMap<String, Result<Value, ApiError>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockTmdb {
        fn respond(mut self, path: String, body: Value) -> Self {
            self.responses.insert(path, Ok(body));
            self
        }

        fn fail(mut self, path: String, error: ApiError) -> Self {
            self.responses.insert(path, Err(error));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TmdbFetch for MockTmdb {
        async fn fetch(&self, path: &str) -> Result<Value, ApiError> {
            self.calls.lock().unwrap().push(path.to_string());
            self.responses
                .get(path)
                .cloned()
                .unwrap_or_else(|| Ok(json!({ "results": [] })))
        }
    }

    fn film(id: u64, title: &str, genres: &[u64]) -> Value {
        json!({
            "id": id,
            "title": title,
            "original_title": title,
            "overview": "",
            "poster_path": format!("/{}.jpg", id),
            "backdrop_path": null,
            "release_date": "2024-01-01",
            "vote_average": 7.5,
            "popularity": 12.0,
            "original_language": "zh",
            "genre_ids": genres
        })
    }

    fn search_hit(id: u64, title: &str, media_type: &str, language: &str, genres: &[u64]) -> Value {
        let mut value = film(id, title, genres);
        value["media_type"] = json!(media_type);
        value["original_language"] = json!(language);
        value
    }

    fn scenario() -> MockTmdb {
        MockTmdb::default()
            .respond(
                movie_discover_path(),
                json!({ "results": [
                    film(1, "Jiang Ziya", &[16, 14]),
                    film(2, "Little Door Gods", &[16, 10751]),
                    film(3, "Ne Zha", &[16])
                ] }),
            )
            .respond(
                search_path("xianxia"),
                json!({ "results": [
                    search_hit(3, "Ne Zha (search)", "movie", "zh", &[16, 14]),
                    search_hit(4, "White Snake", "movie", "zh", &[16]),
                    search_hit(5, "Link Click", "tv", "zh", &[16]),
                    search_hit(6, "Spirited Away", "movie", "ja", &[16]),
                    search_hit(7, "Live action", "movie", "zh", &[28]),
                    search_hit(8, "Boonie Bears", "movie", "zh", &[16, 10751])
                ] }),
            )
    }

    #[tokio::test]
    async fn merges_filters_and_deduplicates() {
        let movies = get_chinese_movies(&scenario()).await.unwrap();

        let ids: Vec<MediaId> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert!(movies.iter().all(|m| m.kind == MediaKind::Movie));
        assert!(movies.iter().all(|m| m.status == Status::Unknown));
    }

    #[tokio::test]
    async fn fallback_entry_overwrites_discover_entry() {
        let movies = get_chinese_movies(&scenario()).await.unwrap();
        let ne_zha = movies.iter().find(|m| m.id == 3).unwrap();
        assert_eq!(ne_zha.title, "Ne Zha (search)");
        assert!(ne_zha.genre_ids.contains(&14));
    }

    #[tokio::test]
    async fn fields_are_copied_verbatim() {
        let movies = get_chinese_movies(&scenario()).await.unwrap();
        let first = &movies[0];
        assert_eq!(first.original_title, "Jiang Ziya");
        assert_eq!(first.poster_path.as_deref(), Some("/1.jpg"));
        assert_eq!(first.release_date.as_deref(), Some("2024-01-01"));
        assert_eq!(first.original_language, "zh");
        assert_eq!(first.vote_average, 7.5);
    }

    #[tokio::test]
    async fn issues_discover_then_each_keyword_in_order() {
        let mock = scenario();
        get_chinese_movies(&mock).await.unwrap();

        let mut expected = vec![movie_discover_path()];
        expected.extend(FALLBACK_KEYWORDS.iter().map(|k| search_path(k)));
        assert_eq!(mock.calls(), expected);
    }

    #[tokio::test]
    async fn discover_query_carries_the_fixed_filters() {
        let path = movie_discover_path();
        assert!(path.starts_with("/discover/movie?"));
        assert!(path.contains("with_genres=16"));
        assert!(path.contains("with_original_language=zh"));
        assert!(path.contains("with_origin_country=CN%7CHK%7CTW"));
        assert!(path.contains("include_adult=false"));
        assert!(path.contains("sort_by=primary_release_date.desc"));
        assert!(path.contains("page=1"));
    }

    #[tokio::test]
    async fn repeated_runs_are_identical() {
        let mock = scenario();
        let first = get_chinese_movies(&mock).await.unwrap();
        let second = get_chinese_movies(&mock).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn discover_failure_fails_everything() {
        let mock = scenario().fail(movie_discover_path(), ApiError::Unauthorized);
        let result = get_chinese_movies(&mock).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn keyword_failure_propagates() {
        let mock = scenario().fail(search_path("cultivation"), ApiError::RateLimit);
        let result = get_chinese_movies(&mock).await;
        assert!(matches!(result, Err(ApiError::RateLimit)));
        assert_eq!(mock.calls().len(), 4);
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let mock = MockTmdb::default().respond(movie_discover_path(), json!({ "status_code": 7 }));
        assert!(matches!(
            get_chinese_movies(&mock).await,
            Err(ApiError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn series_discover_excludes_kids_and_sorts_by_id() {
        let mock = MockTmdb::default().respond(
            series_discover_path(),
            json!({ "results": [
                { "id": 20, "name": "Soul Land", "genre_ids": [16, 10765], "original_language": "zh" },
                { "id": 11, "name": "Link Click", "genre_ids": [16, 18], "original_language": "zh" },
                { "id": 15, "name": "Kids show", "genre_ids": [16, 10762], "original_language": "zh" }
            ] }),
        );

        let series = get_chinese_series(&mock).await.unwrap();
        let ids: Vec<MediaId> = series.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![11, 20]);
        assert!(series.iter().all(|s| s.kind == MediaKind::Tv));
        assert!(series.iter().all(|s| s.status == Status::Unknown));
        assert!(series_discover_path().contains("sort_by=first_air_date.desc"));
    }
}
