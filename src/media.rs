use std::collections::BTreeSet;

use iced::widget::image::Handle;
use iced::Color;
use serde::{Deserialize, Deserializer, Serialize};

use crate::status::{MediaKind, Status};

pub const BACKGROUND_BLACK: Color = Color::from_rgb(0.04, 0.04, 0.05);
pub const SURFACE_DARK_GRAY: Color = Color::from_rgb(0.09, 0.09, 0.1);
pub const CINNABAR: Color = Color::from_rgb(0.89, 0.26, 0.2);
pub const JADE: Color = Color::from_rgb(0.0, 0.66, 0.47);
pub const TEXT_WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
pub const TEXT_GRAY: Color = Color::from_rgb(0.702, 0.702, 0.702);

pub type MediaId = u64;

pub const ANIMATION_GENRE: u64 = 16;
pub const FAMILY_GENRE: u64 = 10751;
pub const KIDS_GENRE: u64 = 10762;
pub const EXCLUDED_GENRES: [u64; 2] = [FAMILY_GENRE, KIDS_GENRE];

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Films,
    Series,
}

#[derive(Debug, Clone)]
pub enum LoadingState {
    Idle,
    Loading,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("could not parse response: {0}")]
    Parse(String),
    #[error("rate limited by TMDB")]
    RateLimit,
    #[error("TMDB rejected the API key")]
    Unauthorized,
    #[error("not found")]
    NotFound,
}

/// A search or discover result as TMDB sends it. Only `id` is required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMediaItem {
    pub id: MediaId,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub original_title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub vote_average: f32,
    #[serde(default, deserialize_with = "nullable")]
    pub popularity: f32,
    #[serde(default, deserialize_with = "nullable")]
    pub original_language: String,
    #[serde(default, deserialize_with = "nullable")]
    pub genre_ids: BTreeSet<u64>,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl RawMediaItem {
    pub fn has_excluded_genre(&self) -> bool {
        EXCLUDED_GENRES.iter().any(|g| self.genre_ids.contains(g))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMovie {
    pub id: MediaId,
    pub title: String,
    #[serde(rename = "originalTitle")]
    pub original_title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f32,
    pub popularity: f32,
    pub original_language: String,
    pub genre_ids: BTreeSet<u64>,
    pub status: Status,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSeriesItem {
    pub id: MediaId,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub original_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub vote_average: f32,
    #[serde(default, deserialize_with = "nullable")]
    pub popularity: f32,
    #[serde(default, deserialize_with = "nullable")]
    pub original_language: String,
    #[serde(default, deserialize_with = "nullable")]
    pub genre_ids: BTreeSet<u64>,
}

impl RawSeriesItem {
    pub fn has_excluded_genre(&self) -> bool {
        EXCLUDED_GENRES.iter().any(|g| self.genre_ids.contains(g))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSeries {
    pub id: MediaId,
    pub name: String,
    #[serde(rename = "originalName")]
    pub original_name: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: f32,
    pub popularity: f32,
    pub original_language: String,
    pub genre_ids: BTreeSet<u64>,
    pub status: Status,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Season {
    pub id: u64,
    pub season_number: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub episode_count: u32,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesDetail {
    pub id: MediaId,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub number_of_seasons: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub number_of_episodes: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub seasons: Vec<Season>,
}

impl SeriesDetail {
    /// First season worth showing: specials (season 0) only when nothing else exists.
    pub fn default_season(&self) -> Option<u32> {
        self.seasons
            .iter()
            .map(|s| s.season_number)
            .filter(|n| *n > 0)
            .min()
            .or_else(|| self.seasons.first().map(|s| s.season_number))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub episode_number: u32,
    pub season_number: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub overview: String,
    pub air_date: Option<String>,
    pub still_path: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default, deserialize_with = "nullable")]
    pub vote_average: f32,
}

/// Common view over films and series for filtering and card rendering.
pub trait CatalogItem {
    fn id(&self) -> MediaId;
    fn display_title(&self) -> &str;
    fn date(&self) -> Option<&str>;
    fn rating(&self) -> f32;
    fn popularity(&self) -> f32;
    fn genres(&self) -> &BTreeSet<u64>;
    fn poster(&self) -> Option<&str>;
}

impl CatalogItem for NormalizedMovie {
    fn id(&self) -> MediaId {
        self.id
    }
    fn display_title(&self) -> &str {
        &self.title
    }
    fn date(&self) -> Option<&str> {
        self.release_date.as_deref()
    }
    fn rating(&self) -> f32 {
        self.vote_average
    }
    fn popularity(&self) -> f32 {
        self.popularity
    }
    fn genres(&self) -> &BTreeSet<u64> {
        &self.genre_ids
    }
    fn poster(&self) -> Option<&str> {
        self.poster_path.as_deref()
    }
}

impl CatalogItem for NormalizedSeries {
    fn id(&self) -> MediaId {
        self.id
    }
    fn display_title(&self) -> &str {
        &self.name
    }
    fn date(&self) -> Option<&str> {
        self.first_air_date.as_deref()
    }
    fn rating(&self) -> f32 {
        self.vote_average
    }
    fn popularity(&self) -> f32 {
        self.popularity
    }
    fn genres(&self) -> &BTreeSet<u64> {
        &self.genre_ids
    }
    fn poster(&self) -> Option<&str> {
        self.poster_path.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    Newest,
    Rating,
    Popularity,
    Title,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::Newest,
        SortOption::Rating,
        SortOption::Popularity,
        SortOption::Title,
    ];
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOption::Newest => write!(f, "Newest"),
            SortOption::Rating => write!(f, "Rating"),
            SortOption::Popularity => write!(f, "Popularity"),
            SortOption::Title => write!(f, "A-Z"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub genre_id: Option<u64>,
    pub sort_by: SortOption,
}

impl CatalogFilter {
    pub fn apply<T: CatalogItem + Clone>(&self, items: &[T]) -> Vec<T> {
        let mut filtered: Vec<T> = items
            .iter()
            .filter(|item| self.matches_genre(*item))
            .cloned()
            .collect();
        self.sort(&mut filtered);
        filtered
    }

    fn matches_genre<T: CatalogItem>(&self, item: &T) -> bool {
        match self.genre_id {
            None => true,
            Some(id) => item.genres().contains(&id),
        }
    }

    fn sort<T: CatalogItem>(&self, items: &mut [T]) {
        match self.sort_by {
            SortOption::Newest => {
                items.sort_by(|a, b| b.date().cmp(&a.date()));
            }
            SortOption::Rating => {
                items.sort_by(|a, b| {
                    b.rating()
                        .partial_cmp(&a.rating())
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            SortOption::Popularity => {
                items.sort_by(|a, b| {
                    b.popularity()
                        .partial_cmp(&a.popularity())
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            SortOption::Title => {
                items.sort_by(|a, b| {
                    a.display_title()
                        .to_lowercase()
                        .cmp(&b.display_title().to_lowercase())
                });
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTarget {
    Movie(MediaId),
    Series(MediaId),
}

#[derive(Debug, Clone)]
pub enum Message {
    Setup(crate::settings::SetupMessage),
    NavigateTo(Page),
    MoviesLoaded(Result<Vec<NormalizedMovie>, ApiError>),
    SeriesLoaded(Result<Vec<NormalizedSeries>, ApiError>),
    GenresLoaded(Result<Vec<Genre>, ApiError>),
    SelectGenre(Option<u64>),
    ToggleSortMenu,
    SetSortOption(SortOption),
    ToggleNotifications,
    DismissNotification(u64),
    ClearNotifications,
    HoverCard(Option<MediaId>),
    OpenDialog(DialogTarget),
    CloseDialog,
    SeriesDetailLoaded(MediaId, Result<SeriesDetail, ApiError>),
    ToggleSeasonMenu,
    SelectSeason(u32),
    EpisodesLoaded(MediaId, u32, Result<Vec<Episode>, ApiError>),
    LoadImage(String),
    ImageLoaded(String, Result<Handle, String>),
    RetryLoad,
}

pub fn release_year(date: Option<&str>) -> Option<&str> {
    date.and_then(|d| d.get(..4)).filter(|y| y.chars().all(|c| c.is_ascii_digit()))
}

pub fn truncate_description(description: &str, max_chars: usize) -> String {
    if description.chars().count() <= max_chars {
        return description.to_string();
    }
    let truncated: String = description.chars().take(max_chars).collect();
    format!(
        "{}...",
        truncated.rfind(' ').map_or(truncated.as_str(), |i| &truncated[..i])
    )
}
