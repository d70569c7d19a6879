use iced::Task;

use crate::aggregator::{get_chinese_movies, get_chinese_series};
use crate::images::{image_url, ImageSize};
use crate::media::{
    ApiError, CatalogItem, DialogTarget, Episode, Genre, LoadingState, MediaId, Message,
    NormalizedMovie, NormalizedSeries, Page, SeriesDetail, SortOption,
};
use crate::tmdb::{fetch_image_bytes, TmdbClient};
use crate::Donghua;

pub fn handle_message(app: &mut Donghua, message: Message) -> Task<Message> {
    match message {
        Message::Setup(_) => Task::none(),
        Message::NavigateTo(page) => handle_navigate(app, page),
        Message::MoviesLoaded(result) => handle_movies_loaded(app, result),
        Message::SeriesLoaded(result) => handle_series_loaded(app, result),
        Message::GenresLoaded(result) => handle_genres_loaded(app, result),
        Message::SelectGenre(genre_id) => {
            app.filter.genre_id = genre_id;
            Task::none()
        }
        Message::ToggleSortMenu => {
            app.sort_menu_open = !app.sort_menu_open;
            app.notifications.open = false;
            Task::none()
        }
        Message::SetSortOption(option) => handle_set_sort_option(app, option),
        Message::ToggleNotifications => {
            app.notifications.toggle();
            app.sort_menu_open = false;
            Task::none()
        }
        Message::DismissNotification(id) => {
            app.notifications.dismiss(id);
            Task::none()
        }
        Message::ClearNotifications => {
            app.notifications.clear();
            Task::none()
        }
        Message::HoverCard(id) => {
            if app.dialog.is_none() {
                app.hovered_card = id;
            }
            Task::none()
        }
        Message::OpenDialog(target) => handle_open_dialog(app, target),
        Message::CloseDialog => handle_close_dialog(app),
        Message::SeriesDetailLoaded(id, result) => handle_series_detail_loaded(app, id, result),
        Message::ToggleSeasonMenu => {
            app.season_menu_open = !app.season_menu_open;
            Task::none()
        }
        Message::SelectSeason(season) => handle_select_season(app, season),
        Message::EpisodesLoaded(id, season, result) => {
            handle_episodes_loaded(app, id, season, result)
        }
        Message::LoadImage(url) => handle_load_image(app, url),
        Message::ImageLoaded(url, result) => handle_image_loaded(app, url, result),
        Message::RetryLoad => handle_retry_load(app),
    }
}

/// Starts every catalog request for a fresh client.
pub fn load_catalog(client: &TmdbClient) -> Task<Message> {
    let movies_client = client.clone();
    let series_client = client.clone();
    let genres_client = client.clone();

    Task::batch([
        Task::perform(
            async move { get_chinese_movies(&movies_client).await },
            Message::MoviesLoaded,
        ),
        Task::perform(
            async move { get_chinese_series(&series_client).await },
            Message::SeriesLoaded,
        ),
        Task::perform(
            async move { genres_client.fetch_genres().await },
            Message::GenresLoaded,
        ),
    ])
}

fn handle_navigate(app: &mut Donghua, page: Page) -> Task<Message> {
    if app.current_page != page {
        app.filter.genre_id = None;
    }
    app.current_page = page;
    app.sort_menu_open = false;
    app.hovered_card = None;
    Task::none()
}

fn load_poster_images<T: CatalogItem>(app: &Donghua, items: &[T]) -> Task<Message> {
    let tasks: Vec<Task<Message>> = items
        .iter()
        .map(|item| image_url(item.poster(), ImageSize::Poster))
        .filter(|url| app.image_cache.needs_load(url))
        .map(|url| Task::done(Message::LoadImage(url)))
        .collect();
    Task::batch(tasks)
}

fn handle_movies_loaded(
    app: &mut Donghua,
    result: Result<Vec<NormalizedMovie>, ApiError>,
) -> Task<Message> {
    match result {
        Ok(movies) => {
            app.notifications
                .info("Films updated", format!("{} donghua films found", movies.len()));
            let image_task = load_poster_images(app, &movies);
            app.movies = movies;
            app.loading_state = LoadingState::Idle;
            image_task
        }
        Err(error) => {
            tracing::warn!("film catalog failed: {}", error);
            app.loading_state = LoadingState::Error(error.to_string());
            app.notifications
                .error("Could not load films", error.to_string());
            Task::none()
        }
    }
}

fn handle_series_loaded(
    app: &mut Donghua,
    result: Result<Vec<NormalizedSeries>, ApiError>,
) -> Task<Message> {
    match result {
        Ok(series) => {
            app.notifications
                .info("Series updated", format!("{} donghua series found", series.len()));
            let image_task = load_poster_images(app, &series);
            app.series = series;
            app.series_loading_state = LoadingState::Idle;
            image_task
        }
        Err(error) => {
            tracing::warn!("series catalog failed: {}", error);
            app.series_loading_state = LoadingState::Error(error.to_string());
            app.notifications
                .error("Could not load series", error.to_string());
            Task::none()
        }
    }
}

fn handle_genres_loaded(app: &mut Donghua, result: Result<Vec<Genre>, ApiError>) -> Task<Message> {
    match result {
        Ok(genres) => app.genres = genres,
        Err(error) => {
            tracing::warn!("genre list failed: {}", error);
            app.notifications
                .error("Could not load genres", error.to_string());
        }
    }
    Task::none()
}

fn handle_set_sort_option(app: &mut Donghua, option: SortOption) -> Task<Message> {
    app.filter.sort_by = option;
    app.sort_menu_open = false;
    Task::none()
}

fn handle_open_dialog(app: &mut Donghua, target: DialogTarget) -> Task<Message> {
    app.dialog = Some(target);
    app.hovered_card = None;
    app.sort_menu_open = false;
    app.notifications.open = false;
    app.series_detail = None;
    app.selected_season = None;
    app.season_menu_open = false;
    app.episodes.clear();
    app.episodes_loading = false;

    match target {
        DialogTarget::Movie(id) => {
            let backdrop = app
                .movies
                .iter()
                .find(|m| m.id == id)
                .and_then(|m| m.backdrop_path.clone());
            load_backdrop(app, backdrop)
        }
        DialogTarget::Series(id) => {
            let backdrop = app
                .series
                .iter()
                .find(|s| s.id == id)
                .and_then(|s| s.backdrop_path.clone());
            let image_task = load_backdrop(app, backdrop);

            let Some(client) = &app.tmdb_client else {
                return image_task;
            };
            let fetch_client = client.clone();
            let detail_task = Task::perform(
                async move { fetch_client.fetch_series_detail(id).await },
                move |result| Message::SeriesDetailLoaded(id, result),
            );
            Task::batch([image_task, detail_task])
        }
    }
}

fn load_backdrop(app: &Donghua, backdrop: Option<String>) -> Task<Message> {
    let Some(path) = backdrop else {
        return Task::none();
    };
    let url = image_url(Some(&path), ImageSize::Backdrop);
    if app.image_cache.needs_load(&url) {
        Task::done(Message::LoadImage(url))
    } else {
        Task::none()
    }
}

fn handle_close_dialog(app: &mut Donghua) -> Task<Message> {
    app.dialog = None;
    app.series_detail = None;
    app.selected_season = None;
    app.season_menu_open = false;
    app.episodes.clear();
    app.episodes_loading = false;
    Task::none()
}

fn fetch_episodes(app: &mut Donghua, series_id: MediaId, season: u32) -> Task<Message> {
    let Some(client) = &app.tmdb_client else {
        return Task::none();
    };
    app.episodes_loading = true;
    let fetch_client = client.clone();
    Task::perform(
        async move { fetch_client.fetch_season_episodes(series_id, season).await },
        move |result| Message::EpisodesLoaded(series_id, season, result),
    )
}

fn handle_series_detail_loaded(
    app: &mut Donghua,
    series_id: MediaId,
    result: Result<SeriesDetail, ApiError>,
) -> Task<Message> {
    if app.dialog != Some(DialogTarget::Series(series_id)) {
        return Task::none();
    }

    match result {
        Ok(detail) => {
            let season = detail.default_season();
            app.series_detail = Some(detail);
            app.selected_season = season;
            match season {
                Some(season) => fetch_episodes(app, series_id, season),
                None => Task::none(),
            }
        }
        Err(error) => {
            tracing::warn!(series_id, "series details failed: {}", error);
            app.notifications
                .error("Could not load series details", error.to_string());
            Task::none()
        }
    }
}

fn handle_select_season(app: &mut Donghua, season: u32) -> Task<Message> {
    app.season_menu_open = false;
    if app.selected_season == Some(season) {
        return Task::none();
    }
    let Some(DialogTarget::Series(series_id)) = app.dialog else {
        return Task::none();
    };
    app.selected_season = Some(season);
    app.episodes.clear();
    fetch_episodes(app, series_id, season)
}

fn handle_episodes_loaded(
    app: &mut Donghua,
    series_id: MediaId,
    season: u32,
    result: Result<Vec<Episode>, ApiError>,
) -> Task<Message> {
    if app.dialog != Some(DialogTarget::Series(series_id)) || app.selected_season != Some(season)
    {
        return Task::none();
    }
    app.episodes_loading = false;

    match result {
        Ok(episodes) => {
            let tasks: Vec<Task<Message>> = episodes
                .iter()
                .map(|e| image_url(e.still_path.as_deref(), ImageSize::Still))
                .filter(|url| app.image_cache.needs_load(url))
                .map(|url| Task::done(Message::LoadImage(url)))
                .collect();
            app.episodes = episodes;
            Task::batch(tasks)
        }
        Err(error) => {
            tracing::warn!(series_id, season, "episode list failed: {}", error);
            app.notifications
                .error("Could not load episodes", error.to_string());
            Task::none()
        }
    }
}

fn handle_load_image(app: &mut Donghua, url: String) -> Task<Message> {
    if !app.image_cache.needs_load(&url) {
        return Task::none();
    }
    app.image_cache.mark_pending(url.clone());
    let request_url = url.clone();
    let cache_path = app.image_cache.get_cache_path(&url);

    Task::perform(
        async move {
            if let Some(ref path) = cache_path {
                if let Ok(bytes) = tokio::fs::read(path).await {
                    return (request_url, Ok(bytes), cache_path, true);
                }
            }
            let bytes = fetch_image_bytes(request_url.clone()).await;
            (request_url, bytes, cache_path, false)
        },
        |(url, result, cache_path, from_cache)| match result {
            Ok(bytes) => {
                if !from_cache {
                    if let Some(path) = cache_path {
                        let bytes_clone = bytes.clone();
                        std::thread::spawn(move || {
                            if let Err(e) = std::fs::write(&path, &bytes_clone) {
                                tracing::debug!("image cache write failed: {}", e);
                            }
                        });
                    }
                }
                Message::ImageLoaded(url, Ok(iced::widget::image::Handle::from_bytes(bytes)))
            }
            Err(error) => Message::ImageLoaded(url, Err(error)),
        },
    )
}

fn handle_image_loaded(
    app: &mut Donghua,
    url: String,
    result: Result<iced::widget::image::Handle, String>,
) -> Task<Message> {
    match result {
        Ok(handle) => app.image_cache.insert(url, handle),
        Err(error) => {
            tracing::warn!("image {} failed: {}", url, error);
            app.image_cache.clear_pending(&url);
        }
    }
    Task::none()
}

fn handle_retry_load(app: &mut Donghua) -> Task<Message> {
    let Some(client) = &app.tmdb_client else {
        return Task::none();
    };
    app.loading_state = LoadingState::Loading;
    app.series_loading_state = LoadingState::Loading;
    load_catalog(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{MediaKind, Status};

    fn movie(id: MediaId) -> NormalizedMovie {
        NormalizedMovie {
            id,
            title: format!("Film {}", id),
            original_title: String::new(),
            overview: String::new(),
            poster_path: Some(format!("/{}.jpg", id)),
            backdrop_path: None,
            release_date: None,
            vote_average: 0.0,
            popularity: 0.0,
            original_language: String::from("zh"),
            genre_ids: [16, 14].into_iter().collect(),
            status: Status::Unknown,
            kind: MediaKind::Movie,
        }
    }

    #[test]
    fn loaded_films_replace_loading_state_and_notify() {
        let mut app = Donghua::default();
        let _ = handle_message(&mut app, Message::MoviesLoaded(Ok(vec![movie(1), movie(2)])));
        assert!(matches!(app.loading_state, LoadingState::Idle));
        assert_eq!(app.movies.len(), 2);
        assert_eq!(app.notifications.unread_count(), 1);
    }

    #[test]
    fn failed_films_show_error_and_notify() {
        let mut app = Donghua::default();
        let _ = handle_message(&mut app, Message::MoviesLoaded(Err(ApiError::Unauthorized)));
        match &app.loading_state {
            LoadingState::Error(msg) => assert_eq!(msg, "TMDB rejected the API key"),
            other => panic!("unexpected state {:?}", other),
        }
        let first = app.notifications.iter().next().unwrap();
        assert_eq!(first.title, "Could not load films");
    }

    #[test]
    fn navigation_resets_genre_filter() {
        let mut app = Donghua::default();
        let _ = handle_message(&mut app, Message::SelectGenre(Some(14)));
        assert_eq!(app.filter.genre_id, Some(14));
        let _ = handle_message(&mut app, Message::NavigateTo(Page::Series));
        assert_eq!(app.filter.genre_id, None);
        assert_eq!(app.current_page, Page::Series);
    }

    #[test]
    fn sort_menu_closes_after_selection() {
        let mut app = Donghua::default();
        let _ = handle_message(&mut app, Message::ToggleSortMenu);
        assert!(app.sort_menu_open);
        let _ = handle_message(&mut app, Message::SetSortOption(SortOption::Rating));
        assert!(!app.sort_menu_open);
        assert_eq!(app.filter.sort_by, SortOption::Rating);
    }

    #[test]
    fn stale_episode_results_are_ignored() {
        let mut app = Donghua::default();
        let _ = handle_message(&mut app, Message::OpenDialog(DialogTarget::Series(5)));
        app.selected_season = Some(2);
        let _ = handle_message(&mut app, Message::EpisodesLoaded(5, 1, Ok(Vec::new())));
        assert!(app.episodes.is_empty());
        let _ = handle_message(&mut app, Message::CloseDialog);
        assert!(app.dialog.is_none());
        assert!(app.selected_season.is_none());
    }

    #[test]
    fn failed_image_can_be_retried() {
        let mut app = Donghua::default();
        let url = String::from("https://image.tmdb.org/t/p/w500/1.jpg");
        app.image_cache.mark_pending(url.clone());
        let _ = handle_message(&mut app, Message::ImageLoaded(url.clone(), Err(String::from("404"))));
        assert!(app.image_cache.needs_load(&url));
    }
}
