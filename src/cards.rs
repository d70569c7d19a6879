use iced::widget::{button, column, container, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{bold_text, icon, ICON_FILM};
use crate::images::{image_url, ImageSize};
use crate::media::{
    release_year, CatalogItem, DialogTarget, Genre, Message, CINNABAR, SURFACE_DARK_GRAY,
    TEXT_GRAY, TEXT_WHITE,
};
use crate::Donghua;

pub const GRID_COLUMNS: usize = 6;
pub const CARD_WIDTH: f32 = 170.0;
pub const CARD_HEIGHT: f32 = 255.0;
const CARD_SPACING: f32 = 16.0;
const STILL_WIDTH: f32 = 200.0;
const STILL_HEIGHT: f32 = 112.0;

fn card_style(hovered: bool) -> container::Style {
    container::Style {
        background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
        border: Border {
            color: if hovered { CINNABAR } else { Color::TRANSPARENT },
            width: if hovered { 2.0 } else { 0.0 },
            radius: 8.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, if hovered { 0.5 } else { 0.3 }),
            offset: iced::Vector::new(0.0, 4.0),
            blur_radius: if hovered { 12.0 } else { 8.0 },
        },
        ..Default::default()
    }
}

/// Lays cards out in rows of [`GRID_COLUMNS`].
pub fn grid<'a>(cards: Vec<Element<'a, Message>>, columns: usize, spacing: f32) -> Element<'a, Message> {
    let mut rows: Vec<Element<Message>> = Vec::new();
    let mut current: Vec<Element<Message>> = Vec::with_capacity(columns);

    for card in cards {
        current.push(card);
        if current.len() == columns {
            rows.push(
                Row::with_children(std::mem::take(&mut current))
                    .spacing(spacing)
                    .into(),
            );
        }
    }
    if !current.is_empty() {
        rows.push(Row::with_children(current).spacing(spacing).into());
    }

    Column::with_children(rows).spacing(spacing * 1.5).into()
}

impl Donghua {
    pub fn image_or_placeholder<'a>(
        &self,
        path: Option<&str>,
        size: ImageSize,
        width: f32,
        height: f32,
    ) -> Element<'a, Message> {
        let url = image_url(path, size);
        match self.image_cache.get(&url) {
            Some(handle) => container(
                iced::widget::image(handle.clone())
                    .width(Length::Fixed(width))
                    .height(Length::Fixed(height))
                    .content_fit(iced::ContentFit::Cover),
            )
            .style(|_theme| container::Style {
                border: Border {
                    radius: 8.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .into(),
            None => container(icon(ICON_FILM).size(28).color(TEXT_GRAY))
                .width(Length::Fixed(width))
                .height(Length::Fixed(height))
                .center_x(Length::Fixed(width))
                .center_y(Length::Fixed(height))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(
                        0.2, 0.2, 0.2, 0.5,
                    ))),
                    border: Border {
                        radius: 8.0.into(),
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .into(),
        }
    }

    pub fn view_catalog_card<T: CatalogItem>(
        &self,
        item: &T,
        target: DialogTarget,
    ) -> Element<'_, Message> {
        let media_id = item.id();
        let is_hovered = self.hovered_card == Some(media_id);

        let poster =
            self.image_or_placeholder(item.poster(), ImageSize::Poster, CARD_WIDTH, CARD_HEIGHT);

        let mut caption = column![container(
            text(item.display_title().to_string())
                .size(14)
                .color(TEXT_WHITE)
                .shaping(text::Shaping::Advanced)
                .wrapping(text::Wrapping::Word)
        )
        .max_width(CARD_WIDTH)]
        .spacing(2);

        let year = release_year(item.date()).unwrap_or("TBA");
        caption = caption.push(
            text(format!("{}  ·  {:.1}★", year, item.rating()))
                .size(12)
                .color(TEXT_GRAY)
                .shaping(text::Shaping::Advanced),
        );

        let card = container(column![poster, caption].spacing(8))
            .width(Length::Fixed(CARD_WIDTH))
            .style(move |_theme| card_style(is_hovered));

        iced::widget::mouse_area(card)
            .on_enter(Message::HoverCard(Some(media_id)))
            .on_exit(Message::HoverCard(None))
            .on_press(Message::OpenDialog(target))
            .into()
    }

    pub fn view_movie_grid(&self) -> Element<'_, Message> {
        let movies = self.filter.apply(&self.movies);
        if movies.is_empty() {
            return self.view_empty_grid();
        }
        let cards: Vec<Element<Message>> = movies
            .iter()
            .map(|movie| self.view_catalog_card(movie, DialogTarget::Movie(movie.id)))
            .collect();
        grid(cards, GRID_COLUMNS, CARD_SPACING)
    }

    pub fn view_series_grid(&self) -> Element<'_, Message> {
        let series = self.filter.apply(&self.series);
        if series.is_empty() {
            return self.view_empty_grid();
        }
        let cards: Vec<Element<Message>> = series
            .iter()
            .map(|show| self.view_catalog_card(show, DialogTarget::Series(show.id)))
            .collect();
        grid(cards, GRID_COLUMNS, CARD_SPACING)
    }

    fn view_empty_grid(&self) -> Element<'_, Message> {
        container(
            text("No titles match this genre yet")
                .size(16)
                .color(TEXT_GRAY),
        )
        .width(Length::Fill)
        .height(Length::Fixed(200.0))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(200.0))
        .into()
    }

    pub fn view_genre_tiles(&self) -> Element<'_, Message> {
        let mut tiles: Vec<Element<Message>> = vec![self.view_genre_tile(None, "All")];
        tiles.extend(
            self.visible_genres()
                .into_iter()
                .map(|genre| self.view_genre_tile(Some(genre.id), &genre.name)),
        );

        iced::widget::scrollable(Row::with_children(tiles).spacing(10))
            .direction(iced::widget::scrollable::Direction::Horizontal(
                iced::widget::scrollable::Scrollbar::new()
                    .width(0)
                    .scroller_width(0),
            ))
            .width(Length::Fill)
            .style(crate::components::hidden_scrollbar_style)
            .into()
    }

    fn view_genre_tile(&self, genre_id: Option<u64>, name: &str) -> Element<'_, Message> {
        let is_active = self.filter.genre_id == genre_id;

        button(
            container(
                text(name.to_string())
                    .size(14)
                    .color(TEXT_WHITE)
                    .shaping(text::Shaping::Advanced),
            )
            .center_x(Length::Fill)
            .center_y(Length::Fill),
        )
        .width(Length::Fixed(140.0))
        .height(Length::Fixed(56.0))
        .padding(Padding::new(8.0))
        .style(move |_theme, status| {
            let alpha = if is_active {
                0.9
            } else if matches!(status, button::Status::Hovered) {
                0.25
            } else {
                0.12
            };
            let base = if is_active {
                CINNABAR
            } else {
                Color::from_rgb(1.0, 1.0, 1.0)
            };
            button::Style {
                background: Some(iced::Background::Color(Color { a: alpha, ..base })),
                text_color: TEXT_WHITE,
                border: Border {
                    radius: 10.0.into(),
                    ..Default::default()
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::SelectGenre(genre_id))
        .into()
    }

    pub fn view_episode_grid(&self) -> Element<'_, Message> {
        if self.episodes_loading {
            return container(text("Loading episodes...").size(14).color(TEXT_GRAY))
                .padding(16.0)
                .into();
        }
        if self.episodes.is_empty() {
            return container(text("No episodes available").size(14).color(TEXT_GRAY))
                .padding(16.0)
                .into();
        }

        let cards: Vec<Element<Message>> = self
            .episodes
            .iter()
            .map(|episode| {
                let still = self.image_or_placeholder(
                    episode.still_path.as_deref(),
                    ImageSize::Still,
                    STILL_WIDTH,
                    STILL_HEIGHT,
                );
                let label = bold_text(
                    format!("E{:02}", episode.episode_number),
                    13,
                    TEXT_WHITE,
                );
                let name = container(
                    text(episode.name.clone())
                        .size(13)
                        .color(TEXT_GRAY)
                        .shaping(text::Shaping::Advanced)
                        .wrapping(text::Wrapping::Word),
                )
                .max_width(STILL_WIDTH);
                let schedule = match (episode.air_date.as_deref(), episode.runtime) {
                    (Some(date), Some(minutes)) => format!("{}  ·  {} min", date, minutes),
                    (Some(date), None) => date.to_string(),
                    (None, Some(minutes)) => format!("{} min", minutes),
                    (None, None) => String::new(),
                };
                let air_date = text(schedule).size(11).color(TEXT_GRAY);

                column![still, label, name, air_date, Space::new().height(4)]
                    .spacing(4)
                    .width(Length::Fixed(STILL_WIDTH))
                    .into()
            })
            .collect();

        grid(cards, 4, 12.0)
    }

    /// Genres that occur in the catalog currently on screen.
    pub fn visible_genres(&self) -> Vec<&Genre> {
        let present: std::collections::BTreeSet<u64> = match self.current_page {
            crate::media::Page::Films => self
                .movies
                .iter()
                .flat_map(|m| m.genre_ids.iter().copied())
                .collect(),
            crate::media::Page::Series => self
                .series
                .iter()
                .flat_map(|s| s.genre_ids.iter().copied())
                .collect(),
        };
        self.genres
            .iter()
            .filter(|g| present.contains(&g.id))
            .collect()
    }
}
