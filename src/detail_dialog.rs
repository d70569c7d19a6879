use iced::widget::{column, container, row, scrollable, text, Row, Space};
use iced::{Border, Color, Element, Length, Padding};

use crate::components::{
    bold_text, dialog, dropdown_menu, dropdown_trigger, hidden_scrollbar_style,
};
use crate::images::ImageSize;
use crate::media::{
    release_year, DialogTarget, Message, NormalizedMovie, NormalizedSeries, CINNABAR, JADE,
    TEXT_GRAY, TEXT_WHITE,
};
use crate::status::{status_from_label, MediaKind, Status};
use crate::Donghua;

const DIALOG_WIDTH: f32 = 880.0;
const BACKDROP_HEIGHT: f32 = 360.0;

fn status_pill(status: Status) -> Element<'static, Message> {
    let color = match status {
        Status::Released | Status::Returning | Status::Ended => JADE,
        Status::Canceled => CINNABAR,
        _ => TEXT_GRAY,
    };
    container(text(status.label()).size(12).color(TEXT_WHITE))
        .padding(Padding::new(3.0).left(10.0).right(10.0))
        .style(move |_theme| container::Style {
            background: Some(iced::Background::Color(Color { a: 0.35, ..color })),
            border: Border {
                color,
                width: 1.0,
                radius: 10.0.into(),
            },
            ..Default::default()
        })
        .into()
}

impl Donghua {
    pub fn view_dialog_overlay(&self) -> Option<Element<'_, Message>> {
        let content = match self.dialog? {
            DialogTarget::Movie(id) => {
                let movie = self.movies.iter().find(|m| m.id == id)?;
                self.view_movie_dialog(movie)
            }
            DialogTarget::Series(id) => {
                let series = self.series.iter().find(|s| s.id == id)?;
                self.view_series_dialog(series)
            }
        };

        let scrolling = scrollable(content)
            .height(Length::Fill)
            .style(hidden_scrollbar_style);

        Some(dialog(scrolling.into(), DIALOG_WIDTH, Message::CloseDialog))
    }

    fn view_backdrop(&self, backdrop: Option<&str>, poster: Option<&str>) -> Element<'_, Message> {
        let (path, size) = match backdrop {
            Some(path) => (Some(path), ImageSize::Backdrop),
            None => (poster, ImageSize::Poster),
        };

        let image = self.image_or_placeholder(path, size, DIALOG_WIDTH, BACKDROP_HEIGHT);
        let fade = container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fixed(BACKDROP_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::PI)
                        .add_stop(0.0, Color::from_rgba(0.09, 0.09, 0.1, 1.0))
                        .add_stop(0.4, Color::from_rgba(0.09, 0.09, 0.1, 0.4))
                        .add_stop(1.0, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        iced::widget::stack![image, fade]
            .width(Length::Fixed(DIALOG_WIDTH))
            .height(Length::Fixed(BACKDROP_HEIGHT))
            .into()
    }

    fn genre_names(&self, ids: &std::collections::BTreeSet<u64>) -> String {
        self.genres
            .iter()
            .filter(|g| ids.contains(&g.id))
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn view_movie_dialog(&self, movie: &NormalizedMovie) -> Element<'_, Message> {
        let mut meta: Vec<Element<Message>> = vec![
            text(release_year(movie.release_date.as_deref()).unwrap_or("TBA").to_string())
                .size(14)
                .color(TEXT_GRAY)
                .into(),
            text(format!("{:.1}★", movie.vote_average))
                .size(14)
                .color(TEXT_WHITE)
                .into(),
            status_pill(movie.status),
        ];
        let genres = self.genre_names(&movie.genre_ids);
        if !genres.is_empty() {
            meta.push(text(genres).size(14).color(TEXT_GRAY).into());
        }

        let mut body = column![
            bold_text(movie.title.clone(), 30, TEXT_WHITE),
            Row::with_children(meta)
                .spacing(16)
                .align_y(iced::Alignment::Center),
        ]
        .spacing(12);

        if !movie.original_title.is_empty() && movie.original_title != movie.title {
            body = body.push(
                text(movie.original_title.clone())
                    .size(16)
                    .color(TEXT_GRAY)
                    .shaping(text::Shaping::Advanced),
            );
        }

        body = body.push(
            text(if movie.overview.is_empty() {
                String::from("No overview available.")
            } else {
                movie.overview.clone()
            })
            .size(15)
            .color(TEXT_WHITE)
            .shaping(text::Shaping::Advanced)
            .wrapping(text::Wrapping::Word),
        );

        column![
            self.view_backdrop(movie.backdrop_path.as_deref(), movie.poster_path.as_deref()),
            container(body).padding(Padding::new(32.0).top(0.0))
        ]
        .into()
    }

    fn series_status(&self, series: &NormalizedSeries) -> Status {
        match &self.series_detail {
            Some(detail) if detail.id == series.id => {
                status_from_label(MediaKind::Tv, &detail.status)
            }
            _ => series.status,
        }
    }

    fn view_series_dialog(&self, series: &NormalizedSeries) -> Element<'_, Message> {
        let detail = self
            .series_detail
            .as_ref()
            .filter(|detail| detail.id == series.id);

        let mut meta: Vec<Element<Message>> = vec![
            text(release_year(series.first_air_date.as_deref()).unwrap_or("TBA").to_string())
                .size(14)
                .color(TEXT_GRAY)
                .into(),
            text(format!("{:.1}★", series.vote_average))
                .size(14)
                .color(TEXT_WHITE)
                .into(),
            status_pill(self.series_status(series)),
        ];
        if let Some(detail) = detail {
            meta.push(
                text(format!(
                    "{} seasons · {} episodes",
                    detail.number_of_seasons, detail.number_of_episodes
                ))
                .size(14)
                .color(TEXT_GRAY)
                .into(),
            );
        }

        let overview = text(if series.overview.is_empty() {
            String::from("No overview available.")
        } else {
            series.overview.clone()
        })
        .size(15)
        .color(TEXT_WHITE)
        .shaping(text::Shaping::Advanced)
        .wrapping(text::Wrapping::Word);

        let body = column![
            bold_text(series.name.clone(), 30, TEXT_WHITE),
            Row::with_children(meta)
                .spacing(16)
                .align_y(iced::Alignment::Center),
            overview,
            self.view_seasons_section(),
        ]
        .spacing(12);

        column![
            self.view_backdrop(series.backdrop_path.as_deref(), series.poster_path.as_deref()),
            container(body).padding(Padding::new(32.0).top(0.0))
        ]
        .into()
    }

    fn view_seasons_section(&self) -> Element<'_, Message> {
        let Some(detail) = &self.series_detail else {
            return text("Loading seasons...").size(14).color(TEXT_GRAY).into();
        };

        let selected_name = self
            .selected_season
            .and_then(|n| detail.seasons.iter().find(|s| s.season_number == n))
            .map(|s| s.name.clone())
            .unwrap_or_else(|| String::from("Season"));

        let trigger = dropdown_trigger(selected_name, self.season_menu_open, Message::ToggleSeasonMenu);

        let mut picker = column![trigger].spacing(6);
        if self.season_menu_open {
            let options = detail
                .seasons
                .iter()
                .map(|s| {
                    (
                        format!("{} ({})", s.name, s.episode_count),
                        Message::SelectSeason(s.season_number),
                        Some(s.season_number) == self.selected_season,
                    )
                })
                .collect();
            picker = picker.push(dropdown_menu(options, 240.0));
        }

        let header = row![
            bold_text("Episodes", 18, TEXT_WHITE),
            Space::new().width(Length::Fill),
            picker
        ]
        .align_y(iced::Alignment::Start);

        column![header, self.view_episode_grid()]
            .spacing(16)
            .padding(Padding::new(0.0).top(16.0))
            .into()
    }
}
