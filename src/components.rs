use iced::widget::{button, column, container, row, scrollable, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::media::{
    LoadingState, Message, Page, SortOption, CINNABAR, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::Donghua;

pub const ICON_X_LG: char = '\u{F659}';
pub const ICON_FILM: char = '\u{F3A9}';
pub const ICON_BELL_FILL: char = '\u{F189}';
pub const ICON_CHEVRON_DOWN: char = '\u{F282}';
pub const ICON_CHECK_LG: char = '\u{F633}';

pub const HEADER_HEIGHT: f32 = 80.0;
const SORT_MENU_WIDTH: f32 = 180.0;

pub fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn bold_text(s: impl ToString, size: u32, color: Color) -> iced::widget::Text<'static> {
    text(s.to_string())
        .size(size)
        .color(color)
        .shaping(text::Shaping::Advanced)
        .font(iced::Font {
            weight: iced::font::Weight::Bold,
            ..Default::default()
        })
}

pub fn hidden_scrollbar_style(
    _theme: &iced::Theme,
    _status: scrollable::Status,
) -> scrollable::Style {
    let transparent_rail = scrollable::Rail {
        background: None,
        border: Border::default(),
        scroller: scrollable::Scroller {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
        },
    };
    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: transparent_rail.clone(),
        horizontal_rail: transparent_rail,
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
            shadow: Shadow::default(),
            icon: Color::TRANSPARENT,
        },
    }
}

fn ghost_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let alpha = match status {
        button::Status::Hovered => 0.15,
        _ => 0.08,
    };
    button::Style {
        background: Some(iced::Background::Color(Color::from_rgba(
            1.0, 1.0, 1.0, alpha,
        ))),
        text_color: TEXT_WHITE,
        border: Border {
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.15),
            width: 1.0,
            radius: 4.0.into(),
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

fn floating_surface_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: 8.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
            offset: iced::Vector::new(0.0, 4.0),
            blur_radius: 8.0,
        },
        ..Default::default()
    }
}

/// Button that opens and closes a [`dropdown_menu`].
pub fn dropdown_trigger<'a>(label: String, open: bool, on_toggle: Message) -> Element<'a, Message> {
    let chevron = icon(ICON_CHEVRON_DOWN)
        .size(12)
        .color(if open { TEXT_WHITE } else { TEXT_GRAY });

    button(
        row![text(label).size(13).color(TEXT_WHITE), chevron]
            .spacing(8)
            .align_y(iced::Alignment::Center),
    )
    .padding(Padding::new(8.0).left(12.0).right(12.0))
    .style(ghost_button_style)
    .on_press(on_toggle)
    .into()
}

/// Vertical list of options; the selected one carries a check mark.
pub fn dropdown_menu<'a>(options: Vec<(String, Message, bool)>, width: f32) -> Element<'a, Message> {
    let entries: Vec<Element<Message>> = options
        .into_iter()
        .map(|(label, message, selected)| {
            let check: Element<Message> = if selected {
                icon(ICON_CHECK_LG).size(12).color(CINNABAR).into()
            } else {
                Space::new().width(12).into()
            };
            button(
                row![check, text(label).size(14).color(TEXT_WHITE)]
                    .spacing(10)
                    .align_y(iced::Alignment::Center),
            )
            .padding(Padding::new(10.0).left(14.0).right(14.0))
            .width(Length::Fill)
            .style(|_theme, status| {
                let background_color = match status {
                    button::Status::Hovered => Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                    _ => Color::TRANSPARENT,
                };
                button::Style {
                    background: Some(iced::Background::Color(background_color)),
                    text_color: TEXT_WHITE,
                    border: Border::default(),
                    shadow: Shadow::default(),
                    snap: false,
                }
            })
            .on_press(message)
            .into()
        })
        .collect();

    container(Column::with_children(entries))
        .width(Length::Fixed(width))
        .padding(Padding::new(4.0))
        .style(floating_surface_style)
        .into()
}

/// Modal surface centred over a dimmed backdrop. Clicking the backdrop or
/// the close button emits `on_close`.
pub fn dialog<'a>(content: Element<'a, Message>, width: f32, on_close: Message) -> Element<'a, Message> {
    let close_button = button(
        container(icon(ICON_X_LG).size(16).color(TEXT_WHITE))
            .width(Length::Fixed(36.0))
            .height(Length::Fixed(36.0))
            .center_x(Length::Fill)
            .center_y(Length::Fill),
    )
    .width(Length::Fixed(36.0))
    .height(Length::Fixed(36.0))
    .padding(0)
    .style(|_theme, status| {
        let alpha = match status {
            button::Status::Hovered => 0.9,
            _ => 0.6,
        };
        button::Style {
            background: Some(iced::Background::Color(Color::from_rgba(
                0.0, 0.0, 0.0, alpha,
            ))),
            text_color: TEXT_WHITE,
            border: Border {
                radius: 18.0.into(),
                ..Default::default()
            },
            shadow: Shadow::default(),
            snap: false,
        }
    })
    .on_press(on_close.clone());

    let close_positioned = container(close_button)
        .width(Length::Fill)
        .align_x(iced::alignment::Horizontal::Right)
        .padding(Padding::new(16.0));

    let surface = container(iced::widget::stack![content, close_positioned])
        .width(Length::Fixed(width))
        .clip(true)
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 16.0.into(),
            },
            shadow: Shadow {
                color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
                offset: iced::Vector::new(0.0, 25.0),
                blur_radius: 50.0,
            },
            ..Default::default()
        });

    let backdrop = iced::widget::mouse_area(
        container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, 0.85,
                ))),
                ..Default::default()
            }),
    )
    .on_press(on_close);

    let centered = container(iced::widget::mouse_area(surface))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .padding(Padding::new(40.0));

    iced::widget::stack![backdrop, centered]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

impl Donghua {
    pub fn view_header(&self) -> Element<'_, Message> {
        let logo = text("东画")
            .size(28)
            .color(CINNABAR)
            .shaping(text::Shaping::Advanced)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            });

        let navigation = Row::with_children(vec![
            self.view_nav_button("Films", Page::Films),
            self.view_nav_button("Series", Page::Series),
        ])
        .spacing(24)
        .align_y(iced::Alignment::Center);

        let sort_trigger = dropdown_trigger(
            format!("Sort: {}", self.filter.sort_by),
            self.sort_menu_open,
            Message::ToggleSortMenu,
        );

        let header_content = row![
            logo,
            navigation,
            Space::new().width(Length::Fill),
            sort_trigger,
            self.view_notification_bell()
        ]
        .spacing(32)
        .padding(Padding::new(16.0).left(48.0).right(48.0))
        .align_y(iced::Alignment::Center);

        container(header_content)
            .width(Length::Fill)
            .height(Length::Fixed(HEADER_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, 0.6,
                ))),
                ..Default::default()
            })
            .into()
    }

    fn view_nav_button(&self, label: &'static str, page: Page) -> Element<'_, Message> {
        let is_active = self.current_page == page;

        let label_text = text(label)
            .size(14)
            .color(if is_active { TEXT_WHITE } else { TEXT_GRAY });

        let content: Element<Message> = if is_active {
            let underline = container(Space::new().width(Length::Fill).height(2)).style(|_theme| {
                container::Style {
                    background: Some(iced::Background::Color(CINNABAR)),
                    ..Default::default()
                }
            });
            column![label_text, underline]
                .spacing(4)
                .align_x(iced::Alignment::Center)
                .into()
        } else {
            label_text.into()
        };

        button(content)
            .padding(Padding::new(8.0).left(12.0).right(12.0))
            .style(|_theme, _status| button::Style {
                background: Some(iced::Background::Color(Color::TRANSPARENT)),
                text_color: TEXT_WHITE,
                border: Border::default(),
                shadow: Shadow::default(),
                snap: false,
            })
            .on_press(Message::NavigateTo(page))
            .into()
    }

    fn view_notification_bell(&self) -> Element<'_, Message> {
        let unread = self.notifications.unread_count();
        let bell = icon(ICON_BELL_FILL).size(18).color(TEXT_WHITE);

        let content: Element<Message> = if unread == 0 {
            bell.into()
        } else {
            let badge = container(text(unread.min(99).to_string()).size(10).color(TEXT_WHITE))
                .padding(Padding::new(1.0).left(5.0).right(5.0))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(CINNABAR)),
                    border: Border {
                        radius: 8.0.into(),
                        ..Default::default()
                    },
                    ..Default::default()
                });
            row![bell, badge].spacing(2).align_y(iced::Alignment::Start).into()
        };

        button(
            container(content)
                .height(Length::Fixed(40.0))
                .align_y(iced::alignment::Vertical::Center),
        )
        .padding(Padding::new(0.0).left(10.0).right(10.0))
        .style(|_theme, _status| button::Style {
            background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
            text_color: TEXT_WHITE,
            border: Border {
                radius: 20.0.into(),
                ..Default::default()
            },
            shadow: Shadow::default(),
            snap: false,
        })
        .on_press(Message::ToggleNotifications)
        .into()
    }

    pub fn view_sort_menu(&self) -> Element<'_, Message> {
        let options = SortOption::ALL
            .into_iter()
            .map(|option| {
                (
                    option.to_string(),
                    Message::SetSortOption(option),
                    option == self.filter.sort_by,
                )
            })
            .collect();
        dropdown_menu(options, SORT_MENU_WIDTH)
    }

    pub fn view_error_state<'a>(&'a self, error_message: &'a str) -> Element<'a, Message> {
        let error_text = text(error_message).size(18).color(CINNABAR);
        let retry_button = button(text("Retry").size(16).color(TEXT_WHITE))
            .padding(Padding::new(12.0).left(24.0).right(24.0))
            .style(|_theme, _status| button::Style {
                background: Some(iced::Background::Color(CINNABAR)),
                text_color: TEXT_WHITE,
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 4.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            })
            .on_press(Message::RetryLoad);

        container(
            column![error_text, retry_button]
                .spacing(16)
                .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fixed(400.0))
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
    }

    pub fn view_skeleton_grid(&self) -> Element<'_, Message> {
        let rows: Vec<Element<Message>> = (0..2)
            .map(|_| {
                let cards: Vec<Element<Message>> = (0..crate::cards::GRID_COLUMNS)
                    .map(|_| {
                        container(Space::new().width(Length::Fill).height(Length::Fill))
                            .width(Length::Fixed(crate::cards::CARD_WIDTH))
                            .height(Length::Fixed(crate::cards::CARD_HEIGHT))
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
                            .into()
                    })
                    .collect();
                Row::with_children(cards).spacing(16).into()
            })
            .collect();

        Column::with_children(rows).spacing(24).into()
    }

    pub fn view_catalog_state<'a>(
        &'a self,
        state: &'a LoadingState,
        ready: Element<'a, Message>,
    ) -> Element<'a, Message> {
        match state {
            LoadingState::Loading => self.view_skeleton_grid(),
            LoadingState::Error(error_message) => self.view_error_state(error_message),
            LoadingState::Idle => ready,
        }
    }
}
