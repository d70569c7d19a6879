use std::collections::VecDeque;

use iced::widget::{button, column, container, row, scrollable, text, Column, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{hidden_scrollbar_style, icon, ICON_X_LG};
use crate::media::{
    truncate_description, Message, CINNABAR, JADE, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};

const MAX_NOTIFICATIONS: usize = 20;
const PANEL_WIDTH: f32 = 320.0;
const BODY_PREVIEW_CHARS: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub title: String,
    pub body: String,
    pub read: bool,
}

#[derive(Debug, Default)]
pub struct Notifications {
    items: VecDeque<Notification>,
    next_id: u64,
    pub open: bool,
}

impl Notifications {
    pub fn push(&mut self, level: Level, title: impl Into<String>, body: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push_front(Notification {
            id,
            level,
            title: title.into(),
            body: body.into(),
            read: self.open,
        });
        self.items.truncate(MAX_NOTIFICATIONS);
        id
    }

    pub fn info(&mut self, title: impl Into<String>, body: impl Into<String>) -> u64 {
        self.push(Level::Info, title, body)
    }

    pub fn error(&mut self, title: impl Into<String>, body: impl Into<String>) -> u64 {
        self.push(Level::Error, title, body)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        if self.open {
            self.mark_all_read();
        }
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let header = row![
            text("Notifications").size(16).color(TEXT_WHITE),
            Space::new().width(Length::Fill),
            button(text("Clear").size(12).color(TEXT_GRAY))
                .padding(Padding::new(4.0).left(8.0).right(8.0))
                .style(|_theme, _status| button::Style {
                    background: None,
                    text_color: TEXT_GRAY,
                    border: Border::default(),
                    shadow: Shadow::default(),
                    snap: false,
                })
                .on_press(Message::ClearNotifications),
        ]
        .align_y(iced::Alignment::Center);

        let body: Element<Message> = if self.is_empty() {
            container(text("Nothing new").size(13).color(TEXT_GRAY))
                .padding(Padding::new(16.0))
                .into()
        } else {
            let entries: Vec<Element<Message>> = self.iter().map(view_notification).collect();
            scrollable(Column::with_children(entries).spacing(8))
                .height(Length::Shrink)
                .style(hidden_scrollbar_style)
                .into()
        };

        container(column![header, body].spacing(12))
            .width(Length::Fixed(PANEL_WIDTH))
            .max_height(420.0)
            .padding(Padding::new(16.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.08),
                    width: 1.0,
                    radius: 8.0.into(),
                },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
                    offset: iced::Vector::new(0.0, 4.0),
                    blur_radius: 8.0,
                },
                ..Default::default()
            })
            .into()
    }
}

fn view_notification(notification: &Notification) -> Element<'_, Message> {
    let accent = match notification.level {
        Level::Info => JADE,
        Level::Error => CINNABAR,
    };

    let marker = container(Space::new().width(4).height(Length::Fill))
        .height(Length::Fixed(36.0))
        .style(move |_theme| container::Style {
            background: Some(iced::Background::Color(accent)),
            border: Border {
                radius: 2.0.into(),
                ..Default::default()
            },
            ..Default::default()
        });

    let content = column![
        text(notification.title.clone()).size(14).color(TEXT_WHITE),
        text(truncate_description(&notification.body, BODY_PREVIEW_CHARS))
            .size(12)
            .color(TEXT_GRAY)
            .wrapping(text::Wrapping::Word),
    ]
    .spacing(2)
    .width(Length::Fill);

    let dismiss = button(icon(ICON_X_LG).size(12).color(TEXT_GRAY))
        .padding(4)
        .style(|_theme, status| {
            let alpha = if matches!(status, button::Status::Hovered) {
                0.15
            } else {
                0.0
            };
            button::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    1.0, 1.0, 1.0, alpha,
                ))),
                text_color: TEXT_GRAY,
                border: Border {
                    radius: 4.0.into(),
                    ..Default::default()
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::DismissNotification(notification.id));

    row![marker, content, dismiss]
        .spacing(10)
        .align_y(iced::Alignment::Center)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_bounded() {
        let mut notifications = Notifications::default();
        for i in 0..25 {
            notifications.info(format!("n{}", i), "");
        }
        let titles: Vec<&str> = notifications.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles.len(), MAX_NOTIFICATIONS);
        assert_eq!(titles[0], "n24");
        assert_eq!(titles[MAX_NOTIFICATIONS - 1], "n5");
    }

    #[test]
    fn opening_the_panel_marks_everything_read() {
        let mut notifications = Notifications::default();
        notifications.error("Load failed", "network error");
        notifications.info("Loaded", "12 films");
        assert_eq!(notifications.unread_count(), 2);

        notifications.toggle();
        assert!(notifications.open);
        assert_eq!(notifications.unread_count(), 0);

        notifications.info("While open", "");
        assert_eq!(notifications.unread_count(), 0);

        notifications.toggle();
        notifications.info("After close", "");
        assert_eq!(notifications.unread_count(), 1);
    }

    #[test]
    fn dismiss_removes_only_that_entry() {
        let mut notifications = Notifications::default();
        let a = notifications.info("a", "");
        let b = notifications.error("b", "");
        notifications.dismiss(a);
        let ids: Vec<u64> = notifications.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![b]);
        notifications.clear();
        assert!(notifications.is_empty());
    }
}
