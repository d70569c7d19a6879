use std::path::{Path, PathBuf};

use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};
use serde::{Deserialize, Serialize};

use crate::media::{BACKGROUND_BLACK, CINNABAR, TEXT_GRAY, TEXT_WHITE};

pub const DEFAULT_LANGUAGE: &str = "zh-CN";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not determine the config path")]
    NoHome,
    #[error("config i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppSettings {
    pub api_key: String,
    #[serde(default)]
    pub language: String,
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("donghua")
                .join("config.json")
        })
    }

    pub fn load() -> Option<Self> {
        let path = Self::config_path()?;
        match Self::load_from(&path) {
            Ok(settings) => Some(settings),
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("ignoring settings at {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoHome)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn effective_language(&self) -> String {
        let language = self.language.trim();
        if language.is_empty() {
            String::from(DEFAULT_LANGUAGE)
        } else {
            language.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub enum SetupMessage {
    ApiKeyChanged(String),
    LanguageChanged(String),
    Submit,
}

pub struct SetupPage {
    pub api_key: String,
    pub language: String,
    pub error: Option<String>,
}

impl Default for SetupPage {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: String::from(DEFAULT_LANGUAGE),
            error: None,
        }
    }
}

impl SetupPage {
    fn settings(&self) -> Result<AppSettings, String> {
        if self.api_key.trim().is_empty() {
            return Err(String::from("API key is required"));
        }
        let settings = AppSettings {
            api_key: self.api_key.trim().to_string(),
            language: self.language.trim().to_string(),
        };
        Ok(AppSettings {
            language: settings.effective_language(),
            ..settings
        })
    }

    pub fn update(&mut self, message: SetupMessage) -> Option<AppSettings> {
        match message {
            SetupMessage::ApiKeyChanged(key) => {
                self.api_key = key;
                self.error = None;
                None
            }
            SetupMessage::LanguageChanged(lang) => {
                self.language = lang;
                None
            }
            SetupMessage::Submit => {
                let settings = match self.settings() {
                    Ok(settings) => settings,
                    Err(e) => {
                        self.error = Some(e);
                        return None;
                    }
                };
                if let Err(e) = settings.save() {
                    self.error = Some(format!("Failed to save: {}", e));
                    return None;
                }
                tracing::info!("saved settings");
                Some(settings)
            }
        }
    }

    pub fn view(&self) -> Element<'_, SetupMessage> {
        let logo = text("东画 DONGHUA")
            .size(44)
            .color(CINNABAR)
            .shaping(text::Shaping::Advanced);

        let title = text("Welcome").size(28).color(TEXT_WHITE);
        let subtitle = text("Connect a TMDB API key to browse the catalog")
            .size(14)
            .color(TEXT_GRAY);

        let api_label = text("TMDB API Key").size(14).color(TEXT_WHITE);
        let api_hint = text("Get your free API key at themoviedb.org/settings/api")
            .size(12)
            .color(TEXT_GRAY);
        let api_input = text_input("Enter your TMDB API key...", &self.api_key)
            .on_input(SetupMessage::ApiKeyChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let lang_label = text("Language").size(14).color(TEXT_WHITE);
        let lang_hint = text("Examples: zh-CN, zh-TW, en-US")
            .size(12)
            .color(TEXT_GRAY);
        let lang_input = text_input(DEFAULT_LANGUAGE, &self.language)
            .on_input(SetupMessage::LanguageChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let submit_button = button(text("Start Browsing").size(16).color(TEXT_WHITE))
            .padding([12, 32])
            .style(|_theme, status| {
                let bg = match status {
                    button::Status::Hovered => iced::Color::from_rgb(0.72, 0.2, 0.16),
                    _ => CINNABAR,
                };
                button::Style {
                    background: Some(iced::Background::Color(bg)),
                    text_color: TEXT_WHITE,
                    border: iced::Border::default().rounded(4),
                    ..Default::default()
                }
            })
            .on_press(SetupMessage::Submit);

        let error_text = if let Some(ref err) = self.error {
            text(err).size(14).color(CINNABAR)
        } else {
            text("").size(14)
        };

        let spacer = || Space::new().height(16);
        let small_spacer = || Space::new().height(4);

        let form = column![
            logo,
            spacer(),
            title,
            small_spacer(),
            subtitle,
            spacer(),
            spacer(),
            api_label,
            small_spacer(),
            api_hint,
            small_spacer(),
            api_input,
            spacer(),
            lang_label,
            small_spacer(),
            lang_hint,
            small_spacer(),
            lang_input,
            spacer(),
            error_text,
            small_spacer(),
            row![submit_button].width(Length::Fill),
        ]
        .width(Length::Fixed(400.0))
        .align_x(Alignment::Start);

        container(form)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let settings = AppSettings {
            api_key: String::from("abc"),
            language: String::from("zh-TW"),
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn missing_language_defaults_on_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "api_key": "abc" }"#).unwrap();
        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.language, "");
        assert_eq!(settings.effective_language(), DEFAULT_LANGUAGE);
    }

    #[test]
    fn broken_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ api_key").unwrap();
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn blank_api_key_is_invalid() {
        let settings = AppSettings {
            api_key: String::from("   "),
            language: String::new(),
        };
        assert!(!settings.is_valid());
    }

    #[test]
    fn setup_rejects_missing_key_without_saving() {
        let mut page = SetupPage::default();
        assert!(page.update(SetupMessage::Submit).is_none());
        assert_eq!(page.error.as_deref(), Some("API key is required"));

        page.update(SetupMessage::ApiKeyChanged(String::from(" key ")));
        assert!(page.error.is_none());
        page.update(SetupMessage::LanguageChanged(String::from("  ")));
        let settings = page.settings().unwrap();
        assert_eq!(settings.api_key, "key");
        assert_eq!(settings.language, DEFAULT_LANGUAGE);
    }
}
