mod aggregator;
mod cards;
mod components;
mod detail_dialog;
mod handlers;
mod images;
mod media;
mod notifications;
mod settings;
mod status;
mod tmdb;

use iced::widget::{column, container, scrollable};
use iced::{Element, Font, Length, Padding, Size, Task, Theme};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use components::{hidden_scrollbar_style, HEADER_HEIGHT};
use images::ImageCache;
use media::{
    CatalogFilter, DialogTarget, Episode, Genre, LoadingState, MediaId, Message, NormalizedMovie,
    NormalizedSeries, Page, SeriesDetail, BACKGROUND_BLACK,
};
use notifications::Notifications;
use settings::{AppSettings, SetupPage};
use tmdb::TmdbClient;

pub struct Donghua {
    pub setup_page: Option<SetupPage>,
    pub current_page: Page,
    pub loading_state: LoadingState,
    pub series_loading_state: LoadingState,
    pub movies: Vec<NormalizedMovie>,
    pub series: Vec<NormalizedSeries>,
    pub genres: Vec<Genre>,
    pub filter: CatalogFilter,
    pub sort_menu_open: bool,
    pub notifications: Notifications,
    pub image_cache: ImageCache,
    pub hovered_card: Option<MediaId>,
    pub tmdb_client: Option<TmdbClient>,
    pub dialog: Option<DialogTarget>,
    pub series_detail: Option<SeriesDetail>,
    pub selected_season: Option<u32>,
    pub season_menu_open: bool,
    pub episodes: Vec<Episode>,
    pub episodes_loading: bool,
}

impl Default for Donghua {
    fn default() -> Self {
        Self {
            setup_page: None,
            current_page: Page::Films,
            loading_state: LoadingState::Loading,
            series_loading_state: LoadingState::Loading,
            movies: Vec::new(),
            series: Vec::new(),
            genres: Vec::new(),
            filter: CatalogFilter::default(),
            sort_menu_open: false,
            notifications: Notifications::default(),
            image_cache: ImageCache::new(),
            hovered_card: None,
            tmdb_client: None,
            dialog: None,
            series_detail: None,
            selected_season: None,
            season_menu_open: false,
            episodes: Vec::new(),
            episodes_loading: false,
        }
    }
}

impl Donghua {
    fn new() -> (Self, Task<Message>) {
        let settings = match AppSettings::load() {
            Some(s) if s.is_valid() => s,
            _ => {
                tracing::info!("no usable settings, showing setup");
                return (
                    Self {
                        setup_page: Some(SetupPage::default()),
                        ..Default::default()
                    },
                    Task::none(),
                );
            }
        };

        let client = TmdbClient::from_settings(&settings);
        let load = handlers::load_catalog(&client);
        (
            Self {
                tmdb_client: Some(client),
                ..Default::default()
            },
            load,
        )
    }

    fn initialize_with_settings(&mut self, settings: AppSettings) -> Task<Message> {
        let client = TmdbClient::from_settings(&settings);
        let load = handlers::load_catalog(&client);
        self.tmdb_client = Some(client);
        self.setup_page = None;
        self.loading_state = LoadingState::Loading;
        self.series_loading_state = LoadingState::Loading;
        load
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        if let Message::Setup(setup_msg) = message {
            if let Some(ref mut setup) = self.setup_page {
                if let Some(settings) = setup.update(setup_msg) {
                    return self.initialize_with_settings(settings);
                }
            }
            return Task::none();
        }
        handlers::handle_message(self, message)
    }

    fn view_catalog(&self) -> Element<'_, Message> {
        let catalog = match self.current_page {
            Page::Films => self.view_catalog_state(&self.loading_state, self.view_movie_grid()),
            Page::Series => {
                self.view_catalog_state(&self.series_loading_state, self.view_series_grid())
            }
        };

        let body = column![self.view_genre_tiles(), catalog]
            .spacing(28)
            .padding(Padding::new(24.0).left(48.0).right(48.0).bottom(48.0));

        scrollable(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(hidden_scrollbar_style)
            .into()
    }

    fn view(&self) -> Element<'_, Message> {
        if let Some(ref setup) = self.setup_page {
            return setup.view().map(Message::Setup);
        }

        let main_content = container(column![self.view_header(), self.view_catalog()])
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            });

        let mut layers: Vec<Element<Message>> = vec![main_content.into()];

        if self.sort_menu_open {
            layers.push(
                container(self.view_sort_menu())
                    .width(Length::Fill)
                    .align_x(iced::alignment::Horizontal::Right)
                    .padding(Padding::new(0.0).top(HEADER_HEIGHT).right(120.0))
                    .into(),
            );
        }
        if self.notifications.open {
            layers.push(
                container(self.notifications.view())
                    .width(Length::Fill)
                    .align_x(iced::alignment::Horizontal::Right)
                    .padding(Padding::new(0.0).top(HEADER_HEIGHT).right(48.0))
                    .into(),
            );
        }
        if let Some(overlay) = self.view_dialog_overlay() {
            layers.push(overlay);
        }

        iced::widget::Stack::with_children(layers)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "donghua=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    iced::application(Donghua::new, Donghua::update, Donghua::view)
        .title("Donghua")
        .theme(Donghua::theme)
        .window_size(Size::new(1280.0, 800.0))
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .default_font(Font::DEFAULT)
        .run()
}
