use iced::{
    Element,
    Length::{self, Fill},
    Task, Theme, application,
    widget::{column, container, opaque, stack},
};
use touchline_lib::{Cfg, CoreConfig, Session};
use tracing::{Level, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::{
    components::{
        profile_page::{self, ProfilePage},
        toast::{self, Toasts},
    },
    config::GuiConfig,
};

pub mod components;
pub mod config;

fn main() -> iced::Result {
    application(App::new, App::update, App::view)
        .theme(App::theme)
        .title(App::title)
        .run()
}

#[derive(Debug, Clone)]
enum Message {
    ProfilePage(profile_page::Message),
    Toast(toast::Message),
}

struct App {
    title: String,
    theme: Theme,
    cfg: Cfg,
    // Components
    profile_page: ProfilePage,
    toasts: Toasts,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        // Human friendly panicking in release mode
        human_panic::setup_panic!();

        // Logging
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::TRACE)
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to install the log subscriber: {e}");
        }

        let cfg = CoreConfig::load()
            .unwrap_or_else(|e| {
                error!("Failed to load configuration, using defaults: {e}");
                CoreConfig::default()
            })
            .into_handle();
        let theme = GuiConfig::load()
            .unwrap_or_else(|e| {
                error!("Failed to load GUI configuration: {e}");
                GuiConfig::default()
            })
            .theme();

        let (profile_page, profile_page_task) = ProfilePage::new(cfg.clone(), Session::from_env());

        (
            Self {
                title: "Touchline".into(),
                theme,
                cfg,
                profile_page,
                toasts: Toasts::default(),
            },
            profile_page_task.map(Message::ProfilePage),
        )
    }

    // Update application state based on messages passed by view()
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // Redirect messages to relevant child components
            Message::ProfilePage(msg) => match self.profile_page.update(msg) {
                profile_page::Action::None => Task::none(),
                profile_page::Action::Run(task) => task.map(Message::ProfilePage),
                profile_page::Action::Notify(notice) => {
                    let duration = self.cfg.read().toast_duration();
                    self.toasts.push(notice, duration).map(Message::Toast)
                }
            },
            Message::Toast(msg) => {
                self.toasts.update(msg);
                Task::none()
            }
        }
    }

    // Render the application and pass along messages from components to update()
    pub fn view(&self) -> Element<'_, Message> {
        let content = container(column![self.profile_page.view().map(Message::ProfilePage)])
            .width(Fill)
            .height(Fill);

        match self.toasts.view() {
            Some(toast) => overlay(content, toast.map(Message::Toast)),
            None => content.into(),
        }
    }

    pub fn title(&self) -> String {
        self.title.clone()
    }

    pub fn theme(&self) -> Theme {
        self.theme.clone()
    }
}

/// Layer `content` over `base` without blocking interaction with the rest of the window.
pub fn overlay<'a, Message>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    stack![base.into(), column![opaque(content)]]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
