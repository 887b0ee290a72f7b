use iced::{
    Alignment, Element, Length, Task,
    widget::{button, column, container, pick_list, row, rule, space, text, text_input},
};
use rfd::AsyncFileDialog;
use strum::IntoEnumIterator;
use touchline_lib::{
    ApiClient, Cfg, Field, JobTitle, LocalFile, ProfileApi, ProfileForm, SaveOutcome, Session,
    UserRecord, UserSource,
    profile::{AvatarSource, SaveTicket, UploadTicket, UploadedFile},
};
use tracing::error;

mod avatar;

use avatar::AvatarImages;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

#[derive(Debug, Clone)]
pub enum Message {
    Loaded(Result<UserRecord, String>),
    RetryPressed,
    EditPressed,
    FieldInput(Field, String),
    JobTitleSelected(JobTitle),
    PickAvatarPressed,
    AvatarPicked(Option<LocalFile>),
    AvatarUploaded(UploadTicket, Result<Vec<UploadedFile>, String>),
    AvatarFetched(String, Result<Vec<u8>, String>),
    SavePressed,
    Saved(SaveTicket, Result<(), String>),
    CancelPressed,
}

/// Action used for communicating with the parent component
pub enum Action {
    None,
    Run(Task<Message>),
    /// Show a transient notification
    Notify(&'static str),
}

pub enum State {
    Loading,
    Error(String),
    Loaded(ProfileForm),
}

#[derive(Debug, Clone)]
struct Connection {
    api: ApiClient,
    subject: String,
}

pub struct ProfilePage {
    cfg: Cfg,
    connection: Result<Connection, String>,
    state: State,
    images: AvatarImages,
    /// Problems with a picked file or a refused submit
    local_error: Option<String>,
}

impl ProfilePage {
    pub fn new(cfg: Cfg, session: Option<Session>) -> (Self, Task<Message>) {
        let connection = match session {
            Some(session) => ApiClient::new(&cfg.read())
                .map(|api| Connection {
                    api: api.with_token(session.token),
                    subject: session.subject,
                })
                .map_err(|err| err.to_string()),
            None => Err(format!(
                "Not signed in. Set {} to your subject identifier.",
                touchline_lib::session::SUBJECT_VAR
            )),
        };

        let mut page = Self {
            cfg,
            connection,
            state: State::Loading,
            images: AvatarImages::default(),
            local_error: None,
        };
        let task = page.load();

        (page, task)
    }

    fn load(&mut self) -> Task<Message> {
        match &self.connection {
            Ok(connection) => {
                self.state = State::Loading;
                let connection = connection.clone();
                Task::perform(
                    async move {
                        connection
                            .api
                            .fetch_user(&connection.subject)
                            .await
                            .map_err(|err| err.to_string())
                    },
                    Message::Loaded,
                )
            }
            Err(err) => {
                self.state = State::Error(err.clone());
                Task::none()
            }
        }
    }

    pub fn update(&mut self, message: Message) -> Action {
        let action = self.handle(message);
        // Drop the preview once the form no longer shows it
        if let State::Loaded(form) = &self.state {
            self.images.release_stale_preview(form);
        }
        action
    }

    fn handle(&mut self, message: Message) -> Action {
        if let Message::Loaded(result) = message {
            return match result {
                Ok(record) => {
                    if let State::Loaded(form) = &mut self.state {
                        form.load(&record);
                    } else {
                        self.state = State::Loaded(ProfileForm::new(&record));
                    }
                    Action::Run(self.sync_avatar())
                }
                Err(err) => {
                    error!("Failed to load profile: {err}");
                    self.state = State::Error(err);
                    Action::None
                }
            };
        }
        if let Message::RetryPressed = message {
            return Action::Run(self.load());
        }
        if let Message::AvatarFetched(url, result) = message {
            match result {
                Ok(bytes) => self.images.set_remote(url, bytes),
                Err(err) => error!("Failed to fetch avatar {url}: {err}"),
            }
            return Action::None;
        }

        let (State::Loaded(form), Ok(connection)) = (&mut self.state, &self.connection) else {
            return Action::None;
        };

        match message {
            Message::EditPressed => {
                form.begin_edit();
                Action::None
            }
            Message::FieldInput(field, value) => {
                form.set_field(field, value);
                Action::None
            }
            Message::JobTitleSelected(title) => {
                form.set_job_title(title);
                Action::None
            }
            Message::PickAvatarPressed => Action::Run(Task::perform(
                async {
                    let handle = AsyncFileDialog::new()
                        .add_filter("Images", &IMAGE_EXTENSIONS)
                        .pick_file()
                        .await?;
                    let bytes = handle.read().await;

                    Some(LocalFile::new(handle.file_name(), bytes))
                },
                Message::AvatarPicked,
            )),
            Message::AvatarPicked(None) => Action::None,
            Message::AvatarPicked(Some(file)) => match form.begin_upload(file) {
                Ok(request) => {
                    self.local_error = None;
                    self.images.set_preview(request.ticket, &request.file);

                    let api = connection.api.clone();
                    Action::Run(Task::perform(
                        async move {
                            let result = api
                                .upload(&request.file)
                                .await
                                .map_err(|err| err.to_string());
                            (request.ticket, result)
                        },
                        |(ticket, result)| Message::AvatarUploaded(ticket, result),
                    ))
                }
                Err(err) => {
                    self.local_error = Some(err.to_string());
                    Action::None
                }
            },
            Message::AvatarUploaded(ticket, result) => {
                if form.finish_upload(ticket, result) {
                    Action::Run(self.sync_avatar())
                } else {
                    Action::None
                }
            }
            Message::SavePressed => match form.begin_submit() {
                Ok(request) => {
                    self.local_error = None;

                    let api = connection.api.clone();
                    Action::Run(Task::perform(
                        async move {
                            let result = api
                                .update(&request.document_id, &request.payload)
                                .await
                                .map_err(|err| err.to_string());
                            (request.ticket, result)
                        },
                        |(ticket, result)| Message::Saved(ticket, result),
                    ))
                }
                Err(err) => {
                    self.local_error = Some(err.to_string());
                    Action::None
                }
            },
            Message::Saved(ticket, result) => match form.finish_submit(ticket, result) {
                SaveOutcome::Saved(notice) => Action::Notify(notice),
                SaveOutcome::Failed | SaveOutcome::Ignored => Action::None,
            },
            Message::CancelPressed => {
                form.cancel();
                self.local_error = None;
                Action::Run(self.sync_avatar())
            }
            // Handled above
            Message::Loaded(_) | Message::RetryPressed | Message::AvatarFetched(..) => {
                Action::None
            }
        }
    }

    /// Fetch the image the avatar should currently show, unless it is already cached.
    fn sync_avatar(&self) -> Task<Message> {
        let (State::Loaded(form), Ok(connection)) = (&self.state, &self.connection) else {
            return Task::none();
        };

        let url = {
            let cfg = self.cfg.read();
            match form
                .avatar()
                .source(&cfg.base_endpoint, &cfg.placeholder_avatar)
            {
                AvatarSource::Preview(_) => return Task::none(),
                AvatarSource::Remote(url) | AvatarSource::Placeholder(url) => url,
            }
        };
        if self.images.has_remote(&url) {
            return Task::none();
        }

        let api = connection.api.clone();
        Task::perform(
            async move {
                let result = api.fetch_image(&url).await.map_err(|err| err.to_string());
                (url, result)
            },
            |(url, result)| Message::AvatarFetched(url, result),
        )
    }

    pub fn view(&self) -> Element<'_, Message> {
        match &self.state {
            State::Loading => text("Loading profile...").into(),
            State::Error(e) => column![
                text(e).style(text::danger),
                button("Retry")
                    .on_press_maybe(self.connection.is_ok().then_some(Message::RetryPressed))
            ]
            .spacing(12)
            .into(),
            State::Loaded(form) => row![self.summary_card(form), self.details_card(form)]
                .spacing(24)
                .padding(20)
                .into(),
        }
    }

    fn summary_card<'a>(&'a self, form: &'a ProfileForm) -> Element<'a, Message> {
        let profile = form.profile();
        let cfg = self.cfg.read();
        let source = form
            .avatar()
            .source(&cfg.base_endpoint, &cfg.placeholder_avatar);

        let mut content = column![self.images.view(&source, profile.initials())]
            .spacing(8)
            .align_x(Alignment::Center);

        if form.is_editing() {
            content = content.push(
                button(text("Change avatar"))
                    .style(button::secondary)
                    .on_press_maybe((!form.is_busy()).then_some(Message::PickAvatarPressed)),
            );
        }
        for error in [form.upload_error(), self.local_error.as_deref()]
            .into_iter()
            .flatten()
        {
            content = content.push(text(error).size(13).style(text::danger));
        }

        content = content
            .push(text(profile.full_name()).size(20))
            .push(text(profile.titre_emploi.to_string()))
            .push(text(profile.location()).size(13));

        container(content)
            .padding(20)
            .width(Length::FillPortion(1))
            .style(container::bordered_box)
            .into()
    }

    fn details_card<'a>(&'a self, form: &'a ProfileForm) -> Element<'a, Message> {
        let profile = form.profile();
        let disabled = form.inputs_disabled();

        let mut content = column![text("Profile").size(16), rule::horizontal(1)].spacing(12);

        for field in Field::iter() {
            let input = text_input("", profile.get(field));
            let input = if disabled {
                input
            } else {
                input.on_input(move |value| Message::FieldInput(field, value))
            };

            content = content.push(
                row![text(field.label()).width(100), input]
                    .spacing(12)
                    .align_y(Alignment::Center),
            );
        }

        let job_title: Element<'_, Message> = if disabled {
            text(profile.titre_emploi.to_string()).into()
        } else {
            pick_list(
                JobTitle::iter().collect::<Vec<_>>(),
                Some(profile.titre_emploi),
                Message::JobTitleSelected,
            )
            .placeholder("Select job title")
            .width(Length::Fill)
            .into()
        };
        content = content.push(
            row![text("Job Title").width(100), job_title]
                .spacing(12)
                .align_y(Alignment::Center),
        );

        if let Some(error) = form.save_error() {
            content = content.push(text(error).style(text::danger));
        }

        content = content.push(space::vertical().height(12)).push(buttons(form));

        container(content)
            .padding(20)
            .width(Length::FillPortion(2))
            .style(container::bordered_box)
            .into()
    }
}

fn buttons(form: &ProfileForm) -> Element<'_, Message> {
    if form.is_editing() {
        let label = if form.is_saving() { "Saving..." } else { "Save" };

        row![
            button(text(label))
                .width(Length::Fill)
                .style(button::primary)
                .on_press_maybe((!form.is_save_disabled()).then_some(Message::SavePressed)),
            button(text("Cancel"))
                .style(button::secondary)
                .on_press_maybe((!form.is_saving()).then_some(Message::CancelPressed)),
        ]
        .spacing(12)
        .into()
    } else {
        button(text("Edit Profile"))
            .width(Length::Fill)
            .style(button::primary)
            .on_press(Message::EditPressed)
            .into()
    }
}
