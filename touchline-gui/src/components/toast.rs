use std::time::Duration;

use iced::{
    Element, Length, Task,
    widget::{button, container, row, text},
};

#[derive(Debug, Clone)]
pub enum Message {
    Expired(u64),
    DismissPressed,
}

#[derive(Debug, Clone)]
struct Toast {
    id: u64,
    message: String,
}

/// A single transient notification shown at the top of the window.
#[derive(Debug, Default)]
pub struct Toasts {
    current: Option<Toast>,
    next_id: u64,
}

impl Toasts {
    /// Show `message`, replacing whatever is currently shown, and hide it after `duration`.
    pub fn push(&mut self, message: impl Into<String>, duration: Duration) -> Task<Message> {
        self.next_id = self.next_id.wrapping_add(1);
        let id = self.next_id;
        self.current = Some(Toast {
            id,
            message: message.into(),
        });

        Task::perform(
            async move { tokio::time::sleep(duration).await },
            move |()| Message::Expired(id),
        )
    }

    pub fn update(&mut self, message: Message) {
        match message {
            // A newer toast may have replaced the one this timer belongs to
            Message::Expired(id) => {
                if self.current.as_ref().is_some_and(|t| t.id == id) {
                    self.current = None;
                }
            }
            Message::DismissPressed => self.current = None,
        }
    }

    pub fn view(&self) -> Option<Element<'_, Message>> {
        let toast = self.current.as_ref()?;

        Some(
            container(
                container(
                    row![
                        text(&toast.message).style(text::success),
                        button(text("×")).style(button::text).on_press(Message::DismissPressed)
                    ]
                    .spacing(12),
                )
                .padding(12)
                .style(container::rounded_box),
            )
            .center_x(Length::Fill)
            .padding(20)
            .into(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_expired_only_hides_own_toast() {
        let mut toasts = Toasts::default();
        let _ = toasts.push("first", Duration::from_secs(3));
        let _ = toasts.push("second", Duration::from_secs(3));

        toasts.update(Message::Expired(1));
        assert_eq!(toasts.current.as_ref().unwrap().message, "second");

        toasts.update(Message::Expired(2));
        assert!(toasts.current.is_none());
    }

    #[test]
    fn test_dismiss() {
        let mut toasts = Toasts::default();
        let _ = toasts.push("saved", Duration::from_secs(3));

        toasts.update(Message::DismissPressed);

        assert!(toasts.view().is_none());
    }
}
