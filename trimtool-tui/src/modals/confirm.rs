//! Yes/no confirmation dialog.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{Frame, Modal, ModalAction};
use crate::ui::{Buffer, Rect, theme, widgets};

type OnConfirm = Box<dyn FnOnce() + Send>;

/// Runs its callback on `y`/Enter; `n`/Esc closes without it.
///
/// ```ignore
/// let mailbox = self.mailbox.clone();
/// ctx.open_modal(
///     ConfirmModal::new("Delete this alias?", move || mailbox.post(Msg::Delete(id)))
///         .title("Delete Alias"),
/// );
/// ```
pub struct ConfirmModal {
    title: String,
    message: String,
    on_confirm: Option<OnConfirm>,
}

impl ConfirmModal {
    pub fn new(message: impl Into<String>, on_confirm: impl FnOnce() + Send + 'static) -> Self {
        Self {
            title: "Confirm".into(),
            message: message.into(),
            on_confirm: Some(Box::new(on_confirm)),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Modal for ConfirmModal {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn draw(&self, buf: &mut Buffer, area: Rect, _frame: &Frame) {
        let inner = widgets::modal(buf, area, 60, 9, &self.title);
        let (body, actions) = inner.split_bottom(1);
        widgets::paragraph(buf, body.inset(0, 1), &self.message, theme::text());
        widgets::hints(buf, actions, &[("n", "Cancel"), ("y", "Confirm")]);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(confirm) = self.on_confirm.take() {
                    confirm();
                }
                ModalAction::Close
            }
            KeyCode::Char('n') | KeyCode::Esc => ModalAction::Close,
            _ => ModalAction::Handled,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn counting() -> (ConfirmModal, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let modal = ConfirmModal::new("Delete?", move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (modal, hits)
    }

    #[test]
    fn test_confirm_runs_callback_once() {
        let (mut modal, hits) = counting();
        assert_eq!(modal.handle_key(&key(KeyCode::Char('x'))), ModalAction::Handled);
        assert_eq!(modal.handle_key(&key(KeyCode::Char('y'))), ModalAction::Close);
        assert_eq!(modal.handle_key(&key(KeyCode::Enter)), ModalAction::Close);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_skips_callback() {
        let (mut modal, hits) = counting();
        assert_eq!(modal.handle_key(&key(KeyCode::Esc)), ModalAction::Close);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_draw() {
        let modal = ConfirmModal::new("Are you sure you want to delete the alias \"se\"?", || {})
            .title("Delete Alias");
        let mut buf = Buffer::new(80, 20);
        let area = buf.area();
        modal.draw(&mut buf, area, &Frame { phase: Default::default() });
        let text = buf.text();
        assert!(text.contains("Delete Alias"));
        assert!(text.contains("Are you sure"));
        assert!(text.contains("y Confirm"));
    }
}
