//! Shared handles given to pages and modals.

use std::future::Future;

use tokio::sync::mpsc;
use trimtool_lib::TrimtoolClient;
use super::{Mailbox, Modal};
use crate::request::{Operation, OperationFailed, RequestController, RequestOptions};
use crate::settings::SettingsProvider;
use crate::toast::Toaster;
use crate::wakeup::WakeupSender;

/// Top-level navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Dashboard,
    Unprocessed,
    Processed,
    Trims,
    Aliases,
}

impl PageId {
    pub const ALL: [PageId; 5] = [
        PageId::Dashboard,
        PageId::Unprocessed,
        PageId::Processed,
        PageId::Trims,
        PageId::Aliases,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Unprocessed => "Unprocessed",
            Self::Processed => "Processed",
            Self::Trims => "Trims",
            Self::Aliases => "Aliases",
        }
    }

    /// Stable name stored in settings.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Unprocessed => "unprocessed",
            Self::Processed => "processed",
            Self::Trims => "trims",
            Self::Aliases => "aliases",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.slug() == slug)
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }
}

/// Requests from pages, modals and background tasks to the event loop.
pub enum Command {
    OpenModal(Box<dyn Modal>),
    CloseModal,
    Refresh(PageId),
    Quit,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenModal(modal) => write!(f, "OpenModal({})", modal.title()),
            Self::CloseModal => f.write_str("CloseModal"),
            Self::Refresh(page) => write!(f, "Refresh({:?})", page),
            Self::Quit => f.write_str("Quit"),
        }
    }
}

#[derive(Clone)]
pub struct Context {
    client: TrimtoolClient,
    wakeup: WakeupSender,
    commands: mpsc::UnboundedSender<Command>,
    settings: Option<SettingsProvider>,
}

impl Context {
    pub fn new(
        client: TrimtoolClient,
        wakeup: WakeupSender,
        commands: mpsc::UnboundedSender<Command>,
        settings: Option<SettingsProvider>,
    ) -> Self {
        Self {
            client,
            wakeup,
            commands,
            settings,
        }
    }

    pub fn client(&self) -> &TrimtoolClient {
        &self.client
    }

    pub fn settings(&self) -> Option<&SettingsProvider> {
        self.settings.as_ref()
    }

    /// A controller that wakes the event loop on every state change.
    pub fn controller<A, T>(&self, operation: Operation<A, T>, options: RequestOptions) -> RequestController<A, T>
    where
        A: Send + 'static,
        T: Clone + Send + 'static,
    {
        RequestController::new(operation, options).with_wakeup(self.wakeup.clone())
    }

    /// A mailbox whose posts wake the event loop.
    pub fn mailbox<M>(&self) -> Mailbox<M> {
        Mailbox::new(self.wakeup.clone())
    }

    pub fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::debug!("event loop gone; command dropped");
        }
        self.wakeup.send();
    }

    pub fn open_modal(&self, modal: impl Modal + 'static) {
        self.send(Command::OpenModal(Box::new(modal)));
    }

    pub fn close_modal(&self) {
        self.send(Command::CloseModal);
    }

    pub fn refresh(&self, page: PageId) {
        self.send(Command::Refresh(page));
    }

    /// Run a request in the background, toasting failures.
    ///
    /// `on_success` runs with the value; cancellation is silent. A failure
    /// without a message is reported as `fallback`.
    pub fn submit<A, T>(
        &self,
        controller: &RequestController<A, T>,
        args: A,
        fallback: &'static str,
        on_success: impl FnOnce(T) + Send + 'static,
    ) where
        A: Send + 'static,
        T: Clone + Send + 'static,
    {
        self.submit_with(controller, args, fallback, on_success, |_| {});
    }

    /// [`submit`](Self::submit) with a failure callback after the toast.
    pub fn submit_with<A, T>(
        &self,
        controller: &RequestController<A, T>,
        args: A,
        fallback: &'static str,
        on_success: impl FnOnce(T) + Send + 'static,
        on_failure: impl FnOnce(&OperationFailed) + Send + 'static,
    ) where
        A: Send + 'static,
        T: Clone + Send + 'static,
    {
        spawn_settled(controller.request(args), fallback, on_success, on_failure);
    }
}

fn spawn_settled<T: Send + 'static>(
    request: impl Future<Output = Result<Option<T>, OperationFailed>> + Send + 'static,
    fallback: &'static str,
    on_success: impl FnOnce(T) + Send + 'static,
    on_failure: impl FnOnce(&OperationFailed) + Send + 'static,
) {
    tokio::spawn(async move {
        match request.await {
            Ok(Some(value)) => on_success(value),
            Ok(None) => {}
            Err(failed) => {
                let message = if failed.message.trim().is_empty() {
                    fallback.to_string()
                } else {
                    failed.message.clone()
                };
                Toaster::global().error(message);
                on_failure(&failed);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slugs_round_trip() {
        for page in PageId::ALL {
            assert_eq!(PageId::from_slug(page.slug()), Some(page));
            assert_eq!(PageId::ALL[page.index()], page);
        }
        assert_eq!(PageId::from_slug("settings"), None);
    }
}
