//! Application shell: navigation, modal stack and the event loop.

mod context;
mod mailbox;

pub use context::{Command, Context, PageId};
pub use mailbox::Mailbox;

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::sleep_until;

use crate::error::AppError;
use crate::pages;
use crate::settings;
use crate::toast::Toaster;
use crate::ui::{Buffer, Rect, Style, Terminal, theme, widgets};
use crate::wakeup::WakeupReceiver;

/// Spinner frame interval while something is loading.
const ANIMATION_INTERVAL: Duration = Duration::from_millis(60);

/// Per-frame drawing inputs.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    /// Time since startup; drives spinners.
    pub phase: Duration,
}

/// A top-level screen.
pub trait Page {
    fn id(&self) -> PageId;

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame);

    /// Returns whether the key was consumed.
    fn handle_key(&mut self, key: &KeyEvent) -> bool;

    /// Re-issue the page's data requests.
    fn refresh(&mut self);

    /// Binding hints for the footer.
    fn hints(&self) -> Vec<(&'static str, &'static str)>;

    /// True while a text field has focus; global keys are not intercepted.
    fn captures_input(&self) -> bool {
        false
    }

    /// Settle debounced input and apply background results.
    fn tick(&mut self, _now: Instant) {}

    /// Next instant [`tick`](Self::tick) has work to do.
    fn deadline(&self) -> Option<Instant> {
        None
    }

    /// True while a spinner is visible.
    fn is_busy(&self) -> bool {
        false
    }
}

/// What a modal wants after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Handled,
    Close,
}

/// A dialog or drawer drawn above the active page. Receives keys first.
pub trait Modal: Send {
    fn title(&self) -> String;

    fn draw(&self, buf: &mut Buffer, area: Rect, frame: &Frame);

    fn handle_key(&mut self, key: &KeyEvent) -> ModalAction;

    fn tick(&mut self, _now: Instant) {}

    fn deadline(&self) -> Option<Instant> {
        None
    }

    fn is_busy(&self) -> bool {
        false
    }
}

pub struct App {
    ctx: Context,
    pages: Vec<Box<dyn Page>>,
    active: PageId,
    modals: Vec<Box<dyn Modal>>,
    started: Instant,
    running: bool,
}

impl App {
    /// Build every page and issue their initial requests.
    pub fn new(ctx: Context, initial: PageId) -> Self {
        let pages = pages::build(&ctx);
        Self {
            ctx,
            pages,
            active: initial,
            modals: Vec::new(),
            started: Instant::now(),
            running: true,
        }
    }

    pub fn active(&self) -> PageId {
        self.active
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn modal_depth(&self) -> usize {
        self.modals.len()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn navigate(&mut self, page: PageId) {
        if page == self.active {
            return;
        }
        log::debug!("navigate {:?} -> {:?}", self.active, page);
        self.active = page;
        if let Some(settings) = self.ctx.settings() {
            settings.save(&settings::LAST_PAGE, page.slug().to_string());
        }
    }

    fn page(&self) -> &dyn Page {
        self.pages[self.active.index()].as_ref()
    }

    fn page_mut(&mut self) -> &mut dyn Page {
        self.pages[self.active.index()].as_mut()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        if let Some(modal) = self.modals.last_mut() {
            if modal.handle_key(&key) == ModalAction::Close
                && let Some(closed) = self.modals.pop()
            {
                log::debug!("modal closed: {}", closed.title());
            }
            return;
        }

        if self.page().captures_input() {
            self.page_mut().handle_key(&key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.navigate(PageId::ALL[index]);
            }
            KeyCode::Tab => {
                let next = (self.active.index() + 1) % PageId::ALL.len();
                self.navigate(PageId::ALL[next]);
            }
            KeyCode::BackTab => {
                let count = PageId::ALL.len();
                let prev = (self.active.index() + count - 1) % count;
                self.navigate(PageId::ALL[prev]);
            }
            _ => {
                if !self.page_mut().handle_key(&key) && key.code == KeyCode::Esc {
                    let toaster = Toaster::global();
                    if let Some(newest) = toaster.snapshot().last() {
                        toaster.dismiss(newest.id);
                    }
                }
            }
        }
    }

    pub fn apply(&mut self, command: Command) {
        log::debug!("command: {:?}", command);
        match command {
            Command::OpenModal(modal) => self.modals.push(modal),
            Command::CloseModal => {
                self.modals.pop();
            }
            Command::Refresh(page) => self.pages[page.index()].refresh(),
            Command::Quit => self.running = false,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        for page in &mut self.pages {
            page.tick(now);
        }
        for modal in &mut self.modals {
            modal.tick(now);
        }
    }

    fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let busy = self.page().is_busy() || self.modals.iter().any(|m| m.is_busy());
        let animation = busy.then(|| now + ANIMATION_INTERVAL);

        self.pages
            .iter()
            .filter_map(|p| p.deadline())
            .chain(self.modals.iter().filter_map(|m| m.deadline()))
            .chain(Toaster::global().next_expiry())
            .chain(animation)
            .min()
    }

    pub fn draw(&self, buf: &mut Buffer, now: Instant) {
        let frame = Frame {
            phase: now.saturating_duration_since(self.started),
        };
        let area = buf.area();
        buf.fill(area, Style::new().bg(theme::BACKGROUND));

        let (header, rest) = area.split_top(2);
        let (body, footer) = rest.split_bottom(1);

        let used = buf.put_str(header.x + 1, header.y, "TrimTool", theme::title(), header.width);
        let labels: Vec<&str> = PageId::ALL.iter().map(|p| p.label()).collect();
        let tabs = Rect::new(header.x + used + 3, header.y, header.width.saturating_sub(used + 3), 1);
        widgets::tabs(buf, tabs, &labels, self.active.index());

        self.page().draw(buf, body.inset(1, 0), &frame);
        for modal in &self.modals {
            modal.draw(buf, body, &frame);
        }

        let hints = if self.modals.is_empty() {
            let mut hints = self.page().hints();
            if !self.page().captures_input() {
                hints.extend([("1-5", "pages"), ("q", "quit")]);
            }
            hints
        } else {
            vec![("Esc", "close")]
        };
        widgets::hints(buf, footer.inset(1, 0), &hints);
        widgets::toasts(buf, body, &Toaster::global().snapshot());
    }

    /// Run until quit.
    ///
    /// Sleeps until a terminal event, a command, a wakeup, a toast change or
    /// the next deadline; redraws after each.
    pub async fn run(
        mut self,
        terminal: &mut Terminal,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut wakeup: WakeupReceiver,
    ) -> Result<(), AppError> {
        let mut events = EventStream::new();
        let mut toasts = Toaster::global().subscribe();
        log::info!("event loop started on {:?}", self.active);

        while self.running {
            let now = Instant::now();
            Toaster::global().prune(now);
            self.tick(now);
            terminal.draw(|buf| self.draw(buf, now))?;

            let deadline = self.next_deadline(now);
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Some(Ok(Event::Resize(..))) => terminal.invalidate(),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        log::warn!("terminal event stream ended");
                        break;
                    }
                },
                Some(command) = commands.recv() => {
                    self.apply(command);
                    while let Ok(command) = commands.try_recv() {
                        self.apply(command);
                    }
                }
                Some(()) = wakeup.recv() => wakeup.drain(),
                Ok(()) = toasts.changed() => {}
                _ = sleep_until_optional(deadline) => {}
            }
        }

        log::info!("event loop stopped");
        Ok(())
    }
}

async fn sleep_until_optional(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending::<()>().await,
    }
}
