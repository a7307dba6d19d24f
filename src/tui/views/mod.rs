pub mod composer;
pub mod error;
pub mod list;
pub mod reader;

use super::input::Key;
use super::screen::Terminal;
use crate::api::types::Mailbox;
use crate::controller::{Controller, Propagation};
use crate::surface::{Panel, Surface};
use composer::ComposerView;
use error::ErrorView;
use list::ListView;
use reader::ReaderView;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Continue,
    Quit,
}

/// Terminal rendering and key handling for one surface panel.
pub trait PanelView {
    fn render(&self, surface: &Surface, term: &mut Terminal) -> io::Result<()>;
    /// Keys the panel does not consume fall through to the global bindings.
    fn handle_key(&mut self, key: &Key, controller: &mut Controller) -> Propagation;
    fn status_hint(&self, surface: &Surface) -> String;
}

/// Per-panel terminal state (cursor, scroll, focus) plus routing by active panel.
pub struct Views {
    list: ListView,
    reader: ReaderView,
    composer: ComposerView,
    error: ErrorView,
    last_active: Panel,
}

impl Views {
    pub fn new() -> Self {
        Views {
            list: ListView::default(),
            reader: ReaderView::default(),
            composer: ComposerView::default(),
            error: ErrorView,
            last_active: Panel::MailboxList,
        }
    }

    fn view(&self, panel: Panel) -> &dyn PanelView {
        match panel {
            Panel::MailboxList => &self.list,
            Panel::Reader => &self.reader,
            Panel::Composer => &self.composer,
            Panel::Error => &self.error,
        }
    }

    fn view_mut(&mut self, panel: Panel) -> &mut dyn PanelView {
        match panel {
            Panel::MailboxList => &mut self.list,
            Panel::Reader => &mut self.reader,
            Panel::Composer => &mut self.composer,
            Panel::Error => &mut self.error,
        }
    }

    /// Reset per-panel state when the controller switches panels.
    pub fn sync(&mut self, surface: &Surface) {
        let active = surface.active();
        if active != self.last_active {
            match active {
                Panel::MailboxList => self.list.reset(),
                Panel::Reader => self.reader.reset(),
                Panel::Composer => self.composer.reset(),
                Panel::Error => {}
            }
            self.last_active = active;
        }
        self.list.follow(&surface.list);
    }

    pub fn render(&self, surface: &Surface, loading: bool, term: &mut Terminal) -> io::Result<()> {
        term.clear()?;
        let view = self.view(surface.active());
        view.render(surface, term)?;
        let hint = view.status_hint(surface);
        let status = if loading {
            format!(" Loading... |{}", hint)
        } else {
            hint
        };
        term.status_bar(&status)?;
        term.flush()
    }

    pub fn handle_key(&mut self, key: Key, controller: &mut Controller) -> UiAction {
        let active = controller.surface().active();
        if self.view_mut(active).handle_key(&key, controller) == Propagation::Stop {
            return UiAction::Continue;
        }

        match key {
            Key::Char('q') | Key::Ctrl('c') => return UiAction::Quit,
            Key::Char('i') | Key::Escape => controller.load_mailbox(Mailbox::Inbox),
            Key::Char('s') => controller.load_mailbox(Mailbox::Sent),
            Key::Char('a') => controller.load_mailbox(Mailbox::Archive),
            Key::Char('c') => controller.reset_compose_form(),
            _ => {}
        }
        UiAction::Continue
    }
}

/// Bindings shared by every panel except the composer.
pub const GLOBAL_HINT: &str = " i:inbox s:sent a:archive c:compose q:quit";
