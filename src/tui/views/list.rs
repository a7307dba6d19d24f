use super::{PanelView, GLOBAL_HINT};
use crate::api::types::Mailbox;
use crate::controller::{Controller, Propagation};
use crate::surface::{ListPanel, Surface, SummaryRow};
use crate::tui::input::Key;
use crate::tui::screen::Terminal;
use std::io;

#[derive(Default)]
pub struct ListView {
    cursor: usize,
    mailbox: Option<Mailbox>,
}

impl ListView {
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Keep the cursor on a real row, and back at the top for a different mailbox.
    pub fn follow(&mut self, list: &ListPanel) {
        if self.mailbox != Some(list.mailbox) {
            self.mailbox = Some(list.mailbox);
            self.cursor = 0;
        }
        if self.cursor >= list.rows.len() {
            self.cursor = list.rows.len().saturating_sub(1);
        }
    }

    fn format_row(row: &SummaryRow) -> String {
        let unread = if row.read { ' ' } else { 'N' };
        let who = match (&row.sender, &row.recipients) {
            (Some(sender), Some(recipients)) => format!("{} -> {}", sender, recipients),
            (Some(sender), None) => sender.clone(),
            (None, Some(recipients)) => format!("To: {}", recipients),
            (None, None) => String::new(),
        };
        format!(
            "{} {:<22} {:<32} {}",
            unread,
            clip(&row.timestamp, 22),
            clip(&who, 32),
            row.subject
        )
    }
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

impl PanelView for ListView {
    fn render(&self, surface: &Surface, term: &mut Terminal) -> io::Result<()> {
        let list = &surface.list;

        term.move_to(1, 1)?;
        term.set_bold()?;
        term.write_line(&format!("mailpane - {}", list.heading))?;
        term.reset_attr()?;

        term.move_to(2, 1)?;
        term.write_line(&"-".repeat(term.cols as usize))?;

        if let Some(ref marker) = list.empty_marker {
            term.move_to(3, 1)?;
            return term.write_line(marker);
        }

        let max_items = (term.rows as usize).saturating_sub(3);
        let scroll_offset = if self.cursor >= max_items {
            self.cursor - max_items + 1
        } else {
            0
        };

        for (i, row) in list
            .rows
            .iter()
            .enumerate()
            .skip(scroll_offset)
            .take(max_items)
        {
            term.move_to(3 + (i - scroll_offset) as u16, 1)?;
            if i == self.cursor {
                term.set_reverse()?;
            }
            if row.read {
                term.set_dim()?;
            } else {
                term.set_bold()?;
            }
            term.write_line(&Self::format_row(row))?;
            term.reset_attr()?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: &Key, controller: &mut Controller) -> Propagation {
        let rows = controller.surface().list.rows.len();
        match key {
            Key::Char('j') | Key::Char('n') | Key::Down => {
                if self.cursor + 1 < rows {
                    self.cursor += 1;
                }
            }
            Key::Char('k') | Key::Char('p') | Key::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            Key::PageDown => self.cursor = (self.cursor + 20).min(rows.saturating_sub(1)),
            Key::PageUp => self.cursor = self.cursor.saturating_sub(20),
            Key::Home => self.cursor = 0,
            Key::End => self.cursor = rows.saturating_sub(1),
            Key::Enter => {
                controller.open_row(self.cursor);
            }
            _ => return Propagation::Continue,
        }
        Propagation::Stop
    }

    fn status_hint(&self, surface: &Surface) -> String {
        let rows = surface.list.rows.len();
        if rows == 0 {
            GLOBAL_HINT.to_string()
        } else {
            format!(" {}/{} | RET:open{}", self.cursor + 1, rows, GLOBAL_HINT)
        }
    }
}
