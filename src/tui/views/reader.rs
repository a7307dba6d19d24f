use super::{PanelView, GLOBAL_HINT};
use crate::controller::{Controller, Propagation};
use crate::surface::{ReaderPanel, Surface};
use crate::tui::input::Key;
use crate::tui::screen::Terminal;
use std::io;

const HEADER_LINES: usize = 4;

#[derive(Default)]
pub struct ReaderView {
    scroll: usize,
}

impl ReaderView {
    pub fn reset(&mut self) {
        self.scroll = 0;
    }

    fn lines(reader: &ReaderPanel) -> Vec<String> {
        let mut lines = vec![
            format!("From: {}", reader.sender),
            format!("To: {}", reader.recipients),
            format!("Date: {}", reader.timestamp),
            format!("Subject: {}", reader.subject),
            String::new(),
        ];
        lines.extend(reader.body.lines().map(str::to_string));
        lines
    }
}

impl PanelView for ReaderView {
    fn render(&self, surface: &Surface, term: &mut Terminal) -> io::Result<()> {
        let visible_rows = (term.rows as usize).saturating_sub(1);
        let lines = Self::lines(&surface.reader);

        for (i, line) in lines
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(visible_rows)
        {
            term.move_to(1 + (i - self.scroll) as u16, 1)?;
            if i < HEADER_LINES {
                term.set_bold()?;
                term.write_line(line)?;
                term.reset_attr()?;
            } else {
                term.write_line(line)?;
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: &Key, controller: &mut Controller) -> Propagation {
        let total = Self::lines(&controller.surface().reader).len();
        match key {
            Key::Char('j') | Key::Char('n') | Key::Down => {
                if self.scroll + 1 < total {
                    self.scroll += 1;
                }
            }
            Key::Char('k') | Key::Char('p') | Key::Up => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            Key::PageDown | Key::Char(' ') => {
                self.scroll = (self.scroll + 20).min(total.saturating_sub(1));
            }
            Key::PageUp => self.scroll = self.scroll.saturating_sub(20),
            Key::Home => self.scroll = 0,
            Key::End => self.scroll = total.saturating_sub(1),
            Key::Char('A') => {
                controller.toggle_archive_from_reader();
            }
            Key::Char('r') => {
                controller.reply_from_reader();
            }
            _ => return Propagation::Continue,
        }
        Propagation::Stop
    }

    fn status_hint(&self, surface: &Surface) -> String {
        let archive = match surface.reader.archive {
            Some(ref control) => format!(" A:{}", control.label),
            None => String::new(),
        };
        format!(" r:reply{} j/k:scroll |{}", archive, GLOBAL_HINT)
    }
}
