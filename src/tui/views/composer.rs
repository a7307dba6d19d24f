use super::PanelView;
use crate::controller::{Controller, Propagation};
use crate::surface::{ComposeField, ComposerPanel, Surface, Validity};
use crate::tui::input::Key;
use crate::tui::screen::Terminal;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    Plain,
    Focused,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormLine {
    row: u16,
    col: u16,
    text: String,
    style: LineStyle,
}

pub struct ComposerView {
    focus: ComposeField,
}

impl Default for ComposerView {
    fn default() -> Self {
        ComposerView {
            focus: ComposeField::Recipients,
        }
    }
}

impl ComposerView {
    pub fn reset(&mut self) {
        self.focus = ComposeField::Recipients;
    }

    fn edit(&self, composer: &mut ComposerPanel, key: &Key) -> bool {
        let value = &mut composer.field_mut(self.focus).value;
        match key {
            Key::Char(c) => value.push(*c),
            Key::Backspace => {
                value.pop();
            }
            Key::Enter if self.focus.is_multiline() => value.push('\n'),
            _ => return false,
        }
        true
    }

    fn label(field: ComposeField, composer: &ComposerPanel) -> String {
        let mark = match composer.field(field).validity {
            Validity::Invalid => " (!)",
            _ => "",
        };
        format!("{}{}:", field.label(), mark)
    }
}

impl ComposerView {
    /// Lines of the form below the title. Nothing lands on `bottom` or below,
    /// where the status bar lives.
    fn layout(&self, composer: &ComposerPanel, bottom: u16) -> Vec<FormLine> {
        let mut lines = Vec::new();
        let mut push = |row: u16, col: u16, text: String, style: LineStyle| {
            if row < bottom {
                lines.push(FormLine { row, col, text, style });
            }
        };

        let mut row = 3u16;
        for field in ComposeField::ALL {
            let style = if field == self.focus {
                LineStyle::Focused
            } else {
                LineStyle::Plain
            };
            let label = Self::label(field, composer);
            let value = &composer.field(field).value;

            if field.is_multiline() {
                push(row, 1, label, style);
                for text in value.split('\n') {
                    row = row.saturating_add(1);
                    push(row, 3, text.to_string(), LineStyle::Plain);
                }
            } else {
                push(row, 1, format!("{} {}", label, value), style);
            }

            if field == ComposeField::Recipients {
                if let Some(ref alert) = composer.recipients_alert {
                    row = row.saturating_add(1);
                    push(row, 3, alert.clone(), LineStyle::Alert);
                }
            }
            row = row.saturating_add(1);
        }
        lines
    }
}

impl PanelView for ComposerView {
    fn render(&self, surface: &Surface, term: &mut Terminal) -> io::Result<()> {
        let composer = &surface.composer;

        term.move_to(1, 1)?;
        term.set_bold()?;
        term.write_line(&composer.title)?;
        term.reset_attr()?;

        for line in self.layout(composer, term.rows) {
            term.move_to(line.row, line.col)?;
            match line.style {
                LineStyle::Plain => {}
                LineStyle::Focused => term.set_reverse()?,
                LineStyle::Alert => term.set_bold()?,
            }
            term.write_line(&line.text)?;
            term.reset_attr()?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: &Key, controller: &mut Controller) -> Propagation {
        match key {
            Key::Tab => {
                self.focus = self.focus.next();
                Propagation::Stop
            }
            Key::Enter if !self.focus.is_multiline() => {
                self.focus = self.focus.next();
                Propagation::Stop
            }
            Key::Ctrl('s') => controller.submit_compose(),
            _ => {
                if self.edit(controller.composer_mut(), key) {
                    Propagation::Stop
                } else {
                    Propagation::Continue
                }
            }
        }
    }

    fn status_hint(&self, _surface: &Surface) -> String {
        " Tab:next field  Ctrl-S:send  Esc:inbox  Ctrl-C:quit".to_string()
    }
}
