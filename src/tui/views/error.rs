use super::{PanelView, GLOBAL_HINT};
use crate::controller::{Controller, Propagation};
use crate::surface::Surface;
use crate::tui::input::Key;
use crate::tui::screen::Terminal;
use std::io;

pub struct ErrorView;

impl PanelView for ErrorView {
    fn render(&self, surface: &Surface, term: &mut Terminal) -> io::Result<()> {
        term.move_to(1, 1)?;
        term.set_bold()?;
        term.write_line(&surface.error.heading)?;
        term.reset_attr()?;
        term.move_to(3, 1)?;
        term.write_line(&surface.error.message)
    }

    fn handle_key(&mut self, _key: &Key, _controller: &mut Controller) -> Propagation {
        Propagation::Continue
    }

    fn status_hint(&self, _surface: &Surface) -> String {
        GLOBAL_HINT.to_string()
    }
}
