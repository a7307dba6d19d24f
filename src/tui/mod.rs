pub mod input;
pub mod screen;
pub mod views;

use crate::backend::{BackendCommand, BackendResponse};
use crate::controller::Controller;
use input::read_key;
use screen::Terminal;
use std::io;
use std::sync::mpsc;
use views::{UiAction, Views};

pub fn run(
    cmd_tx: mpsc::Sender<BackendCommand>,
    resp_rx: mpsc::Receiver<BackendResponse>,
) -> io::Result<()> {
    let mut term = Terminal::new()?;
    let mut controller = Controller::new(cmd_tx.clone());
    let mut views = Views::new();

    controller.start();
    views.render(controller.surface(), !controller.is_idle(), &mut term)?;

    loop {
        let mut needs_render = term.check_resize();

        // Apply backend responses in the order they completed.
        while let Ok(response) = resp_rx.try_recv() {
            controller.handle_response(response);
            needs_render = true;
        }

        if let Some(key) = read_key() {
            if views.handle_key(key, &mut controller) == UiAction::Quit {
                break;
            }
            needs_render = true;
        }

        if needs_render {
            views.sync(controller.surface());
            views.render(controller.surface(), !controller.is_idle(), &mut term)?;
        }
    }

    let _ = cmd_tx.send(BackendCommand::Shutdown);
    Ok(())
}
