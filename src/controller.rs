//! View-state controller: turns user actions into backend requests and
//! backend responses into surface updates.
//!
//! Every navigating action starts a new generation. Requests carry the
//! generation they were issued under, and responses from an older
//! generation are dropped, so a slow reply can never repaint a panel the
//! user has already left.

use crate::api::types::{FlagUpdate, Mailbox, Message, SubmitOutcome};
use crate::backend::{BackendCommand, BackendResponse, Continuation, FetchPurpose, RequestToken};
use crate::surface::{ComposeField, ComposerPanel, Panel, Surface};
use std::fmt::Display;
use std::sync::mpsc;

/// Whether an event should continue to the default handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

pub struct Controller {
    cmd_tx: mpsc::Sender<BackendCommand>,
    surface: Surface,
    generation: u64,
    in_flight: usize,
}

impl Controller {
    pub fn new(cmd_tx: mpsc::Sender<BackendCommand>) -> Self {
        Controller {
            cmd_tx,
            surface: Surface::default(),
            generation: 0,
            in_flight: 0,
        }
    }

    /// Initial state: the inbox.
    pub fn start(&mut self) {
        self.load_mailbox(Mailbox::Inbox);
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Number of requests sent whose responses have not come back yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    fn navigate(&mut self) -> RequestToken {
        self.generation += 1;
        RequestToken(self.generation)
    }

    fn current(&self) -> RequestToken {
        RequestToken(self.generation)
    }

    fn send(&mut self, cmd: BackendCommand) {
        match self.cmd_tx.send(cmd) {
            Ok(()) => self.in_flight += 1,
            Err(_) => self.show_error(&"backend is not running"),
        }
    }

    pub fn load_mailbox(&mut self, mailbox: Mailbox) {
        log_info!("Loading mailbox {}", mailbox);
        let token = self.navigate();
        self.send(BackendCommand::FetchMailbox { token, mailbox });
    }

    pub fn read_message(&mut self, id: &str, hide_archive: bool) {
        log_info!("Opening message {}", id);
        let token = self.navigate();
        self.send(BackendCommand::FetchMessage {
            token,
            id: id.to_string(),
            purpose: FetchPurpose::Read { hide_archive },
        });
    }

    /// Activate row `index` of the mailbox list. Returns false if there is no such row.
    pub fn open_row(&mut self, index: usize) -> bool {
        match self.surface.list.rows.get(index).map(|row| row.open.clone()) {
            Some(open) => {
                self.read_message(&open.id, open.hide_archive);
                true
            }
            None => false,
        }
    }

    /// The single mutation primitive for message flags.
    pub fn update_flags(
        &mut self,
        id: &str,
        read: bool,
        archived: bool,
        on_success: Option<Continuation>,
    ) {
        let token = self.current();
        self.send(BackendCommand::UpdateFlags {
            token,
            id: id.to_string(),
            flags: FlagUpdate { read, archived },
            then: on_success,
        });
    }

    pub fn toggle_archive(&mut self, id: &str, current_archived: bool) {
        log_info!("Setting archived={} on {}", !current_archived, id);
        self.navigate();
        self.update_flags(
            id,
            true,
            !current_archived,
            Some(Continuation::LoadMailbox(Mailbox::Inbox)),
        );
    }

    /// Run the reader's archive control. Returns false if the reader shows none.
    pub fn toggle_archive_from_reader(&mut self) -> bool {
        if !self.surface.is_visible(Panel::Reader) {
            return false;
        }
        match self.surface.reader.archive.clone() {
            Some(control) => {
                self.toggle_archive(&control.id, control.archived);
                true
            }
            None => false,
        }
    }

    /// Run the reader's reply control. Returns false if the reader shows none.
    pub fn reply_from_reader(&mut self) -> bool {
        if !self.surface.is_visible(Panel::Reader) {
            return false;
        }
        match self.surface.reader.reply.clone() {
            Some(control) => {
                self.prefill_reply(&control.id);
                true
            }
            None => false,
        }
    }

    pub fn reset_compose_form(&mut self) {
        self.navigate();
        self.surface.composer.clear();
        self.surface.show(Panel::Composer);
    }

    pub fn prefill_reply(&mut self, id: &str) {
        log_info!("Preparing reply to {}", id);
        let token = self.navigate();
        self.send(BackendCommand::FetchMessage {
            token,
            id: id.to_string(),
            purpose: FetchPurpose::Reply,
        });
    }

    pub fn set_field(&mut self, field: ComposeField, value: &str) {
        self.surface.composer.field_mut(field).value = value.to_string();
    }

    /// Direct access to the form for keystroke-level editing.
    pub fn composer_mut(&mut self) -> &mut ComposerPanel {
        &mut self.surface.composer
    }

    /// Validate and send the form. Always stops propagation: the form is
    /// never submitted by anything but this call.
    pub fn submit_compose(&mut self) -> Propagation {
        if !self.surface.composer.validate() {
            log_debug!("Compose form invalid, not sending");
            return Propagation::Stop;
        }
        let draft = self.surface.composer.draft();
        let token = self.navigate();
        self.send(BackendCommand::Submit { token, draft });
        Propagation::Stop
    }

    pub fn show_error(&mut self, err: &dyn Display) {
        log_error!("{}", err);
        let panel = &mut self.surface.error;
        panel.message = err.to_string();
        panel.occurrences += 1;
        self.surface.show(Panel::Error);
    }

    fn render_reader(&mut self, message: &Message, hide_archive: bool) {
        self.surface.reader.render(message, hide_archive);
        if !message.read {
            self.update_flags(&message.id, true, message.archived, None);
        }
        self.surface.show(Panel::Reader);
    }

    /// Apply a backend response. Returns true if the surface changed.
    pub fn handle_response(&mut self, response: BackendResponse) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        if response.token() < self.current() {
            match response.error() {
                Some(e) => log_error!("{} (stale, not displayed)", e),
                None => log_debug!(
                    "Dropping stale response from generation {}",
                    response.token().0
                ),
            }
            return false;
        }

        match response {
            BackendResponse::Mailbox { mailbox, result, .. } => match result {
                Ok(messages) => {
                    self.surface.list.populate(mailbox, &messages);
                    self.surface.show(Panel::MailboxList);
                }
                Err(e) => self.show_error(&e),
            },
            BackendResponse::Message {
                purpose, result, ..
            } => match (*result, purpose) {
                (Ok(message), FetchPurpose::Read { hide_archive }) => {
                    self.render_reader(&message, hide_archive)
                }
                (Ok(message), FetchPurpose::Reply) => {
                    self.surface.composer.prefill_reply(&message);
                    self.surface.show(Panel::Composer);
                }
                (Err(e), _) => self.show_error(&e),
            },
            BackendResponse::FlagsUpdated {
                id, then, result, ..
            } => match result {
                Ok(()) => {
                    log_debug!("Flags updated on {}", id);
                    match then {
                        Some(Continuation::LoadMailbox(mailbox)) => self.load_mailbox(mailbox),
                        None => return false,
                    }
                }
                Err(e) => self.show_error(&e),
            },
            BackendResponse::Submitted { result, .. } => match result {
                Ok(SubmitOutcome::Accepted) => {
                    log_info!("Message sent");
                    self.load_mailbox(Mailbox::Sent);
                }
                Ok(SubmitOutcome::Rejected(reason)) => {
                    log_info!("Message rejected by store: {}", reason);
                    self.surface.composer.reject(reason);
                }
                Err(e) => self.show_error(&e),
            },
        }
        true
    }
}
