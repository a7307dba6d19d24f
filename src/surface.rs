//! The presentation model the controller writes to. Front ends only read it
//! (plus composer field edits) and turn it into pixels or JSON.

use crate::api::types::{Mailbox, Message, NewMessage};
use crate::compose;
use serde::Serialize;

pub const NO_SUBJECT: &str = "(no subject)";
pub const NO_BODY: &str = "(no body)";
pub const NO_MESSAGES: &str = "No messages found.";
pub const ERROR_HEADING: &str = "A Problem Occurred.";
pub const NEW_MESSAGE_TITLE: &str = "New Message";
pub const REPLY_TITLE: &str = "Reply to Email";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    MailboxList,
    Reader,
    Composer,
    Error,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::MailboxList, Panel::Reader, Panel::Composer, Panel::Error];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    active: Panel,
    pub list: ListPanel,
    pub reader: ReaderPanel,
    pub composer: ComposerPanel,
    pub error: ErrorPanel,
}

impl Default for Surface {
    fn default() -> Self {
        Surface {
            active: Panel::MailboxList,
            list: ListPanel::default(),
            reader: ReaderPanel::default(),
            composer: ComposerPanel::default(),
            error: ErrorPanel::default(),
        }
    }
}

impl Surface {
    pub fn active(&self) -> Panel {
        self.active
    }

    /// Make `panel` the only visible panel.
    pub fn show(&mut self, panel: Panel) {
        self.active = panel;
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.active == panel
    }
}

// --- Mailbox list ---

/// Context a list row hands to the reader when activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenAction {
    pub id: String,
    pub hide_archive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Hidden in `sent`, where it is always the user.
    pub sender: Option<String>,
    /// Hidden in `inbox`.
    pub recipients: Option<String>,
    pub subject: String,
    pub timestamp: String,
    pub read: bool,
    pub open: OpenAction,
}

impl SummaryRow {
    fn from_message(mailbox: Mailbox, message: &Message) -> Self {
        SummaryRow {
            sender: (mailbox != Mailbox::Sent).then(|| message.sender.clone()),
            recipients: (mailbox != Mailbox::Inbox).then(|| message.recipients.clone()),
            subject: or_placeholder(&message.subject, NO_SUBJECT),
            timestamp: message.timestamp.clone(),
            read: message.read,
            open: OpenAction {
                id: message.id.clone(),
                hide_archive: mailbox == Mailbox::Sent,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPanel {
    pub mailbox: Mailbox,
    pub heading: String,
    pub rows: Vec<SummaryRow>,
    pub empty_marker: Option<String>,
}

impl Default for ListPanel {
    fn default() -> Self {
        ListPanel {
            mailbox: Mailbox::Inbox,
            heading: Mailbox::Inbox.heading().to_string(),
            rows: Vec::new(),
            empty_marker: None,
        }
    }
}

impl ListPanel {
    /// Replace the panel contents with `messages`, in store order.
    pub fn populate(&mut self, mailbox: Mailbox, messages: &[Message]) {
        self.mailbox = mailbox;
        self.heading = mailbox.heading().to_string();
        self.rows = messages
            .iter()
            .map(|m| SummaryRow::from_message(mailbox, m))
            .collect();
        self.empty_marker = self.rows.is_empty().then(|| NO_MESSAGES.to_string());
    }
}

// --- Reader ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveControl {
    pub id: String,
    pub archived: bool,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyControl {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReaderPanel {
    pub sender: String,
    pub recipients: String,
    pub timestamp: String,
    pub subject: String,
    pub body: String,
    /// Absent when the message was opened from `sent`.
    pub archive: Option<ArchiveControl>,
    pub reply: Option<ReplyControl>,
}

impl ReaderPanel {
    pub fn render(&mut self, message: &Message, hide_archive: bool) {
        self.sender = message.sender.clone();
        self.recipients = message.recipients.clone();
        self.timestamp = message.timestamp.clone();
        self.subject = or_placeholder(&message.subject, NO_SUBJECT);
        self.body = or_placeholder(&message.body, NO_BODY);
        self.archive = (!hide_archive).then(|| ArchiveControl {
            id: message.id.clone(),
            archived: message.archived,
            label: if message.archived { "Un-archive" } else { "Archive" },
        });
        self.reply = Some(ReplyControl {
            id: message.id.clone(),
        });
    }
}

// --- Composer ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposeField {
    Recipients,
    Subject,
    Body,
}

impl ComposeField {
    pub const ALL: [ComposeField; 3] = [
        ComposeField::Recipients,
        ComposeField::Subject,
        ComposeField::Body,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComposeField::Recipients => "To",
            ComposeField::Subject => "Subject",
            ComposeField::Body => "Body",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, ComposeField::Recipients)
    }

    pub fn is_multiline(self) -> bool {
        matches!(self, ComposeField::Body)
    }

    pub fn parse(name: &str) -> Option<ComposeField> {
        match name {
            "recipients" => Some(ComposeField::Recipients),
            "subject" => Some(ComposeField::Subject),
            "body" => Some(ComposeField::Body),
            _ => None,
        }
    }

    pub fn next(self) -> ComposeField {
        match self {
            ComposeField::Recipients => ComposeField::Subject,
            ComposeField::Subject => ComposeField::Body,
            ComposeField::Body => ComposeField::Recipients,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    #[default]
    Unchecked,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormField {
    pub value: String,
    pub validity: Validity,
}

impl FormField {
    fn reset(&mut self, value: String) {
        self.value = value;
        self.validity = Validity::Unchecked;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposerPanel {
    pub title: String,
    pub recipients: FormField,
    pub subject: FormField,
    pub body: FormField,
    /// Server-supplied reason shown next to the recipients field.
    pub recipients_alert: Option<String>,
}

impl Default for ComposerPanel {
    fn default() -> Self {
        ComposerPanel {
            title: NEW_MESSAGE_TITLE.to_string(),
            recipients: FormField::default(),
            subject: FormField::default(),
            body: FormField::default(),
            recipients_alert: None,
        }
    }
}

impl ComposerPanel {
    pub fn field(&self, field: ComposeField) -> &FormField {
        match field {
            ComposeField::Recipients => &self.recipients,
            ComposeField::Subject => &self.subject,
            ComposeField::Body => &self.body,
        }
    }

    pub fn field_mut(&mut self, field: ComposeField) -> &mut FormField {
        match field {
            ComposeField::Recipients => &mut self.recipients,
            ComposeField::Subject => &mut self.subject,
            ComposeField::Body => &mut self.body,
        }
    }

    pub fn clear(&mut self) {
        *self = ComposerPanel::default();
    }

    pub fn prefill_reply(&mut self, original: &Message) {
        self.title = REPLY_TITLE.to_string();
        self.recipients.reset(original.sender.clone());
        self.subject.reset(compose::reply_subject(&original.subject));
        self.body.reset(compose::reply_body(original));
        self.recipients_alert = None;
    }

    /// Mark every field valid or invalid. Only recipients are mandatory.
    pub fn validate(&mut self) -> bool {
        let mut valid = true;
        for field in ComposeField::ALL {
            let slot = self.field_mut(field);
            let ok = !field.is_required() || !slot.value.trim().is_empty();
            slot.validity = if ok { Validity::Valid } else { Validity::Invalid };
            valid &= ok;
        }
        valid
    }

    pub fn reject(&mut self, reason: String) {
        self.recipients.validity = Validity::Invalid;
        self.recipients_alert = Some(reason);
    }

    pub fn draft(&self) -> NewMessage {
        NewMessage::new(&self.recipients.value, &self.subject.value, &self.body.value)
    }
}

// --- Error ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPanel {
    pub heading: String,
    pub message: String,
    /// How many failures have been displayed since startup.
    pub occurrences: u32,
}

impl Default for ErrorPanel {
    fn default() -> Self {
        ErrorPanel {
            heading: ERROR_HEADING.to_string(),
            message: String::new(),
            occurrences: 0,
        }
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str, subject: &str, read: bool) -> Message {
        Message {
            id: id.to_string(),
            sender: "alice@example.com".to_string(),
            recipients: "me@example.com".to_string(),
            subject: subject.to_string(),
            body: "hi".to_string(),
            timestamp: "Jan 1 2025, 9:00 AM".to_string(),
            read,
            archived: false,
        }
    }

    #[test]
    fn test_only_one_panel_visible() {
        let mut surface = Surface::default();
        assert!(surface.is_visible(Panel::MailboxList));
        for panel in Panel::ALL {
            surface.show(panel);
            let visible: Vec<Panel> = Panel::ALL
                .into_iter()
                .filter(|p| surface.is_visible(*p))
                .collect();
            assert_eq!(visible, vec![panel]);
        }
    }

    #[test]
    fn test_rows_hide_redundant_columns() {
        let mut list = ListPanel::default();
        let msgs = [message("1", "Hello", true)];

        list.populate(Mailbox::Inbox, &msgs);
        assert_eq!(list.rows[0].sender.as_deref(), Some("alice@example.com"));
        assert_eq!(list.rows[0].recipients, None);
        assert!(!list.rows[0].open.hide_archive);

        list.populate(Mailbox::Sent, &msgs);
        assert_eq!(list.rows[0].sender, None);
        assert_eq!(list.rows[0].recipients.as_deref(), Some("me@example.com"));
        assert!(list.rows[0].open.hide_archive);
        assert_eq!(list.heading, "Sent");

        list.populate(Mailbox::Archive, &msgs);
        assert!(list.rows[0].sender.is_some());
        assert!(list.rows[0].recipients.is_some());
        assert!(!list.rows[0].open.hide_archive);
    }

    #[test]
    fn test_empty_subject_placeholder_in_rows() {
        let mut list = ListPanel::default();
        list.populate(Mailbox::Inbox, &[message("1", "", false)]);
        assert_eq!(list.rows[0].subject, NO_SUBJECT);
        assert_eq!(list.empty_marker, None);
    }

    #[test]
    fn test_reader_archive_label_follows_state() {
        let mut reader = ReaderPanel::default();
        let mut msg = message("9", "Hello", true);
        msg.archived = true;
        msg.body = String::new();

        reader.render(&msg, false);
        let control = reader.archive.clone().unwrap();
        assert_eq!(control.label, "Un-archive");
        assert!(control.archived);
        assert_eq!(reader.body, NO_BODY);
        assert_eq!(reader.reply.as_ref().unwrap().id, "9");

        reader.render(&msg, true);
        assert!(reader.archive.is_none());
    }

    #[test]
    fn test_validate_requires_only_recipients() {
        let mut composer = ComposerPanel::default();
        assert!(!composer.validate());
        assert_eq!(composer.recipients.validity, Validity::Invalid);
        assert_eq!(composer.subject.validity, Validity::Valid);
        assert_eq!(composer.body.validity, Validity::Valid);

        composer.recipients.value = "   ".to_string();
        assert!(!composer.validate());

        composer.recipients.value = "bob@example.com".to_string();
        assert!(composer.validate());
        assert_eq!(composer.recipients.validity, Validity::Valid);
    }

    #[test]
    fn test_prefill_reply_resets_validation() {
        let mut composer = ComposerPanel::default();
        composer.validate();
        composer.reject("nope".to_string());

        composer.prefill_reply(&message("3", "Re: Plans", true));
        assert_eq!(composer.title, REPLY_TITLE);
        assert_eq!(composer.recipients.value, "alice@example.com");
        assert_eq!(composer.subject.value, "Re: Plans");
        assert!(composer.body.value.contains("alice@example.com wrote:"));
        for field in ComposeField::ALL {
            assert_eq!(composer.field(field).validity, Validity::Unchecked);
        }
        assert_eq!(composer.recipients_alert, None);
    }

    #[test]
    fn test_field_cycle() {
        let mut field = ComposeField::Recipients;
        for _ in 0..3 {
            field = field.next();
        }
        assert_eq!(field, ComposeField::Recipients);
        assert_eq!(ComposeField::parse("body"), Some(ComposeField::Body));
        assert_eq!(ComposeField::parse("cc"), None);
    }
}
