use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// The three partitions the store exposes as filtered lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mailbox {
    Inbox,
    Sent,
    Archive,
}

impl Mailbox {
    pub const ALL: [Mailbox; 3] = [Mailbox::Inbox, Mailbox::Sent, Mailbox::Archive];

    pub fn as_str(self) -> &'static str {
        match self {
            Mailbox::Inbox => "inbox",
            Mailbox::Sent => "sent",
            Mailbox::Archive => "archive",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Mailbox::Inbox => "Inbox",
            Mailbox::Sent => "Sent",
            Mailbox::Archive => "Archive",
        }
    }

    pub fn parse(name: &str) -> Option<Mailbox> {
        Mailbox::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default, deserialize_with = "address_list")]
    pub recipients: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub subject: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub body: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub archived: bool,
}

/// Ids are opaque to the client; stores hand out either numbers or strings.
fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Accepts `"a@x, b@x"` as well as `["a@x", "b@x"]`.
fn address_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Addresses {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Addresses>::deserialize(deserializer)? {
        Some(Addresses::One(s)) => s,
        Some(Addresses::Many(list)) => list.join(", "),
        None => String::new(),
    })
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a compose submission. New messages always start unread and unarchived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMessage {
    pub recipients: String,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub archived: bool,
}

impl NewMessage {
    pub fn new(recipients: &str, subject: &str, body: &str) -> Self {
        NewMessage {
            recipients: recipients.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            read: false,
            archived: false,
        }
    }
}

/// Partial update of the two mutable flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagUpdate {
    pub read: bool,
    pub archived: bool,
}

/// Outcome of a compose submission that made it to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// The store refused the message with a user-correctable reason.
    Rejected(String),
}

impl SubmitOutcome {
    /// Returns `None` when the payload is not a JSON object at all.
    pub fn from_payload(payload: &str) -> Option<SubmitOutcome> {
        if payload.trim().is_empty() {
            return Some(SubmitOutcome::Accepted);
        }
        let value: Value = serde_json::from_str(payload).ok()?;
        let obj = value.as_object()?;
        match obj.get("error") {
            Some(Value::String(s)) => Some(SubmitOutcome::Rejected(s.clone())),
            Some(Value::Null) | None => Some(SubmitOutcome::Accepted),
            Some(other) => Some(SubmitOutcome::Rejected(other.to_string())),
        }
    }
}
