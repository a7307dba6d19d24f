use crate::api::types::Message;

const REPLY_PREFIX: &str = "Re: ";

/// Subject for a reply. Replying to a reply keeps a single prefix.
pub fn reply_subject(subject: &str) -> String {
    if subject.starts_with(REPLY_PREFIX) {
        subject.to_string()
    } else {
        format!("{}{}", REPLY_PREFIX, subject)
    }
}

/// Body for a reply: a separator, an attribution line, then the original text.
pub fn reply_body(original: &Message) -> String {
    format!(
        "\n===========\nOn {} {} wrote:\n{}",
        original.timestamp, original.sender, original.body
    )
}
