use super::types::*;

pub struct MailClient {
    agent: ureq::Agent,
    base_url: String,
    collection: String,
    session_cookie: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The store answered with a non-2xx status.
    Status { code: u16, reason: String },
    /// The request never produced a response.
    Transport(String),
    Parse(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Status { code, reason } => write!(f, "{} - {}", code, reason),
            ApiError::Transport(e) => write!(f, "{}", e),
            ApiError::Parse(e) => write!(f, "Invalid response: {}", e),
        }
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn path_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn truncate_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl MailClient {
    pub fn new(base_url: &str, collection: &str, session_cookie: Option<String>) -> Self {
        MailClient {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.trim_matches('/').to_string(),
            session_cookie,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection)
    }

    fn item_url(&self, tail: &str) -> String {
        format!("{}/{}", self.collection_url(), path_segment(tail))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        log_debug!("[HTTP] {} {}", method, url);
        let request = self.agent.request(method, url);
        match self.session_cookie {
            Some(ref cookie) => request.set("Cookie", cookie),
            None => request,
        }
    }

    fn read_body(response: ureq::Response) -> Result<String, ApiError> {
        response
            .into_string()
            .map_err(|e| ApiError::Parse(format!("failed to read response: {}", e)))
    }

    fn transport_error(err: ureq::Error) -> ApiError {
        match err {
            ureq::Error::Status(code, resp) => {
                let reason = resp.status_text().to_string();
                log_debug!("[HTTP] status {} {}", code, reason);
                ApiError::Status { code, reason }
            }
            ureq::Error::Transport(t) => {
                log_debug!("[HTTP] transport failure: {}", t);
                ApiError::Transport(t.to_string())
            }
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .request("GET", url)
            .call()
            .map_err(Self::transport_error)?;
        let text = Self::read_body(response)?;
        log_debug!(
            "[HTTP] response ({} bytes): {}",
            text.len(),
            truncate_str(&text, 500)
        );
        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub fn list_mailbox(&self, mailbox: Mailbox) -> Result<Vec<Message>, ApiError> {
        let messages: Vec<Message> = self.get_json(&self.item_url(mailbox.as_str()))?;
        log_info!("[HTTP] {} returned {} messages", mailbox, messages.len());
        Ok(messages)
    }

    pub fn get_message(&self, id: &str) -> Result<Message, ApiError> {
        self.get_json(&self.item_url(id))
    }

    pub fn update_flags(&self, id: &str, flags: FlagUpdate) -> Result<(), ApiError> {
        log_info!(
            "[HTTP] updating {} read={} archived={}",
            id,
            flags.read,
            flags.archived
        );
        self.request("PUT", &self.item_url(id))
            .send_json(flags)
            .map_err(Self::transport_error)?;
        Ok(())
    }

    /// Post a new message. An `error` field in the reply body is a soft
    /// rejection even when the store pairs it with a 4xx status.
    pub fn submit(&self, draft: &NewMessage) -> Result<SubmitOutcome, ApiError> {
        log_info!("[HTTP] submitting message to {}", draft.recipients);
        let url = self.collection_url();
        match self.request("POST", &url).send_json(draft) {
            Ok(response) => {
                let text = Self::read_body(response)?;
                SubmitOutcome::from_payload(&text).ok_or_else(|| {
                    ApiError::Parse(format!(
                        "unexpected submit reply: {}",
                        truncate_str(&text, 200)
                    ))
                })
            }
            Err(ureq::Error::Status(code, resp)) => {
                let reason = resp.status_text().to_string();
                let text = resp.into_string().unwrap_or_default();
                match SubmitOutcome::from_payload(&text) {
                    Some(rejected @ SubmitOutcome::Rejected(_)) => Ok(rejected),
                    _ => {
                        log_debug!("[HTTP] submit failed with {} {}", code, reason);
                        Err(ApiError::Status { code, reason })
                    }
                }
            }
            Err(e) => Err(Self::transport_error(e)),
        }
    }
}
