use crate::api::client::{ApiError, MailClient};
use crate::api::types::{FlagUpdate, Mailbox, Message, NewMessage, SubmitOutcome};
use std::sync::mpsc;
use std::thread;

/// Generation of the navigation that issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(pub u64);

/// What the UI does with a fetched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    Read { hide_archive: bool },
    Reply,
}

/// Work to run after a successful flag update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    LoadMailbox(Mailbox),
}

/// Commands sent from the UI thread to the backend thread.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    FetchMailbox {
        token: RequestToken,
        mailbox: Mailbox,
    },
    FetchMessage {
        token: RequestToken,
        id: String,
        purpose: FetchPurpose,
    },
    UpdateFlags {
        token: RequestToken,
        id: String,
        flags: FlagUpdate,
        then: Option<Continuation>,
    },
    Submit {
        token: RequestToken,
        draft: NewMessage,
    },
    Shutdown,
}

/// Responses sent from the backend thread to the UI thread, in completion order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendResponse {
    Mailbox {
        token: RequestToken,
        mailbox: Mailbox,
        result: Result<Vec<Message>, ApiError>,
    },
    Message {
        token: RequestToken,
        purpose: FetchPurpose,
        result: Box<Result<Message, ApiError>>,
    },
    FlagsUpdated {
        token: RequestToken,
        id: String,
        then: Option<Continuation>,
        result: Result<(), ApiError>,
    },
    Submitted {
        token: RequestToken,
        result: Result<SubmitOutcome, ApiError>,
    },
}

impl BackendResponse {
    pub fn token(&self) -> RequestToken {
        match self {
            BackendResponse::Mailbox { token, .. }
            | BackendResponse::Message { token, .. }
            | BackendResponse::FlagsUpdated { token, .. }
            | BackendResponse::Submitted { token, .. } => *token,
        }
    }

    /// The failure this response carries, if any.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            BackendResponse::Mailbox { result, .. } => result.as_ref().err(),
            BackendResponse::Message { result, .. } => (**result).as_ref().err(),
            BackendResponse::FlagsUpdated { result, .. } => result.as_ref().err(),
            BackendResponse::Submitted { result, .. } => result.as_ref().err(),
        }
    }
}

/// Spawn the backend thread. Returns the command sender and response receiver.
pub fn spawn(
    client: MailClient,
) -> (
    mpsc::Sender<BackendCommand>,
    mpsc::Receiver<BackendResponse>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<BackendCommand>();
    let (resp_tx, resp_rx) = mpsc::channel::<BackendResponse>();

    thread::spawn(move || {
        backend_loop(client, cmd_rx, resp_tx);
    });

    (cmd_tx, resp_rx)
}

fn backend_loop(
    client: MailClient,
    cmd_rx: mpsc::Receiver<BackendCommand>,
    resp_tx: mpsc::Sender<BackendResponse>,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        let response = match cmd {
            BackendCommand::FetchMailbox { token, mailbox } => BackendResponse::Mailbox {
                token,
                mailbox,
                result: client.list_mailbox(mailbox),
            },
            BackendCommand::FetchMessage { token, id, purpose } => BackendResponse::Message {
                token,
                purpose,
                result: Box::new(client.get_message(&id)),
            },
            BackendCommand::UpdateFlags {
                token,
                id,
                flags,
                then,
            } => {
                let result = client.update_flags(&id, flags);
                BackendResponse::FlagsUpdated {
                    token,
                    id,
                    then,
                    result,
                }
            }
            BackendCommand::Submit { token, draft } => BackendResponse::Submitted {
                token,
                result: client.submit(&draft),
            },
            BackendCommand::Shutdown => break,
        };

        if resp_tx.send(response).is_err() {
            log_warn!("UI side hung up, stopping backend");
            break;
        }
    }
}
