use crate::api::types::Mailbox;
use crate::backend::{BackendCommand, BackendResponse};
use crate::controller::{Controller, Propagation};
use crate::surface::ComposeField;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::sync::mpsc;

struct CliState {
    controller: Controller,
    resp_rx: mpsc::Receiver<BackendResponse>,
}

impl CliState {
    /// Block until every request issued so far (and any follow-ups) has been answered.
    fn settle(&mut self) -> Result<(), String> {
        while !self.controller.is_idle() {
            let response = self
                .resp_rx
                .recv()
                .map_err(|_| "backend channel closed".to_string())?;
            self.controller.handle_response(response);
        }
        Ok(())
    }
}

fn ok_response(data: Value) -> Value {
    let mut obj = match data {
        Value::Object(m) => m,
        _ => {
            let mut m = serde_json::Map::new();
            m.insert("data".to_string(), data);
            m
        }
    };
    obj.insert("ok".to_string(), Value::Bool(true));
    Value::Object(obj)
}

fn err_response(msg: &str) -> Value {
    json!({"ok": false, "error": msg})
}

fn str_arg<'a>(input: &'a Value, name: &str) -> Result<&'a str, String> {
    input
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing '{}' field", name))
}

fn dispatch(state: &mut CliState, input: &Value) -> Value {
    let command = match input.get("command").and_then(|v| v.as_str()) {
        Some(c) => c,
        None => return err_response("missing 'command' field"),
    };

    let result = match command {
        "state" => Ok(json!({})),
        "load_mailbox" => cmd_load_mailbox(state, input),
        "open_row" => cmd_open_row(state, input),
        "read_message" => cmd_read_message(state, input),
        "toggle_archive" => cmd_toggle_archive(state),
        "reply" => cmd_reply(state),
        "compose" => {
            state.controller.reset_compose_form();
            Ok(json!({}))
        }
        "set_field" => cmd_set_field(state, input),
        "submit" => cmd_submit(state),
        _ => Err(format!("unknown command '{}'", command)),
    };

    let mut data = match result {
        Ok(data) => data,
        Err(e) => return err_response(&e),
    };
    if let Err(e) = state.settle() {
        return err_response(&e);
    }
    match serde_json::to_value(state.controller.surface()) {
        Ok(surface) => {
            data["surface"] = surface;
            ok_response(data)
        }
        Err(e) => err_response(&format!("failed to serialize surface: {}", e)),
    }
}

// --- Command handlers ---

fn cmd_load_mailbox(state: &mut CliState, input: &Value) -> Result<Value, String> {
    let name = str_arg(input, "mailbox")?;
    let mailbox = Mailbox::parse(name)
        .ok_or_else(|| format!("unknown mailbox '{}' (inbox, sent, archive)", name))?;
    state.controller.load_mailbox(mailbox);
    Ok(json!({}))
}

fn cmd_open_row(state: &mut CliState, input: &Value) -> Result<Value, String> {
    let index = input
        .get("index")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| "missing 'index' field".to_string())? as usize;
    if !state.controller.open_row(index) {
        return Err(format!("no row at index {}", index));
    }
    Ok(json!({}))
}

fn cmd_read_message(state: &mut CliState, input: &Value) -> Result<Value, String> {
    let id = match input.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err("missing 'id' field".to_string()),
    };
    let hide_archive = input
        .get("hide_archive")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    state.controller.read_message(&id, hide_archive);
    Ok(json!({}))
}

fn cmd_toggle_archive(state: &mut CliState) -> Result<Value, String> {
    if !state.controller.toggle_archive_from_reader() {
        return Err("no archive control on screen".to_string());
    }
    Ok(json!({}))
}

fn cmd_reply(state: &mut CliState) -> Result<Value, String> {
    if !state.controller.reply_from_reader() {
        return Err("no reply control on screen".to_string());
    }
    Ok(json!({}))
}

fn cmd_set_field(state: &mut CliState, input: &Value) -> Result<Value, String> {
    let name = str_arg(input, "field")?;
    let field = ComposeField::parse(name)
        .ok_or_else(|| format!("unknown field '{}' (recipients, subject, body)", name))?;
    let value = str_arg(input, "value")?;
    state.controller.set_field(field, value);
    Ok(json!({}))
}

fn cmd_submit(state: &mut CliState) -> Result<Value, String> {
    let propagation = match state.controller.submit_compose() {
        Propagation::Stop => "stop",
        Propagation::Continue => "continue",
    };
    Ok(json!({ "propagation": propagation }))
}

pub fn run_cli(cmd_tx: mpsc::Sender<BackendCommand>, resp_rx: mpsc::Receiver<BackendResponse>) {
    let mut state = CliState {
        controller: Controller::new(cmd_tx.clone()),
        resp_rx,
    };

    state.controller.start();
    if let Err(e) = state.settle() {
        log_error!("Initial load failed: {}", e);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(trimmed) {
            Ok(input) => dispatch(&mut state, &input),
            Err(e) => err_response(&format!("JSON parse error: {}", e)),
        };
        let _ = serde_json::to_writer(&mut stdout, &response);
        let _ = stdout.write_all(b"\n");
        let _ = stdout.flush();
    }

    let _ = cmd_tx.send(BackendCommand::Shutdown);
}

pub fn print_help_cli() {
    print!(
        r#"mailpane --cli: JSON-over-stdin/stdout CLI mode
===============================================

Protocol: Newline-Delimited JSON (NDJSON)
- Send one JSON object per line to stdin
- Receive one JSON response per line from stdout
- Every command waits for the requests it triggered (and their follow-ups)
  before answering
- Responses are {{"ok": true, "surface": {{...}}}} on success or
  {{"ok": false, "error": "..."}} on failure

The inbox is loaded before the first command is read.

Commands
--------
  {{"command": "state"}}
  {{"command": "load_mailbox", "mailbox": "inbox" | "sent" | "archive"}}
  {{"command": "open_row", "index": 0}}
  {{"command": "read_message", "id": "42", "hide_archive": false}}
  {{"command": "toggle_archive"}}        uses the reader's archive control
  {{"command": "reply"}}                 uses the reader's reply control
  {{"command": "compose"}}
  {{"command": "set_field", "field": "recipients" | "subject" | "body", "value": "..."}}
  {{"command": "submit"}}

Surface
-------
  active    one of mailbox_list, reader, composer, error
  list      mailbox, heading, rows[], empty_marker
  reader    sender, recipients, timestamp, subject, body, archive, reply
  composer  title, recipients/subject/body {{value, validity}}, recipients_alert
  error     heading, message, occurrences
"#
    );
}
