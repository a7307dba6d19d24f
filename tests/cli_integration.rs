
use mock_store::{MockMailStore, ME};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

struct CliHarness {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    store: MockMailStore,
    log_path: std::path::PathBuf,
    _config_dir: tempfile::TempDir,
}

impl CliHarness {
    fn start() -> Self {
        Self::start_with(|_| {})
    }

    /// `prepare` runs against the store before the client's initial inbox load.
    fn start_with(prepare: impl FnOnce(&MockMailStore)) -> Self {
        let store = MockMailStore::start();
        prepare(&store);

        let config_dir = tempfile::tempdir().expect("create temp dir");
        let config_path = config_dir.path().join("config.toml");
        let log_path = config_dir.path().join("mailpane.log");

        let config_content = format!(
            r#"[server]
base_url = "{}"

[log]
path = "{}"
"#,
            store.url(),
            log_path.display()
        );
        std::fs::write(&config_path, config_content).expect("write config");

        let mut child = Command::new(env!("CARGO_BIN_EXE_mailpane"))
            .arg("--cli")
            .arg(format!("--config={}", config_path.display()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn mailpane --cli");

        let stdin = child.stdin.take().expect("take stdin");
        let stdout = child.stdout.take().expect("take stdout");

        CliHarness {
            child,
            stdin,
            reader: BufReader::new(stdout),
            store,
            log_path,
            _config_dir: config_dir,
        }
    }

    fn send(&mut self, cmd: Value) -> Value {
        let line = serde_json::to_string(&cmd).expect("serialize command");
        writeln!(self.stdin, "{}", line).expect("write to stdin");
        self.stdin.flush().expect("flush stdin");

        let mut response_line = String::new();
        self.reader
            .read_line(&mut response_line)
            .expect("read response");
        serde_json::from_str(response_line.trim()).expect("parse response JSON")
    }

    /// `[ERROR]` lines the client has written to its log so far.
    fn error_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log_path)
            .unwrap_or_default()
            .lines()
            .filter(|l| l.contains("[ERROR]"))
            .map(str::to_string)
            .collect()
    }

    /// Send a command that must succeed and return its surface.
    fn surface(&mut self, cmd: Value) -> Value {
        let resp = self.send(cmd.clone());
        assert_eq!(resp["ok"], true, "{} failed: {}", cmd, resp);
        resp["surface"].clone()
    }
}

impl Drop for CliHarness {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn row_ids(surface: &Value) -> Vec<String> {
    surface["list"]["rows"]
        .as_array()
        .expect("rows array")
        .iter()
        .map(|r| r["open"]["id"].as_str().unwrap().to_string())
        .collect()
}

fn row_index(surface: &Value, id: &str) -> usize {
    row_ids(surface)
        .iter()
        .position(|r| r == id)
        .unwrap_or_else(|| panic!("no row for {} in {}", id, surface["list"]))
}

#[test]
fn test_starts_on_inbox() {
    let mut h = CliHarness::start();
    let s = h.surface(json!({"command": "state"}));

    assert_eq!(s["active"], "mailbox_list");
    assert_eq!(s["list"]["heading"], "Inbox");
    assert_eq!(row_ids(&s), vec!["5", "2", "1"]);

    let first = &s["list"]["rows"][0];
    assert_eq!(first["subject"], "(no subject)");
    assert_eq!(first["sender"], "dave@example.com");
    assert!(first["recipients"].is_null());
    assert_eq!(first["read"], false);
    assert_eq!(h.store.count("GET", "/messages/inbox"), 1);
}

#[test]
fn test_sent_rows_hide_sender_and_archive_control() {
    let mut h = CliHarness::start();
    let s = h.surface(json!({"command": "load_mailbox", "mailbox": "sent"}));

    assert_eq!(s["list"]["heading"], "Sent");
    assert_eq!(row_ids(&s), vec!["4"]);
    let row = &s["list"]["rows"][0];
    assert!(row["sender"].is_null());
    assert_eq!(row["recipients"], "alice@example.com");
    assert_eq!(row["open"]["hide_archive"], true);

    let s = h.surface(json!({"command": "open_row", "index": 0}));
    assert_eq!(s["active"], "reader");
    assert!(s["reader"]["archive"].is_null());
    assert_eq!(s["reader"]["reply"]["id"], "4");
}

#[test]
fn test_opening_unread_message_marks_it_read() {
    let mut h = CliHarness::start();
    let s = h.surface(json!({"command": "state"}));
    let index = row_index(&s, "1");

    let s = h.surface(json!({"command": "open_row", "index": index}));
    assert_eq!(s["active"], "reader");
    assert_eq!(s["reader"]["subject"], "Hello World");
    assert_eq!(s["reader"]["sender"], "alice@example.com");
    assert_eq!(s["reader"]["recipients"], ME);
    assert_eq!(s["reader"]["archive"]["label"], "Archive");

    let puts: Vec<_> = h
        .store
        .requests()
        .into_iter()
        .filter(|r| r.method == "PUT")
        .collect();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].path, "/messages/1");
    assert_eq!(puts[0].body, json!({"read": true, "archived": false}));

    let s = h.surface(json!({"command": "load_mailbox", "mailbox": "inbox"}));
    let index = row_index(&s, "1");
    assert_eq!(s["list"]["rows"][index]["read"], true);
}

#[test]
fn test_opening_read_message_sends_no_update() {
    let mut h = CliHarness::start();
    let s = h.surface(json!({"command": "read_message", "id": "2"}));
    assert_eq!(s["active"], "reader");
    assert_eq!(s["reader"]["subject"], "Meeting Tomorrow");
    assert_eq!(h.store.requests().iter().filter(|r| r.method == "PUT").count(), 0);
}

#[test]
fn test_empty_subject_and_body_placeholders() {
    let mut h = CliHarness::start();
    let s = h.surface(json!({"command": "read_message", "id": 5}));
    assert_eq!(s["reader"]["subject"], "(no subject)");
    assert_eq!(s["reader"]["body"], "(no body)");
}

#[test]
fn test_archive_and_unarchive_return_to_inbox() {
    let mut h = CliHarness::start();
    let s = h.surface(json!({"command": "state"}));
    let index = row_index(&s, "2");
    h.surface(json!({"command": "open_row", "index": index}));
    h.store.clear_requests();

    let s = h.surface(json!({"command": "toggle_archive"}));
    assert_eq!(s["active"], "mailbox_list");
    assert_eq!(s["list"]["heading"], "Inbox");
    assert_eq!(row_ids(&s), vec!["5", "1"]);

    let requests = h.store.requests();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].body, json!({"read": true, "archived": true}));
    assert_eq!(h.store.count("GET", "/messages/inbox"), 1);

    let s = h.surface(json!({"command": "load_mailbox", "mailbox": "archive"}));
    assert_eq!(row_ids(&s), vec!["3", "2"]);

    let s = h.surface(json!({"command": "open_row", "index": 0}));
    assert_eq!(s["reader"]["archive"]["label"], "Un-archive");
    assert_eq!(s["reader"]["archive"]["archived"], true);

    let s = h.surface(json!({"command": "toggle_archive"}));
    assert_eq!(s["list"]["heading"], "Inbox");
    assert_eq!(row_ids(&s), vec!["5", "3", "1"]);
}

#[test]
fn test_toggle_archive_requires_reader() {
    let mut h = CliHarness::start();
    let resp = h.send(json!({"command": "toggle_archive"}));
    assert_eq!(resp["ok"], false);
    assert!(resp["error"].as_str().unwrap().contains("no archive control"));
}

#[test]
fn test_reply_prefills_composer() {
    let mut h = CliHarness::start();
    h.surface(json!({"command": "read_message", "id": "1"}));

    let s = h.surface(json!({"command": "reply"}));
    let composer = &s["composer"];
    assert_eq!(s["active"], "composer");
    assert_eq!(composer["title"], "Reply to Email");
    assert_eq!(composer["recipients"]["value"], "alice@example.com");
    assert_eq!(composer["subject"]["value"], "Re: Hello World");
    assert_eq!(
        composer["body"]["value"],
        "\n===========\nOn Jan 1 2025, 10:30 AM alice@example.com wrote:\nThis is the body of message 1."
    );
    assert_eq!(composer["recipients"]["validity"], "unchecked");
}

#[test]
fn test_reply_to_reply_keeps_single_prefix() {
    let mut h = CliHarness::start();
    h.surface(json!({"command": "load_mailbox", "mailbox": "sent"}));
    h.surface(json!({"command": "open_row", "index": 0}));
    let s = h.surface(json!({"command": "reply"}));
    assert_eq!(s["composer"]["subject"]["value"], "Re: Hello World");
    assert_eq!(s["composer"]["recipients"]["value"], ME);
}

#[test]
fn test_submit_without_recipients_stays_local() {
    let mut h = CliHarness::start();
    h.surface(json!({"command": "compose"}));
    h.surface(json!({"command": "set_field", "field": "subject", "value": "Hi"}));
    h.store.clear_requests();

    let resp = h.send(json!({"command": "submit"}));
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["propagation"], "stop");
    let s = &resp["surface"];
    assert_eq!(s["active"], "composer");
    assert_eq!(s["composer"]["recipients"]["validity"], "invalid");
    assert_eq!(s["composer"]["subject"]["validity"], "valid");
    assert!(h.store.requests().is_empty());
}

#[test]
fn test_submit_unknown_recipient_shows_inline_error() {
    let mut h = CliHarness::start();
    h.surface(json!({"command": "compose"}));
    h.surface(json!({"command": "set_field", "field": "recipients", "value": "nobody@example.com"}));

    let s = h.surface(json!({"command": "submit"}));
    assert_eq!(s["active"], "composer");
    assert_eq!(
        s["composer"]["recipients_alert"],
        "User with email nobody@example.com does not exist."
    );
    assert_eq!(s["composer"]["recipients"]["validity"], "invalid");
    assert_eq!(s["error"]["occurrences"], 0);
    assert_eq!(h.store.count("GET", "/messages/sent"), 0);

    // The same form can be corrected and sent again.
    h.surface(json!({"command": "set_field", "field": "recipients", "value": "bob@example.com"}));
    let s = h.surface(json!({"command": "submit"}));
    assert_eq!(s["active"], "mailbox_list");
}

#[test]
fn test_submit_success_shows_sent() {
    let mut h = CliHarness::start();
    h.surface(json!({"command": "compose"}));
    h.surface(json!({"command": "set_field", "field": "recipients", "value": "bob@example.com"}));
    h.surface(json!({"command": "set_field", "field": "subject", "value": "Lunch"}));
    h.store.clear_requests();

    let s = h.surface(json!({"command": "submit"}));
    assert_eq!(s["active"], "mailbox_list");
    assert_eq!(s["list"]["heading"], "Sent");
    assert_eq!(row_ids(&s), vec!["6", "4"]);
    assert_eq!(s["list"]["rows"][0]["subject"], "Lunch");

    let posts: Vec<_> = h
        .store
        .requests()
        .into_iter()
        .filter(|r| r.method == "POST")
        .collect();
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].body,
        json!({
            "recipients": "bob@example.com",
            "subject": "Lunch",
            "body": "",
            "read": false,
            "archived": false
        })
    );
    assert_eq!(h.store.count("GET", "/messages/sent"), 1);
}

#[test]
fn test_missing_message_shows_error_panel() {
    let mut h = CliHarness::start();
    let before = h.surface(json!({"command": "state"}));

    let s = h.surface(json!({"command": "read_message", "id": "999"}));
    assert_eq!(s["active"], "error");
    assert_eq!(s["error"]["heading"], "A Problem Occurred.");
    assert_eq!(s["error"]["message"], "404 - Not Found");
    assert_eq!(s["error"]["occurrences"], 1);
    assert_eq!(s["list"], before["list"]);
    assert_eq!(s["reader"], before["reader"]);

    let errors = h.error_lines();
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("404 - Not Found"));
}

#[test]
fn test_failed_mailbox_load_keeps_previous_list() {
    let mut h = CliHarness::start();
    h.store.fail_path("/messages/archive");

    let s = h.surface(json!({"command": "load_mailbox", "mailbox": "archive"}));
    assert_eq!(s["active"], "error");
    assert_eq!(s["error"]["message"], "500 - Internal Server Error");
    assert_eq!(s["list"]["heading"], "Inbox");
    assert_eq!(row_ids(&s), vec!["5", "2", "1"]);

    let errors = h.error_lines();
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("500 - Internal Server Error"));
}

#[test]
fn test_failed_initial_load_shows_error() {
    let mut h = CliHarness::start_with(|store| store.fail_path("/messages/inbox"));
    let s = h.surface(json!({"command": "state"}));
    assert_eq!(s["active"], "error");
    assert_eq!(s["error"]["occurrences"], 1);
}

#[test]
fn test_empty_mailbox_marker() {
    let mut h = CliHarness::start();
    // Move the only archived message back to the inbox.
    h.surface(json!({"command": "read_message", "id": "3"}));
    h.surface(json!({"command": "toggle_archive"}));

    let s = h.surface(json!({"command": "load_mailbox", "mailbox": "archive"}));
    assert_eq!(s["list"]["rows"].as_array().unwrap().len(), 0);
    assert_eq!(s["list"]["empty_marker"], "No messages found.");
}

#[test]
fn test_bad_commands() {
    let mut h = CliHarness::start();

    let resp = h.send(json!({"command": "load_mailbox", "mailbox": "spam"}));
    assert_eq!(resp["ok"], false);
    assert!(resp["error"].as_str().unwrap().contains("unknown mailbox"));

    let resp = h.send(json!({"command": "open_row", "index": 42}));
    assert_eq!(resp["ok"], false);

    let resp = h.send(json!({"command": "set_field", "field": "cc", "value": "x"}));
    assert_eq!(resp["ok"], false);

    let resp = h.send(json!({"command": "frobnicate"}));
    assert_eq!(resp["ok"], false);
    assert!(resp["error"].as_str().unwrap().contains("unknown command"));

    let resp = h.send(json!({"nope": true}));
    assert_eq!(resp["ok"], false);
}
