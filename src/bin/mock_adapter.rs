//! Mock DAP adapter binary for integration testing
//!
//! Speaks the subset of the Debug Adapter Protocol the binder uses. Source
//! breakpoints are verified unless their line is above `MOCK_MAX_LINE`
//! (default 1000), which lets tests exercise rejected placements.

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};

fn main() {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = stdout.lock();

    let max_line = std::env::var("MOCK_MAX_LINE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1000);
    let mut state = MockState::new(max_line);

    while let Some(message) = read_message(&mut reader) {
        for out in state.process_message(&message) {
            send_message(&mut writer, &out);
        }
        if state.disconnected {
            break;
        }
    }
}

fn read_message<R: BufRead>(reader: &mut R) -> Option<Value> {
    loop {
        let mut content_length = None;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).ok()? == 0 {
                return None;
            }
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            if let Some(value) = line.strip_prefix("Content-Length:") {
                content_length = value.trim().parse::<usize>().ok();
            }
        }

        let Some(len) = content_length else { continue };
        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).ok()?;
        if let Ok(value) = serde_json::from_slice(&body) {
            return Some(value);
        }
    }
}

fn send_message<W: Write>(writer: &mut W, message: &Value) {
    let body = message.to_string();
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).ok();
    writer.write_all(body.as_bytes()).ok();
    writer.flush().ok();
}

struct MockState {
    seq: i64,
    max_line: u64,
    next_breakpoint_id: u64,
    disconnected: bool,
}

impl MockState {
    fn new(max_line: u64) -> Self {
        Self {
            seq: 1,
            max_line,
            next_breakpoint_id: 1,
            disconnected: false,
        }
    }

    fn next_seq(&mut self) -> i64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    fn event(&mut self, event: &str) -> Value {
        json!({
            "seq": self.next_seq(),
            "type": "event",
            "event": event
        })
    }

    fn process_message(&mut self, message: &Value) -> Vec<Value> {
        if message.get("type").and_then(|t| t.as_str()) != Some("request") {
            return Vec::new();
        }
        let command = message
            .get("command")
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .to_string();
        let request_seq = message.get("seq").and_then(|s| s.as_i64()).unwrap_or(0);
        let arguments = message.get("arguments").cloned().unwrap_or(json!({}));

        let mut after = Vec::new();
        let (success, body) = match command.as_str() {
            "initialize" => (
                true,
                json!({
                    "supportsConfigurationDoneRequest": true,
                    "supportsConditionalBreakpoints": true,
                    "supportsHitConditionalBreakpoints": true,
                    "supportsTerminateRequest": true
                }),
            ),
            "launch" => {
                let has_program = arguments.get("program").and_then(|p| p.as_str()).is_some();
                if has_program {
                    after.push(self.event("initialized"));
                    (true, Value::Null)
                } else {
                    (false, json!({ "error": "missing program" }))
                }
            }
            "setBreakpoints" => (true, self.set_breakpoints(&arguments)),
            "configurationDone" => (true, Value::Null),
            "disconnect" => {
                self.disconnected = true;
                after.push(self.event("terminated"));
                (true, Value::Null)
            }
            _ => (false, Value::Null),
        };

        let mut response = json!({
            "seq": self.next_seq(),
            "type": "response",
            "request_seq": request_seq,
            "success": success,
            "command": command,
            "body": body
        });
        if !success {
            response["message"] = json!(format!("{} failed", command));
        }

        let mut out = vec![response];
        out.extend(after);
        out
    }

    fn set_breakpoints(&mut self, arguments: &Value) -> Value {
        let source = arguments
            .get("source")
            .and_then(|s| s.get("path"))
            .and_then(|p| p.as_str())
            .unwrap_or("unknown")
            .to_string();
        let requested = arguments
            .get("breakpoints")
            .and_then(|b| b.as_array())
            .cloned()
            .unwrap_or_default();

        let mut breakpoints = Vec::new();
        for bp in &requested {
            let line = bp.get("line").and_then(|l| l.as_u64()).unwrap_or(1);

            let id = self.next_breakpoint_id;
            self.next_breakpoint_id += 1;
            if line <= self.max_line {
                breakpoints.push(json!({
                    "id": id,
                    "verified": true,
                    "line": line,
                    "source": { "path": source }
                }));
            } else {
                breakpoints.push(json!({
                    "id": id,
                    "verified": false,
                    "message": format!("Line {} is past the end of {}", line, source)
                }));
            }
        }

        json!({ "breakpoints": breakpoints })
    }
}
