//! DAP client for a spawned debug adapter
//!
//! Requests are issued one at a time; anything the adapter sends while a
//! response is outstanding (events, stray responses) is logged and dropped.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::common::{Error, Result};

use super::codec;
use super::types::*;

/// DAP client for communicating with a debug adapter
pub struct DapClient {
    /// Adapter subprocess
    adapter: Child,
    /// Buffered reader for adapter stdout
    reader: BufReader<ChildStdout>,
    /// Buffered writer for adapter stdin
    writer: BufWriter<ChildStdin>,
    /// Sequence number for the next request
    seq: i64,
    /// Adapter capabilities (populated after initialize)
    pub capabilities: Capabilities,
    /// Set once the `initialized` event has been seen
    initialized: bool,
}

impl DapClient {
    /// Spawn a new DAP adapter and create a client
    pub async fn spawn(adapter_path: &Path, args: &[String]) -> Result<Self> {
        let mut cmd = Command::new(adapter_path);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut adapter = cmd.spawn().map_err(|e| {
            Error::AdapterStartFailed(format!(
                "Failed to start {}: {}",
                adapter_path.display(),
                e
            ))
        })?;

        let stdin = adapter
            .stdin
            .take()
            .ok_or_else(|| Error::AdapterStartFailed("Failed to get adapter stdin".to_string()))?;
        let stdout = adapter.stdout.take().ok_or_else(|| {
            Error::AdapterStartFailed("Failed to get adapter stdout".to_string())
        })?;

        Ok(Self {
            adapter,
            reader: BufReader::new(stdout),
            writer: BufWriter::new(stdin),
            seq: 1,
            capabilities: Capabilities::default(),
            initialized: false,
        })
    }

    fn next_seq(&mut self) -> i64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    /// Send a request and return its sequence number
    async fn send_request(&mut self, command: &str, arguments: Option<Value>) -> Result<i64> {
        let seq = self.next_seq();

        let mut request = serde_json::json!({
            "seq": seq,
            "type": "request",
            "command": command,
        });
        if let Some(args) = arguments {
            request["arguments"] = args;
        }

        let json = serde_json::to_string(&request)?;
        tracing::trace!(%json, "DAP request");
        codec::write_message(&mut self.writer, &json).await?;

        Ok(seq)
    }

    async fn read_message(&mut self) -> Result<Value> {
        let json = codec::read_message(&mut self.reader).await?;
        tracing::trace!(%json, "DAP message");
        serde_json::from_str(&json).map_err(|e| Error::DapProtocol(format!("Invalid JSON: {}", e)))
    }

    fn note_event(&mut self, msg: Value) -> Result<()> {
        let event_msg: EventMessage = serde_json::from_value(msg)?;
        match Event::from_message(&event_msg) {
            Event::Initialized => self.initialized = true,
            Event::Breakpoint { reason, breakpoint } => {
                tracing::debug!(%reason, id = ?breakpoint.id, verified = breakpoint.verified, "Breakpoint event");
            }
            Event::Terminated => tracing::debug!("Adapter reported termination"),
            Event::Unknown { event, .. } => tracing::trace!(%event, "Ignoring event"),
        }
        Ok(())
    }

    /// Send a request and wait for its response
    pub async fn request<T: serde::de::DeserializeOwned>(
        &mut self,
        command: &str,
        arguments: Option<Value>,
    ) -> Result<T> {
        let seq = self.send_request(command, arguments).await?;

        loop {
            let msg = self.read_message().await?;
            let msg_type = msg
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();

            match msg_type.as_str() {
                "response" => {
                    let response: ResponseMessage = serde_json::from_value(msg)?;
                    if response.request_seq != seq {
                        tracing::warn!(request_seq = response.request_seq, "Dropping unmatched response");
                        continue;
                    }
                    if !response.success {
                        return Err(Error::dap_request_failed(
                            command,
                            &response.message.unwrap_or_else(|| "Unknown error".to_string()),
                        ));
                    }
                    let body = response.body.unwrap_or(Value::Null);
                    return serde_json::from_value(body).map_err(|e| {
                        Error::DapProtocol(format!("Failed to parse {} response: {}", command, e))
                    });
                }
                "event" => self.note_event(msg)?,
                other => tracing::warn!("Unknown message type: {}", other),
            }
        }
    }

    /// Initialize the debug adapter, bounded by `timeout`
    pub async fn initialize(&mut self, adapter_id: &str, timeout: Duration) -> Result<Capabilities> {
        let args = InitializeArguments {
            adapter_id: adapter_id.to_string(),
            ..Default::default()
        };
        let args = serde_json::to_value(&args)?;

        let caps: Capabilities = tokio::time::timeout(timeout, self.request("initialize", Some(args)))
            .await
            .map_err(|_| Error::Timeout(timeout.as_secs()))??;

        self.capabilities = caps.clone();
        Ok(caps)
    }

    /// Wait for the `initialized` event, bounded by `timeout`
    pub async fn wait_initialized(&mut self, timeout: Duration) -> Result<()> {
        let wait = async {
            while !self.initialized {
                let msg = self.read_message().await?;
                if msg.get("type").and_then(|v| v.as_str()) == Some("event") {
                    self.note_event(msg)?;
                }
            }
            Ok::<(), Error>(())
        };
        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| Error::Timeout(timeout.as_secs()))?
    }

    /// Launch a program for debugging
    pub async fn launch(&mut self, args: LaunchArguments) -> Result<()> {
        self.request::<Value>("launch", Some(serde_json::to_value(&args)?))
            .await?;
        Ok(())
    }

    /// Signal that configuration is done
    pub async fn configuration_done(&mut self) -> Result<()> {
        self.request::<Value>("configurationDone", None).await?;
        Ok(())
    }

    /// Replace the breakpoints of one source file
    pub async fn set_breakpoints(
        &mut self,
        source_path: &Path,
        breakpoints: Vec<SourceBreakpoint>,
    ) -> Result<Vec<Breakpoint>> {
        let args = SetBreakpointsArguments {
            source: Source {
                path: Some(source_path.to_string_lossy().into_owned()),
                ..Default::default()
            },
            breakpoints,
        };

        let response: SetBreakpointsResponseBody = self
            .request("setBreakpoints", Some(serde_json::to_value(&args)?))
            .await?;

        Ok(response.breakpoints)
    }

    /// Disconnect from the debug adapter
    pub async fn disconnect(&mut self, terminate_debuggee: bool) -> Result<()> {
        let args = DisconnectArguments {
            restart: false,
            terminate_debuggee: Some(terminate_debuggee),
        };

        // The adapter may exit before answering
        let _ = self
            .send_request("disconnect", Some(serde_json::to_value(&args)?))
            .await;

        Ok(())
    }

    /// Disconnect, then kill the adapter if it is still around
    pub async fn terminate(&mut self) -> Result<()> {
        let _ = self.disconnect(true).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = self.adapter.kill().await;
        Ok(())
    }

    /// Check if the adapter is still running
    pub fn is_running(&mut self) -> bool {
        self.adapter.try_wait().ok().flatten().is_none()
    }
}
