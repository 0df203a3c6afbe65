//! Remote session backed by a Debug Adapter Protocol adapter
//!
//! DAP replaces all breakpoints of a source file per `setBreakpoints`
//! request, so the session remembers every line placed so far and resends
//! the whole set for the file being touched.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::{config::Config, Error, Result};
use crate::dap::{Capabilities, DapClient, LaunchArguments, SourceBreakpoint};

use super::RemoteSession;

struct Inner {
    client: DapClient,
    /// One-based lines placed so far, per source file
    lines: HashMap<PathBuf, BTreeSet<u32>>,
}

/// Debug adapter process acting as the remote session
pub struct DapSession {
    inner: Mutex<Inner>,
    adapter_name: String,
    capabilities: Capabilities,
    request_timeout: Duration,
}

impl DapSession {
    /// Spawn the adapter, initialize it and launch `program`
    ///
    /// Returns once the adapter has sent `initialized`, i.e. while it is
    /// waiting for breakpoints. Call [`configuration_done`](Self::configuration_done)
    /// after binding to let the program run.
    #[tracing::instrument(skip(config, args), fields(adapter = %adapter_name.as_deref().unwrap_or("default")))]
    pub async fn launch(
        config: &Config,
        adapter_name: Option<String>,
        program: &Path,
        args: Vec<String>,
    ) -> Result<Self> {
        let adapter_name = adapter_name.unwrap_or_else(|| config.defaults.adapter.clone());
        let adapter_config = config
            .get_adapter(&adapter_name)
            .ok_or_else(|| Error::adapter_not_found(&adapter_name, &[&adapter_name]))?;

        tracing::info!(
            program = %program.display(),
            adapter_path = %adapter_config.path.display(),
            adapter_args = ?adapter_config.args,
            "Launching debug session"
        );

        let mut client = DapClient::spawn(&adapter_config.path, &adapter_config.args).await?;

        let init_timeout = Duration::from_secs(config.timeouts.dap_initialize_secs);
        let request_timeout = Duration::from_secs(config.timeouts.dap_request_secs);

        let capabilities = client.initialize(&adapter_name, init_timeout).await?;
        tracing::debug!(?capabilities, "DAP adapter initialized");

        let cwd = std::env::current_dir()
            .ok()
            .map(|p| p.to_string_lossy().into_owned());
        let launch = LaunchArguments {
            program: program.to_string_lossy().into_owned(),
            args,
            cwd,
            stop_on_entry: false,
        };
        with_timeout(request_timeout, client.launch(launch)).await?;
        client.wait_initialized(request_timeout).await?;
        tracing::debug!("Adapter is ready for breakpoints");

        Ok(Self {
            inner: Mutex::new(Inner {
                client,
                lines: HashMap::new(),
            }),
            adapter_name,
            capabilities,
            request_timeout,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Lines currently placed in `file`
    pub async fn placed_lines(&self, file: &Path) -> Vec<u32> {
        let inner = self.inner.lock().await;
        inner
            .lines
            .get(file)
            .map(|lines| lines.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Tell the adapter configuration is finished so the program starts
    pub async fn configuration_done(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        with_timeout(self.request_timeout, inner.client.configuration_done()).await
    }

    /// Disconnect and stop the adapter process
    pub async fn terminate(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        tracing::info!(adapter = %self.adapter_name, "Terminating debug session");
        inner.client.terminate().await
    }
}

impl std::fmt::Debug for DapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DapSession")
            .field("adapter_name", &self.adapter_name)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    future: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| Error::Timeout(timeout.as_secs()))?
}

#[async_trait]
impl RemoteSession for DapSession {
    async fn add_breakpoint(&self, file: &Path, line: u32) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let Inner { client, lines } = &mut *inner;

        if !client.is_running() {
            return Err(Error::AdapterCrashed);
        }

        let placed = lines.entry(file.to_path_buf()).or_default();
        let newly_added = placed.insert(line);
        let index = placed.iter().position(|l| *l == line).unwrap_or_default();
        let breakpoints: Vec<SourceBreakpoint> = placed
            .iter()
            .map(|&line| SourceBreakpoint { line, column: None })
            .collect();

        let results = match with_timeout(self.request_timeout, client.set_breakpoints(file, breakpoints)).await {
            Ok(results) => results,
            Err(e) => {
                if newly_added {
                    placed.remove(&line);
                }
                return Err(e);
            }
        };

        // Adapters answer in request order
        let location = format!("{}:{}", file.display(), line);
        match results.get(index) {
            Some(bp) if bp.verified => {
                tracing::debug!(%location, id = ?bp.id, actual_line = ?bp.line, "Adapter verified breakpoint");
                Ok(())
            }
            Some(bp) => Err(Error::breakpoint_failed(
                &location,
                bp.message.as_deref().unwrap_or("not verified by adapter"),
            )),
            None => Err(Error::breakpoint_failed(
                &location,
                "adapter returned fewer breakpoints than requested",
            )),
        }
    }
}
