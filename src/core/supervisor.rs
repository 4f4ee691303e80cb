//! Background indexer supervision
//!
//! Keeps the cass index fresh either through a long-running
//! `cass index --watch` child or, when watch mode is disabled or fails to
//! launch, through a periodic `cass index` timer.
//!
//! The steady-state task owns the watch child exclusively and publishes
//! every transition through a `watch` channel; request handlers only ever
//! read snapshots. A crashed watch child is relaunched after a backoff,
//! forever, until [`BackgroundIndexer::stop`] is called.

use crate::core::config::Config;
use crate::core::runner::CassRunner;
use crate::core::types::{IndexerMode, IndexerStatus, InvocationFailure, InvocationResult};
use chrono::Utc;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Timing knobs for the supervisor
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    /// Periodic mode interval
    pub interval: Duration,
    /// Delay before relaunching a crashed watch child
    pub restart_backoff: Duration,
    /// Time between SIGTERM and SIGKILL on stop
    pub stop_grace: Duration,
    /// Timeout for one index pass
    pub index_timeout: Duration,
}

impl From<&Config> for SupervisorSettings {
    fn from(config: &Config) -> Self {
        Self {
            interval: Duration::from_secs(config.indexer.interval_secs),
            restart_backoff: Duration::from_secs(config.indexer.restart_backoff_secs),
            stop_grace: Duration::from_secs(config.indexer.stop_grace_secs),
            index_timeout: config.cass.index_timeout(),
        }
    }
}

struct Lifecycle {
    running: bool,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// Supervises background indexing of the cass data directory
pub struct BackgroundIndexer {
    ctx: IndexContext,
    lifecycle: Mutex<Lifecycle>,
}

impl BackgroundIndexer {
    pub fn new(runner: CassRunner, settings: SupervisorSettings) -> Self {
        let (status, _) = watch::channel(IndexerStatus::default());
        Self {
            ctx: IndexContext {
                runner,
                settings,
                status: Arc::new(status),
            },
            lifecycle: Mutex::new(Lifecycle {
                running: false,
                token: CancellationToken::new(),
                task: None,
            }),
        }
    }

    /// Start indexing; a no-op if already running
    ///
    /// When `run_initial` is set, one incremental pass runs before the
    /// steady state is entered. Its failure is logged, never returned.
    pub async fn start(&self, use_watch: bool, run_initial: bool) {
        let token = {
            let mut lifecycle = self.lifecycle.lock().await;
            if lifecycle.running {
                warn!("Background indexer already running");
                return;
            }
            lifecycle.running = true;
            lifecycle.token = CancellationToken::new();
            self.ctx.status.send_modify(|s| {
                s.is_running = true;
                s.mode = IndexerMode::Starting;
            });
            lifecycle.token.clone()
        };

        if run_initial {
            info!("Running initial index...");
            tokio::select! {
                _ = token.cancelled() => {}
                _ = self.ctx.run_index(false) => {}
            }
        }

        let mut lifecycle = self.lifecycle.lock().await;
        if token.is_cancelled() {
            debug!("Indexer stopped during initial pass");
            return;
        }

        let ctx = self.ctx.clone();
        lifecycle.task = Some(if use_watch {
            tokio::spawn(ctx.supervise_watch(token))
        } else {
            tokio::spawn(ctx.run_periodic(token))
        });
        info!("Background indexer started successfully");
    }

    /// Fire a one-off index pass alongside whatever mode is active
    ///
    /// Concurrent triggers are not coalesced; each runs its own pass.
    pub fn trigger(&self, full: bool) -> JoinHandle<InvocationResult> {
        info!(full, "Manual index triggered");
        let ctx = self.ctx.clone();
        tokio::spawn(async move { ctx.run_index(full).await })
    }

    /// Stop indexing and wait until no watch child is left alive
    pub async fn stop(&self) {
        info!("Stopping background indexer...");

        let task = {
            let mut lifecycle = self.lifecycle.lock().await;
            lifecycle.token.cancel();
            lifecycle.running = false;
            lifecycle.task.take()
        };

        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Indexer task ended abnormally: {}", e);
            }
        }

        self.ctx.status.send_modify(|s| {
            s.is_running = false;
            s.mode = IndexerMode::Stopped;
            s.watch_pid = None;
            s.index_interval_seconds = None;
        });
        info!("Background indexer stopped");
    }

    /// Current status snapshot
    pub fn get_status(&self) -> IndexerStatus {
        self.ctx.status.borrow().clone()
    }

    /// Receive every status change
    pub fn subscribe(&self) -> watch::Receiver<IndexerStatus> {
        self.ctx.status.subscribe()
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.ctx.settings
    }
}

impl Drop for BackgroundIndexer {
    fn drop(&mut self) {
        // The watch child is kill_on_drop, so cancelling is enough
        if let Ok(lifecycle) = self.lifecycle.try_lock() {
            lifecycle.token.cancel();
        }
    }
}

/// State shared by the background tasks
#[derive(Clone)]
struct IndexContext {
    runner: CassRunner,
    settings: SupervisorSettings,
    status: Arc<watch::Sender<IndexerStatus>>,
}

impl IndexContext {
    /// One `cass index` pass; outcome is logged and counted
    async fn run_index(&self, full: bool) -> InvocationResult {
        let mut args = vec!["index".to_string()];
        if full {
            args.push("--full".to_string());
        }

        let result = self.runner.run(&args, self.settings.index_timeout).await;
        let succeeded = result.is_success();

        let mut count = 0;
        self.status.send_modify(|s| {
            s.index_count += 1;
            if succeeded {
                s.last_index_time = Some(Utc::now());
            } else {
                s.failed_index_count += 1;
            }
            count = s.index_count;
        });

        match &result {
            InvocationResult::Success(_) => {
                info!("Index completed successfully (count: {})", count);
            }
            InvocationResult::Failure(InvocationFailure::Exit { stderr, .. }) => {
                warn!("Index completed with errors: {}", stderr);
            }
            InvocationResult::Failure(InvocationFailure::Message(message)) => {
                error!("Index operation failed: {}", message);
            }
        }

        result
    }

    /// Keep `cass index --watch` alive until cancelled
    async fn supervise_watch(self, token: CancellationToken) {
        let args = vec!["index".to_string(), "--watch".to_string()];

        loop {
            let mut cmd = self.runner.command(&args);
            cmd.stdout(Stdio::null());

            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) => {
                    error!(
                        "Failed to start watch mode: {}, falling back to periodic indexing",
                        e
                    );
                    return self.run_periodic(token).await;
                }
            };

            let pid = child.id();
            if let Some(stderr) = child.stderr.take() {
                tokio::spawn(log_watch_output(stderr));
            }
            self.status.send_modify(|s| {
                s.mode = IndexerMode::Watch;
                s.watch_pid = pid;
                s.index_interval_seconds = None;
            });
            info!("Watch mode started (PID: {:?})", pid);

            let exited = tokio::select! {
                exit = child.wait() => Some(exit),
                _ = token.cancelled() => None,
            };

            match exited {
                None => {
                    self.terminate(child).await;
                    return;
                }
                Some(Ok(status)) => warn!("Watch process exited with {}", status),
                Some(Err(e)) => warn!("Failed to wait on watch process: {}", e),
            }

            self.status.send_modify(|s| {
                s.mode = IndexerMode::Starting;
                s.watch_pid = None;
            });

            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(self.settings.restart_backoff) => {}
            }

            info!("Restarting watch mode...");
            self.status.send_modify(|s| s.watch_restarts += 1);
        }
    }

    /// Incremental pass every `interval` until cancelled
    async fn run_periodic(self, token: CancellationToken) {
        let interval = self.settings.interval;
        info!("Starting periodic indexing (interval: {}s)", interval.as_secs());

        self.status.send_modify(|s| {
            s.mode = IndexerMode::Periodic;
            s.watch_pid = None;
            s.index_interval_seconds = Some(interval.as_secs());
        });

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            info!("Running periodic incremental index...");
            tokio::select! {
                _ = token.cancelled() => break,
                _ = self.run_index(false) => {}
            }
        }
    }

    /// SIGTERM, then SIGKILL after the grace period
    async fn terminate(&self, mut child: Child) {
        info!("Terminating watch process (PID: {:?})", child.id());
        request_exit(&mut child);

        if tokio::time::timeout(self.settings.stop_grace, child.wait())
            .await
            .is_err()
        {
            warn!("Watch process did not exit after SIGTERM, killing");
            if let Err(e) = child.kill().await {
                warn!("Failed to kill watch process: {}", e);
            }
        }
    }
}

#[cfg(unix)]
fn request_exit(child: &mut Child) {
    if let Some(pid) = child.id() {
        // SAFETY: signal delivery to a child we have not reaped yet
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
    }
}

#[cfg(not(unix))]
fn request_exit(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        warn!("Failed to kill watch process: {}", e);
    }
}

/// Forward the watch child's stderr to the log
async fn log_watch_output(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "cass_watch", "{}", line);
    }
}
