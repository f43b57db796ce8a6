//! Background reconciliation worker.
//!
//! This module provides a thread that pulls from the remote source once at
//! start and then on every interval tick, and sends queued pushes between
//! ticks.

use crate::model::quote::Quote;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::quote_service::QuoteService;
use crate::sync::reconciler::Reconciler;
use log::info;
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Statistics from the reconciliation worker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    pub pulls: usize,
    pub pull_failures: usize,
    pub quotes_merged: usize,
    pub pushes: usize,
    pub push_failures: usize,
}

enum WorkerCommand {
    Push(Quote),
    Stop,
}

/// Handle to a running reconciliation thread.
///
/// Dropping the handle stops the worker and waits for it to exit.
pub struct ReconcileWorker {
    command_tx: Sender<WorkerCommand>,
    handle: Option<JoinHandle<WorkerStats>>,
}

impl ReconcileWorker {
    /// Spawns the worker over a shared service.
    pub fn spawn<D, S>(
        reconciler: Reconciler,
        service: Arc<Mutex<QuoteService<D, S>>>,
        interval: Duration,
    ) -> Self
    where
        D: KeyValueStore + Send + 'static,
        S: KeyValueStore + Send + 'static,
    {
        let (command_tx, command_rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = WorkerStats::default();

            loop {
                stats.pulls += 1;
                match reconciler.pull_once(&service) {
                    Ok(added) => stats.quotes_merged += added,
                    Err(_) => stats.pull_failures += 1,
                }

                let next_pull = Instant::now() + interval;
                loop {
                    let wait = next_pull.saturating_duration_since(Instant::now());
                    match command_rx.recv_timeout(wait) {
                        Ok(WorkerCommand::Push(quote)) => {
                            stats.pushes += 1;
                            if reconciler.push(&quote).is_err() {
                                stats.push_failures += 1;
                            }
                        }
                        Ok(WorkerCommand::Stop) | Err(RecvTimeoutError::Disconnected) => {
                            info!(
                                "event=worker_stop module=sync pulls={} pull_failures={} merged={} pushes={}",
                                stats.pulls, stats.pull_failures, stats.quotes_merged, stats.pushes
                            );
                            return stats;
                        }
                        Err(RecvTimeoutError::Timeout) => break,
                    }
                }
            }
        });

        Self {
            command_tx,
            handle: Some(handle),
        }
    }

    /// Queues a best-effort push. Returns `false` when the worker has exited.
    pub fn push(&self, quote: Quote) -> bool {
        self.command_tx.send(WorkerCommand::Push(quote)).is_ok()
    }

    /// Stops the worker and returns its statistics.
    pub fn stop(mut self) -> WorkerStats {
        self.shutdown()
    }

    fn shutdown(&mut self) -> WorkerStats {
        let _ = self.command_tx.send(WorkerCommand::Stop);
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => WorkerStats::default(),
        }
    }
}

impl Drop for ReconcileWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}
