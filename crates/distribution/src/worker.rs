//! Event-driven trigger: a worker thread reacting to variant changes.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use syndicate_catalog::{CatalogStore, ChannelDirectory};
use syndicate_events::{NotificationBus, Subscription, VariantChanged};

use crate::engine::DistributionEngine;

/// Default settle time before re-reading notified variants.
///
/// Not a retry: it gives the triggering transaction's writes time to
/// become visible to the subsequent hydration read. Tests pass
/// `Duration::ZERO`.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Variant sync worker loop.
///
/// - Subscribes to [`VariantChanged`] notifications
/// - Waits the settle delay, hydrates the affected variants, and runs one
///   distribution pass per notification
/// - Never crashes on a failed pass (logged, next notification proceeds)
/// - Supports graceful shutdown
#[derive(Debug)]
pub struct VariantSyncWorker;

impl VariantSyncWorker {
    /// Spawn a worker thread that processes notifications from the bus.
    pub fn spawn<S, D, B>(
        name: &'static str,
        engine: DistributionEngine<S, D>,
        bus: B,
        settle_delay: Duration,
    ) -> WorkerHandle
    where
        S: CatalogStore + 'static,
        D: ChannelDirectory + 'static,
        B: NotificationBus<VariantChanged> + Send + Sync + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub: Subscription<VariantChanged> = bus.subscribe();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, &engine, &sub, &shutdown_rx, settle_delay))
            .expect("failed to spawn variant sync worker thread");

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}

fn worker_loop<S, D>(
    name: &'static str,
    engine: &DistributionEngine<S, D>,
    sub: &Subscription<VariantChanged>,
    shutdown_rx: &mpsc::Receiver<()>,
    settle_delay: Duration,
) where
    S: CatalogStore,
    D: ChannelDirectory,
{
    let tick = Duration::from_millis(250);

    loop {
        // Shutdown check (non-blocking)
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(notification) => handle_notification(name, engine, notification, settle_delay),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn handle_notification<S, D>(
    name: &'static str,
    engine: &DistributionEngine<S, D>,
    notification: VariantChanged,
    settle_delay: Duration,
) where
    S: CatalogStore,
    D: ChannelDirectory,
{
    if notification.variant_ids.is_empty() {
        return;
    }

    // Let the triggering transaction's writes become visible before the
    // hydration read below.
    if !settle_delay.is_zero() {
        thread::sleep(settle_delay);
    }

    match engine.distribute_ids(&notification.ctx, &notification.variant_ids) {
        Ok(stats) => {
            debug!(
                worker = name,
                change = ?notification.change_type,
                processed = stats.processed,
                skipped = stats.skipped,
                "variant sync pass finished"
            );
        }
        Err(e) => {
            warn!(worker = name, error = %e, "variant sync pass failed");
        }
    }
}
