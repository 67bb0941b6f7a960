//! Maintenance
//!
//! Background thread that periodically reclaims engine space.
//!
//! The thread ticks on a fixed interval and stops on whichever comes first:
//! - the context is cancelled or its deadline passes
//! - `Maintenance::stop()` is called or the handle is dropped
//! - the store is closed or dropped
//!
//! A failed pass is logged and the next tick runs as usual.

use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, select, Receiver, Sender};
use tracing::{debug, info, warn};

use super::link_store::{LinkStore, ReclaimOutcome};
use crate::context::Context;
use crate::error::{Result, VaultError};

/// Something a reclaim thread can run passes against
pub trait Reclaim: Send + Sync + 'static {
    fn reclaim(&self) -> Result<ReclaimOutcome>;
}

impl Reclaim for LinkStore {
    fn reclaim(&self) -> Result<ReclaimOutcome> {
        LinkStore::reclaim(self)
    }
}

/// Handle to a running reclaim thread
///
/// Dropping the handle stops the thread and waits for it.
pub struct Maintenance {
    /// Dropped to signal shutdown
    stop_tx: Option<Sender<()>>,

    handle: Option<JoinHandle<()>>,
}

impl Maintenance {
    /// Start reclaiming `store` every `interval` until `ctx` ends
    ///
    /// The thread only holds a weak reference, so it never keeps the store
    /// alive on its own.
    pub fn spawn<R: Reclaim>(store: &Arc<R>, ctx: &Context, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(VaultError::Config(
                "reclaim interval must be greater than zero".to_string(),
            ));
        }

        let store = Arc::downgrade(store);
        let ctx = ctx.clone();
        let (stop_tx, stop_rx) = channel::bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("linkvault-reclaim".to_string())
            .spawn(move || run(store, ctx, interval, stop_rx))?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// True once the thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }

    fn shutdown(&mut self) {
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("reclaim thread panicked");
            }
        }
    }
}

impl Drop for Maintenance {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<R: Reclaim>(store: Weak<R>, ctx: Context, interval: Duration, stop_rx: Receiver<()>) {
    let ticker = channel::tick(interval);
    let done = ctx.done();
    let expired = ctx.expired();
    let mut run_id = 0u64;

    info!(interval_secs = interval.as_secs(), "reclaim routine started");

    loop {
        select! {
            recv(ticker) -> _ => {
                run_id += 1;
                let Some(live) = store.upgrade() else {
                    debug!("store dropped, stopping reclaim routine");
                    break;
                };

                match live.reclaim() {
                    Ok(ReclaimOutcome::Compacted) => {
                        info!(run = run_id, "reclaim pass released space");
                    }
                    Ok(ReclaimOutcome::NothingToReclaim) => {
                        debug!(run = run_id, "nothing to reclaim");
                    }
                    Ok(ReclaimOutcome::Busy) => {
                        debug!(run = run_id, "previous reclaim pass still running, skipped");
                    }
                    Err(VaultError::StoreClosed) => {
                        info!("store closed, stopping reclaim routine");
                        break;
                    }
                    Err(e) => {
                        warn!(run = run_id, error = %e, "reclaim pass failed");
                    }
                }
            }
            recv(done) -> _ => {
                info!("context cancelled, stopping reclaim routine");
                break;
            }
            recv(expired) -> _ => {
                info!("context deadline passed, stopping reclaim routine");
                break;
            }
            recv(stop_rx) -> _ => {
                debug!("reclaim routine stopped");
                break;
            }
        }
    }
}
