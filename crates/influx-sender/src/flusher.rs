// SPDX-License-Identifier: Apache-2.0

//! The flush cycle: drain the pending batch, deliver it in chunks, re-queue
//! the young points of failed chunks.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::DeliveryError;
use crate::influx::InfluxApi;
use crate::point::Point;

/// What one flush cycle did with the drained batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct FlushOutcome {
    /// Points accepted by the store.
    pub delivered: usize,
    /// Points of failed chunks put back for the next cycle.
    pub requeued: usize,
    /// Points of failed chunks dropped for age.
    pub expired: usize,
}

pub(crate) struct Flusher {
    batch: Arc<Mutex<Vec<Point>>>,
    api: InfluxApi,
    errs: mpsc::Sender<DeliveryError>,
    max_chunk_size: usize,
    max_point_age: Duration,
}

#[allow(clippy::expect_used)]
impl Flusher {
    pub(crate) fn new(
        batch: Arc<Mutex<Vec<Point>>>,
        api: InfluxApi,
        errs: mpsc::Sender<DeliveryError>,
        max_chunk_size: usize,
        max_point_age: Duration,
    ) -> Self {
        Flusher {
            batch,
            api,
            errs,
            max_chunk_size,
            max_point_age,
        }
    }

    /// Runs flush cycles on `write_interval` until cancelled, then one last
    /// cycle so the in-flight batch gets a final delivery attempt.
    pub(crate) async fn run(self, write_interval: Duration, cancel_token: CancellationToken) {
        let mut ticker = interval(write_interval);
        ticker.tick().await; // discard first tick, which is instantaneous

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush_cycle().await;
                }
                _ = cancel_token.cancelled() => {
                    debug!("sender shutting down, flushing remaining points");
                    self.flush_cycle().await;
                    break;
                }
            }
        }
    }

    /// One delivery attempt for everything pending.
    ///
    /// The batch is swapped out under the lock and delivered outside it, so
    /// producers are never blocked by network I/O. Survivors of failed
    /// chunks are merged into whatever batch is current once filtering is
    /// done, under a second short lock acquisition.
    pub(crate) async fn flush_cycle(&self) -> FlushOutcome {
        let pending = {
            let mut batch = self.batch.lock().expect("lock poisoned");
            std::mem::take(&mut *batch)
        };
        if pending.is_empty() {
            return FlushOutcome::default();
        }

        debug!("flushing {} pending points", pending.len());

        let mut outcome = FlushOutcome::default();
        let mut survivors = Vec::new();
        for chunk in pending.chunks(self.max_chunk_size) {
            match self.api.write(chunk).await {
                Ok(()) => outcome.delivered += chunk.len(),
                Err(source) => {
                    warn!("chunk of {} points failed: {source}", chunk.len());
                    self.report(DeliveryError {
                        points: chunk.len(),
                        source,
                    });

                    let now = SystemTime::now();
                    for point in chunk {
                        if point.age(now) < self.max_point_age {
                            survivors.push(point.clone());
                        } else {
                            outcome.expired += 1;
                        }
                    }
                }
            }
        }

        if outcome.expired > 0 {
            debug!("dropped {} points past the age bound", outcome.expired);
        }

        outcome.requeued = survivors.len();
        if !survivors.is_empty() {
            let mut batch = self.batch.lock().expect("lock poisoned");
            batch.extend(survivors);
        }

        outcome
    }

    /// Non-blocking error report. A full channel means the consumer is not
    /// keeping up; the report is dropped rather than stalling delivery.
    fn report(&self, err: DeliveryError) {
        if let Err(mpsc::error::TrySendError::Full(dropped)) = self.errs.try_send(err) {
            warn!("delivery error channel full, dropping report: {dropped}");
        }
    }
}
