// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::SenderConfig;
use crate::errors::{CreationError, DeliveryError, PointError};
use crate::flusher::Flusher;
use crate::influx::InfluxApi;
use crate::point::{FieldValue, Point};

/// Cloneable producer handle over the shared pending batch.
///
/// Recording a point takes the batch lock for the duration of a `Vec` push;
/// the flush task never holds that lock across network I/O, so producers are
/// never blocked by a slow or failing write.
#[derive(Clone)]
pub struct MetricsSender {
    batch: Arc<Mutex<Vec<Point>>>,
    cancel_token: CancellationToken,
    done: CancellationToken,
}

impl MetricsSender {
    /// Builds the InfluxDB client and starts the periodic flush task.
    ///
    /// The returned receiver yields one [`DeliveryError`] per failed chunk
    /// write and is meant to be drained by a dedicated logging task. When it
    /// falls behind, further reports are dropped, never delivery itself.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: SenderConfig,
    ) -> Result<(MetricsSender, mpsc::Receiver<DeliveryError>), CreationError> {
        // Zero values would panic later, in channel creation or inside the
        // flush task where nothing surfaces the error. Reject them here.
        if config.max_chunk_size == 0 {
            return Err(CreationError::InvalidConfig("max_chunk_size"));
        }
        if config.error_capacity == 0 {
            return Err(CreationError::InvalidConfig("error_capacity"));
        }
        if config.write_interval.is_zero() {
            return Err(CreationError::InvalidConfig("write_interval"));
        }

        let api = InfluxApi::new(&config)?;
        let batch = Arc::new(Mutex::new(Vec::new()));
        let (errs_tx, errs_rx) = mpsc::channel(config.error_capacity);
        let cancel_token = CancellationToken::new();

        let flusher = Flusher::new(
            Arc::clone(&batch),
            api,
            errs_tx,
            config.max_chunk_size,
            config.max_point_age,
        );
        let done = CancellationToken::new();
        let done_guard = done.clone().drop_guard();
        let write_interval = config.write_interval;
        let loop_token = cancel_token.clone();
        tokio::spawn(async move {
            // Cancels `done` when the task finishes, even if it panics.
            let _done_guard = done_guard;
            flusher.run(write_interval, loop_token).await;
        });
        debug!("metrics sender started, flushing every {write_interval:?}");

        Ok((
            MetricsSender {
                batch,
                cancel_token,
                done,
            },
            errs_rx,
        ))
    }

    /// Appends one point to the pending batch, stamped with the current
    /// time. Thread-safe and non-blocking beyond the batch lock.
    pub fn record_point(
        &self,
        name: impl Into<String>,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<(), PointError> {
        let point = Point::new_at(name, tags, fields, SystemTime::now())?;

        #[allow(clippy::expect_used)]
        let mut batch = self.batch.lock().expect("lock poisoned");
        batch.push(point);

        Ok(())
    }

    /// Stops the flush timer and waits for the task to run one final cycle
    /// for the in-flight batch.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        self.done.cancelled().await;
    }

    /// Number of points currently awaiting delivery.
    pub fn pending(&self) -> usize {
        #[allow(clippy::expect_used)]
        let batch = self.batch.lock().expect("lock poisoned");
        batch.len()
    }
}
