// SPDX-License-Identifier: Apache-2.0

//! Batching sender for InfluxDB metric points.
//!
//! Producers record points through a cloneable [`sender::MetricsSender`]
//! handle; a background task flushes the accumulated batch to InfluxDB on a
//! fixed interval, splitting it into size-bounded chunks. Points of a failed
//! chunk are retried on later cycles until they exceed a maximum age, at
//! which point they are dropped. Write failures are reported over a bounded
//! error channel so a slow consumer never stalls delivery.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod config;
pub mod errors;
mod flusher;
pub mod influx;
pub mod line_protocol;
pub mod point;
pub mod sender;

pub use config::SenderConfig;
pub use errors::{CreationError, DeliveryError, PointError, WriteError};
pub use point::{FieldValue, Point};
pub use sender::MetricsSender;
