// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transport trait definitions
//!
//! These traits define the common interface for all transport implementations,
//! so the frame worker can run over ZMQ in production and over in-process
//! channels in tests.

use crate::common::{TopicMessage, TransportResult};

/// Base transport trait - implemented by all transports
pub trait Transport: Send + Sync {
    /// Open the underlying socket or channel
    fn start(&mut self) -> TransportResult<()>;

    /// Close the underlying socket or channel
    fn stop(&mut self) -> TransportResult<()>;

    fn is_running(&self) -> bool;

    /// Get transport name/type
    fn transport_type(&self) -> &str;
}

/// Publish-Subscribe pattern (Publisher side)
pub trait Publisher: Transport {
    /// Publish `[topic, data]` as a two-part message
    fn publish(&self, topic: &[u8], data: &[u8]) -> TransportResult<()>;

    /// Publish `data` as a single-part message
    fn publish_simple(&self, data: &[u8]) -> TransportResult<()>;
}

/// Publish-Subscribe pattern (Subscriber side)
pub trait Subscriber: Transport {
    /// Subscribe to a topic prefix. The empty prefix receives everything.
    fn subscribe(&mut self, topic: &[u8]) -> TransportResult<()>;

    fn unsubscribe(&mut self, topic: &[u8]) -> TransportResult<()>;

    /// Block until a message arrives
    fn receive(&self) -> TransportResult<TopicMessage>;

    /// Wait up to `timeout_ms` for a message, `TransportError::Timeout` otherwise
    fn receive_timeout(&self, timeout_ms: u64) -> TransportResult<TopicMessage>;

    /// Take a queued message without waiting. `Ok(None)` when nothing is queued.
    fn try_receive(&self) -> TransportResult<Option<TopicMessage>>;
}
