// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ZMQ PUB pattern
//!
//! PUB sockets never block on slow subscribers. Once a subscriber's high water
//! mark is reached further messages to it are dropped by ZMQ.

use super::{attach, link_verb};
use crate::common::{TransportConfig, TransportError, TransportResult};
use crate::traits::{Publisher, Transport};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// ZMQ PUB socket implementation (publisher)
pub struct ZmqPub {
    context: Arc<zmq::Context>,
    config: TransportConfig,
    socket: Mutex<Option<zmq::Socket>>,
    running: AtomicBool,
}

impl ZmqPub {
    pub fn new(context: Arc<zmq::Context>, config: TransportConfig) -> TransportResult<Self> {
        config.validate()?;

        Ok(Self {
            context,
            config,
            socket: Mutex::new(None),
            running: AtomicBool::new(false),
        })
    }

    /// Create with a private context, connecting to `address`
    pub fn with_address(address: impl Into<String>) -> TransportResult<Self> {
        Self::new(
            Arc::new(zmq::Context::new()),
            TransportConfig::new(address),
        )
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Transport for ZmqPub {
    fn start(&mut self) -> TransportResult<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(TransportError::AlreadyRunning);
        }

        let socket = self.context.socket(zmq::PUB)?;
        socket.set_linger(self.config.linger_ms())?;
        socket.set_sndhwm(self.config.send_hwm)?;
        socket.set_conflate(false)?;
        match self.config.timeout {
            Some(timeout) => {
                socket.set_sndtimeo(i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX))?
            }
            None => socket.set_sndtimeo(-1)?,
        }

        attach(&socket, &self.config)?;

        *self.socket.lock() = Some(socket);
        self.running.store(true, Ordering::SeqCst);

        info!(
            "[ZMQ-PUB] {} {}",
            link_verb(self.config.link),
            self.config.address
        );

        Ok(())
    }

    fn stop(&mut self) -> TransportResult<()> {
        self.running.store(false, Ordering::SeqCst);
        if self.socket.lock().take().is_some() {
            info!("[ZMQ-PUB] Closed {}", self.config.address);
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn transport_type(&self) -> &str {
        "zmq-pub"
    }
}

impl Publisher for ZmqPub {
    fn publish(&self, topic: &[u8], data: &[u8]) -> TransportResult<()> {
        self.config.check_size(data.len())?;

        let guard = self.socket.lock();
        let socket = guard.as_ref().ok_or(TransportError::NotRunning)?;

        socket
            .send(topic, zmq::SNDMORE)
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        socket
            .send(data, 0)
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        Ok(())
    }

    fn publish_simple(&self, data: &[u8]) -> TransportResult<()> {
        self.config.check_size(data.len())?;

        let guard = self.socket.lock();
        let socket = guard.as_ref().ok_or(TransportError::NotRunning)?;

        socket
            .send(data, 0)
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        Ok(())
    }
}
