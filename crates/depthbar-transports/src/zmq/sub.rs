// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ZMQ SUB pattern
//!
//! A message is either `[topic, payload]` or a single `payload` part. Any parts
//! beyond the second are drained and discarded so the next receive starts on a
//! message boundary.

use super::{attach, link_verb};
use crate::common::{TopicMessage, TransportConfig, TransportError, TransportResult};
use crate::traits::{Subscriber, Transport};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// ZMQ SUB socket implementation (subscriber)
pub struct ZmqSub {
    context: Arc<zmq::Context>,
    config: TransportConfig,
    socket: Mutex<Option<zmq::Socket>>,
    running: AtomicBool,
}

impl ZmqSub {
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

    /// Read the rest of a message whose first part is `first`
    fn finish_message(
        &self,
        socket: &zmq::Socket,
        first: zmq::Message,
    ) -> TransportResult<TopicMessage> {
        if !socket.get_rcvmore()? {
            self.config.check_size(first.len())?;
            return Ok(TopicMessage::untopiced(first.to_vec()));
        }

        let payload = socket
            .recv_msg(0)
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;

        let mut extra_parts = 0usize;
        while socket.get_rcvmore()? {
            socket
                .recv_msg(0)
                .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
            extra_parts += 1;
        }
        if extra_parts > 0 {
            debug!("[ZMQ-SUB] Discarded {} extra message parts", extra_parts);
        }

        self.config.check_size(payload.len())?;
        Ok(TopicMessage::new(first.to_vec(), payload.to_vec()))
    }
}

impl Transport for ZmqSub {
    fn start(&mut self) -> TransportResult<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(TransportError::AlreadyRunning);
        }

        let socket = self.context.socket(zmq::SUB)?;
        socket.set_linger(self.config.linger_ms())?;
        socket.set_rcvhwm(self.config.recv_hwm)?;
        socket.set_conflate(false)?;

        attach(&socket, &self.config)?;

        *self.socket.lock() = Some(socket);
        self.running.store(true, Ordering::SeqCst);

        info!(
            "[ZMQ-SUB] {} {}",
            link_verb(self.config.link),
            self.config.address
        );

        Ok(())
    }

    fn stop(&mut self) -> TransportResult<()> {
        self.running.store(false, Ordering::SeqCst);
        if self.socket.lock().take().is_some() {
            info!("[ZMQ-SUB] Closed {}", self.config.address);
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn transport_type(&self) -> &str {
        "zmq-sub"
    }
}

impl Subscriber for ZmqSub {
    fn subscribe(&mut self, topic: &[u8]) -> TransportResult<()> {
        let guard = self.socket.lock();
        let socket = guard.as_ref().ok_or(TransportError::NotRunning)?;
        socket.set_subscribe(topic)?;
        Ok(())
    }

    fn unsubscribe(&mut self, topic: &[u8]) -> TransportResult<()> {
        let guard = self.socket.lock();
        let socket = guard.as_ref().ok_or(TransportError::NotRunning)?;
        socket.set_unsubscribe(topic)?;
        Ok(())
    }

    fn receive(&self) -> TransportResult<TopicMessage> {
        let guard = self.socket.lock();
        let socket = guard.as_ref().ok_or(TransportError::NotRunning)?;

        let first = socket
            .recv_msg(0)
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
        self.finish_message(socket, first)
    }

    fn receive_timeout(&self, timeout_ms: u64) -> TransportResult<TopicMessage> {
        let guard = self.socket.lock();
        let socket = guard.as_ref().ok_or(TransportError::NotRunning)?;

        let timeout = i64::try_from(timeout_ms).unwrap_or(i64::MAX);
        let mut poll_items = [socket.as_poll_item(zmq::POLLIN)];
        zmq::poll(&mut poll_items, timeout)?;
        if !poll_items[0].is_readable() {
            return Err(TransportError::Timeout);
        }

        let first = socket
            .recv_msg(0)
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
        self.finish_message(socket, first)
    }

    fn try_receive(&self) -> TransportResult<Option<TopicMessage>> {
        let guard = self.socket.lock();
        let socket = guard.as_ref().ok_or(TransportError::NotRunning)?;

        match socket.recv_msg(zmq::DONTWAIT) {
            Ok(first) => self.finish_message(socket, first).map(Some),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => {
                warn!("[ZMQ-SUB] Receive failed on {}: {}", self.config.address, e);
                Err(TransportError::ReceiveFailed(e.to_string()))
            }
        }
    }
}
