// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-process publish-subscribe over crossbeam channels
//!
//! Behaves like a ZMQ PUB/SUB pair inside one process: every subscriber has its
//! own bounded queue, topic filters are prefix matches, and a full queue drops
//! the message instead of blocking the publisher.

use crate::common::{TopicMessage, TransportError, TransportResult};
use crate::traits::{Publisher, Subscriber, Transport};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// Connects [`InprocPub`] and [`InprocSub`] endpoints.
#[derive(Clone, Default)]
pub struct InprocBroker {
    subscribers: Arc<Mutex<Vec<Sender<TopicMessage>>>>,
}

impl InprocBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publisher(&self) -> InprocPub {
        InprocPub {
            subscribers: Arc::clone(&self.subscribers),
            running: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
        }
    }

    /// A subscriber whose queue holds at most `capacity` messages (0 = unbounded)
    pub fn subscriber(&self, capacity: usize) -> InprocSub {
        let (sender, receiver) = if capacity == 0 {
            channel::unbounded()
        } else {
            channel::bounded(capacity)
        };
        self.subscribers.lock().push(sender);
        InprocSub {
            receiver,
            filters: Vec::new(),
            running: AtomicBool::new(false),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

/// In-process publisher
pub struct InprocPub {
    subscribers: Arc<Mutex<Vec<Sender<TopicMessage>>>>,
    running: AtomicBool,
    dropped: AtomicU64,
}

impl InprocPub {
    /// Messages discarded because a subscriber queue was full
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn send(&self, message: TopicMessage) -> TransportResult<()> {
        if !self.is_running() {
            return Err(TransportError::NotRunning);
        }

        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sender| match sender.try_send(message.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!("[INPROC-PUB] Subscriber queue full, message dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
        Ok(())
    }
}

impl Transport for InprocPub {
    fn start(&mut self) -> TransportResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(TransportError::AlreadyRunning);
        }
        Ok(())
    }

    fn stop(&mut self) -> TransportResult<()> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn transport_type(&self) -> &str {
        "inproc-pub"
    }
}

impl Publisher for InprocPub {
    fn publish(&self, topic: &[u8], data: &[u8]) -> TransportResult<()> {
        self.send(TopicMessage::new(topic, data))
    }

    fn publish_simple(&self, data: &[u8]) -> TransportResult<()> {
        self.send(TopicMessage::untopiced(data))
    }
}

/// In-process subscriber
pub struct InprocSub {
    receiver: Receiver<TopicMessage>,
    filters: Vec<Vec<u8>>,
    running: AtomicBool,
}

impl InprocSub {
    fn accepts(&self, message: &TopicMessage) -> bool {
        self.filters.iter().any(|filter| message.matches(filter))
    }

    fn ensure_running(&self) -> TransportResult<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(TransportError::NotRunning)
        }
    }
}

impl Transport for InprocSub {
    fn start(&mut self) -> TransportResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(TransportError::AlreadyRunning);
        }
        Ok(())
    }

    fn stop(&mut self) -> TransportResult<()> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn transport_type(&self) -> &str {
        "inproc-sub"
    }
}

impl Subscriber for InprocSub {
    fn subscribe(&mut self, topic: &[u8]) -> TransportResult<()> {
        if !self.filters.iter().any(|filter| filter == topic) {
            self.filters.push(topic.to_vec());
        }
        Ok(())
    }

    fn unsubscribe(&mut self, topic: &[u8]) -> TransportResult<()> {
        self.filters.retain(|filter| filter != topic);
        Ok(())
    }

    fn receive(&self) -> TransportResult<TopicMessage> {
        self.ensure_running()?;
        loop {
            let message = self
                .receiver
                .recv()
                .map_err(|_| TransportError::ConnectionClosed)?;
            if self.accepts(&message) {
                return Ok(message);
            }
        }
    }

    fn receive_timeout(&self, timeout_ms: u64) -> TransportResult<TopicMessage> {
        self.ensure_running()?;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            let message = self.receiver.recv_deadline(deadline).map_err(|e| match e {
                RecvTimeoutError::Timeout => TransportError::Timeout,
                RecvTimeoutError::Disconnected => TransportError::ConnectionClosed,
            })?;
            if self.accepts(&message) {
                return Ok(message);
            }
        }
    }

    fn try_receive(&self) -> TransportResult<Option<TopicMessage>> {
        self.ensure_running()?;
        loop {
            match self.receiver.try_recv() {
                Ok(message) if self.accepts(&message) => return Ok(Some(message)),
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(TransportError::ConnectionClosed),
            }
        }
    }
}
