// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Worker state visible outside the worker thread

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time copy of [`WorkerStatus`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkerStatusSnapshot {
    pub enabled: bool,
    pub running: bool,
    /// Receive-to-publish time of the last published frame
    pub last_duration: Option<Duration>,
    /// Pending diagnostic, cleared by the next successful publish
    pub warning_message: Option<String>,
    pub frames_published: u64,
}

/// Written by the worker thread only, read by anyone holding the handle
#[derive(Debug, Default)]
pub struct WorkerStatus {
    enabled: AtomicBool,
    running: AtomicBool,
    last_duration_nanos: AtomicU64,
    frames_published: AtomicU64,
    warning: RwLock<Option<String>>,
}

impl WorkerStatus {
    pub(crate) fn new(enabled: bool) -> Self {
        let status = Self::default();
        status.enabled.store(enabled, Ordering::SeqCst);
        status
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn last_duration(&self) -> Option<Duration> {
        match self.last_duration_nanos.load(Ordering::Relaxed) {
            0 => None,
            nanos => Some(Duration::from_nanos(nanos)),
        }
    }

    pub fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::Relaxed)
    }

    pub fn warning_message(&self) -> Option<String> {
        self.warning.read().clone()
    }

    pub fn snapshot(&self) -> WorkerStatusSnapshot {
        WorkerStatusSnapshot {
            enabled: self.is_enabled(),
            running: self.is_running(),
            last_duration: self.last_duration(),
            warning_message: self.warning_message(),
            frames_published: self.frames_published(),
        }
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn set_warning(&self, message: String) {
        *self.warning.write() = Some(message);
    }

    pub(crate) fn record_publish(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX).max(1);
        self.last_duration_nanos.store(nanos, Ordering::Relaxed);
        self.frames_published.fetch_add(1, Ordering::Relaxed);
        *self.warning.write() = None;
    }
}
