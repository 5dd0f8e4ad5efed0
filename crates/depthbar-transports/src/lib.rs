// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # depthbar-transports
//!
//! Publish-subscribe transports used by the depthbar frame worker.
//!
//! ## Implementations
//!
//! - **ZMQ**: [`ZmqSub`](zmq::ZmqSub) receives RGBD frames, [`ZmqPub`](zmq::ZmqPub)
//!   sends voxel buffers. Either side binds or connects.
//! - **In-process**: [`InprocBroker`] hands out publisher and subscriber ends
//!   backed by crossbeam channels. Used by tests and embedded setups.
//!
//! ## Feature Flags
//!
//! - `zmq` (default): ZMQ sockets, links libzmq
//!
//! ## Example: ZMQ Publish-Subscribe
//!
//! ```no_run
//! use depthbar_transports::prelude::*;
//!
//! let mut publisher = ZmqPub::new(
//!     std::sync::Arc::new(zmq::Context::new()),
//!     TransportConfig::new("tcp://127.0.0.1:5520").with_link(LinkMode::Bind),
//! )?;
//! publisher.start()?;
//! publisher.publish_simple(&[0u8; 16])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The frame worker is generic over [`Subscriber`] and [`Publisher`], so the
//! transport can be swapped without touching the rendering code.

pub mod common;
pub mod inproc;
pub mod traits;

#[cfg(feature = "zmq")]
pub mod zmq;

pub use common::{LinkMode, TopicMessage, TransportConfig, TransportError, TransportResult};
pub use inproc::{InprocBroker, InprocPub, InprocSub};
pub use traits::{Publisher, Subscriber, Transport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::common::*;
    pub use crate::inproc::*;
    pub use crate::traits::*;

    #[cfg(feature = "zmq")]
    pub use crate::zmq::*;
}
