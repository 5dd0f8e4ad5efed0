// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ZMQ publish-subscribe sockets
//!
//! - [`ZmqSub`]: receives RGBD frames
//! - [`ZmqPub`]: sends voxel buffers
//!
//! Either side can bind or connect, see [`LinkMode`](crate::common::LinkMode).
//!
//! ## Example
//!
//! ```no_run
//! use depthbar_transports::zmq::ZmqSub;
//! use depthbar_transports::traits::{Subscriber, Transport};
//!
//! let mut subscriber = ZmqSub::with_address("tcp://127.0.0.1:5501")?;
//! subscriber.start()?;
//! subscriber.subscribe(b"")?;
//!
//! if let Some(message) = subscriber.try_receive()? {
//!     println!("{} byte frame", message.payload.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod publisher;
pub mod sub;

pub use publisher::ZmqPub;
pub use sub::ZmqSub;

use crate::common::{LinkMode, TransportConfig, TransportError, TransportResult};

/// Bind or connect `socket` according to `config.link`
pub(crate) fn attach(socket: &zmq::Socket, config: &TransportConfig) -> TransportResult<()> {
    match config.link {
        LinkMode::Bind => socket
            .bind(&config.address)
            .map_err(|e| TransportError::BindFailed(format!("{}: {}", config.address, e))),
        LinkMode::Connect => socket
            .connect(&config.address)
            .map_err(|e| TransportError::ConnectFailed(format!("{}: {}", config.address, e))),
    }
}

pub(crate) fn link_verb(link: LinkMode) -> &'static str {
    match link {
        LinkMode::Bind => "Listening on",
        LinkMode::Connect => "Connected to",
    }
}
