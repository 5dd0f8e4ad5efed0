// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Message envelope shared by the subscriber implementations

/// A received publish-subscribe message.
///
/// `topic` is the envelope part. Single-part messages carry an empty topic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicMessage {
    pub topic: Vec<u8>,
    pub payload: Vec<u8>,
}

impl TopicMessage {
    pub fn new(topic: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Message without an envelope part
    pub fn untopiced(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(Vec::new(), payload)
    }

    /// Payload size in bytes
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// ZMQ style prefix matching: the empty filter matches everything
    pub fn matches(&self, filter: &[u8]) -> bool {
        self.topic.starts_with(filter)
    }
}

impl From<(Vec<u8>, Vec<u8>)> for TopicMessage {
    fn from((topic, payload): (Vec<u8>, Vec<u8>)) -> Self {
        Self { topic, payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matching() {
        let message = TopicMessage::new(b"rgbd/front".to_vec(), vec![1, 2, 3]);
        assert!(message.matches(b""));
        assert!(message.matches(b"rgbd"));
        assert!(!message.matches(b"voxels"));
        assert_eq!(message.size(), 3);
        assert!(TopicMessage::untopiced(vec![0]).matches(b""));
    }
}
