// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for ZMQ publisher-subscriber pairs

#![cfg(feature = "zmq")]

use depthbar_transports::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn receive_within(subscriber: &ZmqSub, timeout: Duration) -> Option<TopicMessage> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(message) = subscriber.try_receive().unwrap() {
            return Some(message);
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}

/// Publisher binds, subscriber connects
#[test]
fn test_pub_bind_sub_connect() {
    let barrier = Arc::new(Barrier::new(2));
    let barrier_pub = Arc::clone(&barrier);
    let barrier_sub = Arc::clone(&barrier);

    let publisher_handle = thread::spawn(move || {
        let config = TransportConfig::new("tcp://127.0.0.1:31101").with_link(LinkMode::Bind);
        let mut publisher = ZmqPub::new(Arc::new(zmq::Context::new()), config).unwrap();
        publisher.start().unwrap();

        barrier_pub.wait();
        // Subscriptions propagate asynchronously
        thread::sleep(Duration::from_millis(200));

        for i in 0..5u8 {
            publisher.publish_simple(&[i; 12]).unwrap();
            thread::sleep(Duration::from_millis(10));
        }

        thread::sleep(Duration::from_millis(100));
        publisher.stop().unwrap();
    });

    let subscriber_handle = thread::spawn(move || {
        let mut subscriber = ZmqSub::with_address("tcp://127.0.0.1:31101").unwrap();
        subscriber.start().unwrap();
        subscriber.subscribe(b"").unwrap();

        barrier_sub.wait();

        let mut received = Vec::new();
        while received.len() < 5 {
            match receive_within(&subscriber, Duration::from_secs(5)) {
                Some(message) => received.push(message),
                None => break,
            }
        }

        assert_eq!(received.len(), 5);
        for (i, message) in received.iter().enumerate() {
            assert!(message.topic.is_empty());
            assert_eq!(message.payload, vec![i as u8; 12]);
        }
        subscriber.stop().unwrap();
    });

    publisher_handle.join().unwrap();
    subscriber_handle.join().unwrap();
}

/// Subscriber binds, publisher connects, two-part messages keep their topic
#[test]
fn test_sub_bind_pub_connect_with_topic() {
    let config = TransportConfig::new("tcp://127.0.0.1:31102").with_link(LinkMode::Bind);
    let mut subscriber = ZmqSub::new(Arc::new(zmq::Context::new()), config).unwrap();
    subscriber.start().unwrap();
    subscriber.subscribe(b"rgbd").unwrap();

    let mut publisher = ZmqPub::with_address("tcp://127.0.0.1:31102").unwrap();
    publisher.start().unwrap();
    thread::sleep(Duration::from_millis(200));

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut received = None;
    while received.is_none() && Instant::now() < deadline {
        publisher.publish(b"other", b"ignored").unwrap();
        publisher.publish(b"rgbd", b"frame").unwrap();
        received = receive_within(&subscriber, Duration::from_millis(100));
    }

    let message = received.expect("no message received");
    assert_eq!(message.topic, b"rgbd".to_vec());
    assert_eq!(message.payload, b"frame".to_vec());

    publisher.stop().unwrap();
    subscriber.stop().unwrap();
}

#[test]
fn test_try_receive_returns_none_without_publisher() {
    let mut subscriber = ZmqSub::with_address("tcp://127.0.0.1:31103").unwrap();
    subscriber.start().unwrap();
    subscriber.subscribe(b"").unwrap();

    for _ in 0..3 {
        assert!(subscriber.try_receive().unwrap().is_none());
    }
    subscriber.stop().unwrap();
}

#[test]
fn test_bind_conflict_is_reported() {
    let context = Arc::new(zmq::Context::new());
    let config = TransportConfig::new("tcp://127.0.0.1:31104").with_link(LinkMode::Bind);

    let mut first = ZmqPub::new(Arc::clone(&context), config.clone()).unwrap();
    first.start().unwrap();

    let mut second = ZmqPub::new(context, config).unwrap();
    assert!(matches!(second.start(), Err(TransportError::BindFailed(_))));

    first.stop().unwrap();
}
