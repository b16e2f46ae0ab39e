// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_url_is_redis_on_localhost() {
    let url = BrokerUrl::default();
    assert_eq!(url.as_str(), "redis://localhost:6379/0");
}

#[test]
fn accepts_redis_scheme() {
    let url = BrokerUrl::parse("redis://broker.internal:6380/3").unwrap();
    assert_eq!(url.as_str(), "redis://broker.internal:6380/3");
}

#[test]
fn rejects_non_redis_scheme() {
    let err = BrokerUrl::parse("amqp://localhost:5672").unwrap_err();
    assert!(matches!(err, BusError::UnsupportedScheme { scheme } if scheme == "amqp"));
}

#[test]
fn rejects_url_with_no_scheme_separator() {
    let err = BrokerUrl::parse("not-a-url").unwrap_err();
    assert!(matches!(err, BusError::Malformed(_)));
}
