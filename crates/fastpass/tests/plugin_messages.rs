//! Messages backends send back on our channels.

mod common;

use common::{FakeVerifier, Harness};
use fastpass::prelude::*;
use fastpass::protocol::{ChangePremiumMessage, ChannelMessage, ProtocolError, SuccessMessage};
use uuid::Uuid;

fn backend() -> MessageSource {
    MessageSource::Backend("lobby".into())
}

#[test]
fn test_change_premium_from_backend_is_saved() {
    let h = Harness::new(FakeVerifier::default());
    let _fastpass = h.enabled(h.builder());
    let data = ChangePremiumMessage::new("Steve", true).to_bytes().unwrap();

    let verdict = h
        .host
        .message_listener()
        .on_plugin_message(&backend(), "fastpass:switch-mode", &data)
        .unwrap();

    assert_eq!(verdict, MessageVerdict::Accepted);
    assert_eq!(
        *h.storage.premium.lock().unwrap(),
        vec![("Steve".to_string(), true)]
    );
}

#[test]
fn test_success_from_backend_is_saved() {
    let h = Harness::new(FakeVerifier::default());
    let _fastpass = h.enabled(h.builder());
    let uuid = Uuid::from_u128(77);
    let data = SuccessMessage {
        player_name: "Alex".into(),
        verified_uuid: uuid,
        session_token: None,
    }
    .to_bytes()
    .unwrap();

    let verdict = h
        .host
        .message_listener()
        .on_plugin_message(&backend(), "fastpass:success", &data)
        .unwrap();

    assert_eq!(verdict, MessageVerdict::Accepted);
    assert_eq!(
        *h.storage.verified.lock().unwrap(),
        vec![("Alex".to_string(), uuid)]
    );
}

#[test]
fn test_foreign_channel_is_ignored() {
    let h = Harness::new(FakeVerifier::default());
    let _fastpass = h.enabled(h.builder());

    let verdict = h
        .host
        .message_listener()
        .on_plugin_message(&backend(), "bungeecord:main", b"\x00\x07Connect")
        .unwrap();

    assert_eq!(verdict, MessageVerdict::Ignored);
}

#[test]
fn test_player_sent_message_on_our_channel_is_rejected() {
    let h = Harness::new(FakeVerifier::default());
    let _fastpass = h.enabled(h.builder());
    let data = ChangePremiumMessage::new("Victim", false).to_bytes().unwrap();

    let verdict = h
        .host
        .message_listener()
        .on_plugin_message(
            &MessageSource::Player(ConnectionId::new(9)),
            "fastpass:switch-mode",
            &data,
        )
        .unwrap();

    assert_eq!(verdict, MessageVerdict::Rejected);
    assert!(h.storage.premium.lock().unwrap().is_empty());
}

#[test]
fn test_player_sent_message_on_foreign_channel_is_ignored() {
    let h = Harness::new(FakeVerifier::default());
    let _fastpass = h.enabled(h.builder());

    let verdict = h
        .host
        .message_listener()
        .on_plugin_message(
            &MessageSource::Player(ConnectionId::new(9)),
            "minecraft:brand",
            b"vanilla",
        )
        .unwrap();

    assert_eq!(verdict, MessageVerdict::Ignored);
}

#[test]
fn test_malformed_payload_is_protocol_error() {
    let h = Harness::new(FakeVerifier::default());
    let _fastpass = h.enabled(h.builder());

    let result = h.host.message_listener().on_plugin_message(
        &backend(),
        "fastpass:switch-mode",
        &[0x00, 0x05, b'S'],
    );

    assert!(matches!(
        result,
        Err(FastPassError::Protocol(ProtocolError::Truncated { .. }))
    ));
    assert!(h.storage.premium.lock().unwrap().is_empty());
}

#[test]
fn test_unknown_message_in_our_namespace_is_protocol_error() {
    let h = Harness::new(FakeVerifier::default());
    let _fastpass = h.enabled(h.builder());

    let result = h
        .host
        .message_listener()
        .on_plugin_message(&backend(), "fastpass:reload", &[]);

    assert!(matches!(
        result,
        Err(FastPassError::Protocol(ProtocolError::UnknownChannel(_)))
    ));
}
