//! Event tag normalization tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use bililive_core::protocol::cmd;
use bililive_core::protocol::event::{normalize_cmd, parse_event};

#[test]
fn versioned_danmu_collapses_to_base() {
    assert_eq!(normalize_cmd("DANMU_MSG:4:0:2:2:2:0"), cmd::DANMU_MSG);
    assert_eq!(normalize_cmd("DANMU_MSG"), cmd::DANMU_MSG);
}

#[test]
fn any_danmu_prefix_collapses() {
    assert_eq!(normalize_cmd("DANMU_MSG_V2"), cmd::DANMU_MSG);
    assert_eq!(normalize_cmd("DANMU_MSGX"), cmd::DANMU_MSG);
    assert_eq!(normalize_cmd("DANMU"), "DANMU");
    assert_eq!(normalize_cmd("XDANMU_MSG"), "XDANMU_MSG");
}

#[test]
fn other_tags_pass_through() {
    assert_eq!(normalize_cmd("SEND_GIFT"), "SEND_GIFT");
    assert_eq!(normalize_cmd("WELCOME_GUARD"), "WELCOME_GUARD");
    assert_eq!(normalize_cmd(""), "");
}

#[test]
fn parse_keeps_full_document() {
    let ev = parse_event(br#"{"cmd":"DANMU_MSG:4:0:2:2:2:0","info":[[0],"hi",[7,"neo"]]}"#).unwrap();
    assert_eq!(ev.cmd, "DANMU_MSG");
    assert_eq!(ev.payload["info"][1], "hi");
    assert_eq!(ev.payload["cmd"], "DANMU_MSG:4:0:2:2:2:0");
}

#[test]
fn invalid_payloads_are_rejected() {
    for bad in [
        br#"{"cmd":"LIVE""#.as_slice(),
        br#"{"info":[]}"#.as_slice(),
        br#"{"cmd":42}"#.as_slice(),
        b"[]".as_slice(),
    ] {
        let err = parse_event(bad).unwrap_err();
        assert_eq!(err.kind().as_str(), "INVALID_PAYLOAD");
        assert!(!err.is_fatal());
    }
}
