#![allow(clippy::unwrap_used)]

use bililive_client::obs::ClientMetrics;

#[test]
fn render_exposes_labelled_series() {
    let m = ClientMetrics::default();
    m.frames_received.inc(&[("kind", "event_batch")]);
    m.frames_received.add(&[("kind", "event_batch")], 2);
    m.decode_errors.inc(&[("kind", "MALFORMED_FRAME")]);
    m.online.set(&[("room", "22603245")], 1200);

    assert_eq!(m.frames_received.get(&[("kind", "event_batch")]), 3);
    assert_eq!(m.frames_received.get(&[("kind", "count_update")]), 0);
    assert_eq!(m.online.get(&[("room", "22603245")]), 1200);

    let text = m.render();
    assert!(text.contains("# TYPE bililive_frames_received_total counter"));
    assert!(text.contains("bililive_frames_received_total{kind=\"event_batch\"} 3"));
    assert!(text.contains("bililive_decode_errors_total{kind=\"MALFORMED_FRAME\"} 1"));
    assert!(text.contains("bililive_online{room=\"22603245\"} 1200"));
}

#[test]
fn label_order_does_not_matter() {
    let m = ClientMetrics::default();
    m.events_dispatched.inc(&[("cmd", "LIVE"), ("room", "1")]);
    m.events_dispatched.inc(&[("room", "1"), ("cmd", "LIVE")]);
    assert_eq!(m.events_dispatched.get(&[("cmd", "LIVE"), ("room", "1")]), 2);
}
