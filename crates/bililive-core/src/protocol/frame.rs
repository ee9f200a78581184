//! Binary frame header codec (panic-free).
//!
//! Wire layout, big-endian:
//! `[total_length:u32][header_length:u16][protocol_version:u16][operation:u32][sequence_id:u32][body]`
//!
//! Parsing rules:
//! - Never index (`buf[0]`); use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{BiliLiveError, Result};

/// Fixed header size in bytes.
pub const HEADER_LEN: usize = 16;

/// Body is plain JSON.
pub const VERSION_PLAIN: u16 = 0;
/// Outgoing client frames.
pub const VERSION_CLIENT: u16 = 1;
/// Body is a zlib-compressed batch of sub-frames.
pub const VERSION_ZLIB: u16 = 2;

/// Operation codes used on the wire.
pub mod op {
    /// Client keepalive.
    pub const HEARTBEAT: u32 = 2;
    /// Server keepalive reply carrying the online count.
    pub const HEARTBEAT_REPLY: u32 = 3;
    /// Server event payload.
    pub const EVENT: u32 = 5;
    /// Client join request.
    pub const JOIN: u32 = 7;
    /// Server join acknowledgement.
    pub const JOIN_REPLY: u32 = 8;
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Header plus body byte count.
    pub total_length: u32,
    /// Always 16 on the wire.
    pub header_length: u16,
    /// 0 = plain JSON, 2 = zlib batch.
    pub protocol_version: u16,
    pub operation: u32,
    pub sequence_id: u32,
}

/// Payload classification derived from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Body starts with a big-endian u32 online count.
    CountUpdate,
    /// Body is a zlib-compressed batch of sub-frames.
    EventBatch,
    /// Body is a single JSON event.
    EventSingle,
    /// Reserved or unknown operation; skipped without error.
    Ignored,
}

impl FrameKind {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::CountUpdate => "count_update",
            FrameKind::EventBatch => "event_batch",
            FrameKind::EventSingle => "event_single",
            FrameKind::Ignored => "ignored",
        }
    }
}

/// Parsed frame (header plus zero-copy body).
#[derive(Debug, Clone)]
pub struct Frame {
    pub header: FrameHeader,
    /// Exactly `total_length - 16` bytes.
    pub body: Bytes,
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        classify(&self.header)
    }
}

/// Classify a header by `operation - 1`.
///
/// Total over every operation value: 0..=2 are count updates, 3..=4 are
/// events (compressed when the version is 2), everything else is ignored.
pub fn classify(header: &FrameHeader) -> FrameKind {
    match header.operation.wrapping_sub(1) {
        0..=2 => FrameKind::CountUpdate,
        3..=4 if header.protocol_version == VERSION_ZLIB => FrameKind::EventBatch,
        3..=4 => FrameKind::EventSingle,
        _ => FrameKind::Ignored,
    }
}

/// Encode a frame: header with `total_length = 16 + body.len()`, then the body.
pub fn encode_frame(protocol_version: u16, operation: u32, sequence_id: u32, body: &[u8]) -> Bytes {
    let total = HEADER_LEN + body.len();
    let mut out = BytesMut::with_capacity(total);
    out.put_u32(total as u32);
    out.put_u16(HEADER_LEN as u16);
    out.put_u16(protocol_version);
    out.put_u32(operation);
    out.put_u32(sequence_id);
    out.put_slice(body);
    out.freeze()
}

/// Read the five header fields from the first 16 bytes.
pub fn decode_header(mut buf: &[u8]) -> Result<FrameHeader> {
    if buf.remaining() < HEADER_LEN {
        return Err(BiliLiveError::MalformedFrame(format!(
            "header needs {HEADER_LEN} bytes, got {}",
            buf.remaining()
        )));
    }

    Ok(FrameHeader {
        total_length: buf.get_u32(),
        header_length: buf.get_u16(),
        protocol_version: buf.get_u16(),
        operation: buf.get_u32(),
        sequence_id: buf.get_u32(),
    })
}

/// Decode a whole frame from one transport message.
///
/// Fails with `MalformedFrame` when the declared length is below the header
/// size or exceeds the bytes actually received. Trailing bytes past
/// `total_length` are discarded.
pub fn decode_frame(mut buf: Bytes) -> Result<Frame> {
    let header = decode_header(&buf)?;

    let total = header.total_length as usize;
    if total < HEADER_LEN {
        return Err(BiliLiveError::MalformedFrame(format!(
            "total_length {total} below header size"
        )));
    }
    if total > buf.remaining() {
        return Err(BiliLiveError::MalformedFrame(format!(
            "total_length {total} exceeds received {} bytes",
            buf.remaining()
        )));
    }

    buf.truncate(total);
    buf.advance(HEADER_LEN);

    Ok(Frame { header, body: buf })
}

/// Online count carried by a `CountUpdate` frame (first 4 body bytes).
pub fn online_count(frame: &Frame) -> Result<u32> {
    let mut body = frame.body.as_ref();
    if body.remaining() < 4 {
        return Err(BiliLiveError::MalformedFrame(format!(
            "count update body needs 4 bytes, got {}",
            body.remaining()
        )));
    }
    Ok(body.get_u32())
}
