//! Event payload extraction: plain bodies and zlib-compressed batches.
//!
//! A compressed batch inflates to a concatenation of sub-frames, each with
//! its own 16-byte header. Only `total_length` is meaningful inside a batch.

use std::io::Read;

use bytes::Bytes;
use flate2::read::ZlibDecoder;

use crate::error::{BiliLiveError, Result};
use crate::protocol::frame::{decode_header, FrameKind, HEADER_LEN};

/// Upper bound on the inflated size of one batch.
pub const MAX_INFLATED_LEN: usize = 16 * 1024 * 1024;

/// Inflate a zlib-compressed frame body, at most `MAX_INFLATED_LEN` bytes.
pub fn decompress(body: &[u8]) -> Result<Vec<u8>> {
    decompress_limited(body, MAX_INFLATED_LEN)
}

/// Inflate `body`, failing with `Decompression` once the output exceeds `limit`.
pub fn decompress_limited(body: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len().saturating_mul(4).min(limit));
    ZlibDecoder::new(body)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| BiliLiveError::Decompression(e.to_string()))?;
    if out.len() > limit {
        return Err(BiliLiveError::Decompression(format!(
            "inflated batch exceeds {limit} bytes"
        )));
    }
    Ok(out)
}

/// Trim a candidate payload to start at its first `{`.
///
/// Returns `None` when the payload contains no `{` at all.
pub fn json_start(payload: &[u8]) -> Option<&[u8]> {
    let i = payload.iter().position(|b| *b == b'{')?;
    payload.get(i..)
}

/// Walk a buffer of concatenated sub-frames.
pub fn sub_frames(buf: &[u8]) -> SubFrames<'_> {
    SubFrames {
        buf,
        offset: 0,
        done: false,
    }
}

/// Iterator over the JSON payloads of concatenated sub-frames, in order.
///
/// - A sub-frame with an empty or negative body is skipped; the walk still
///   advances by its declared length.
/// - A declared length of zero, a truncated header or a length running past
///   the buffer yields one `MalformedFrame` error and ends the walk.
/// - Payloads without a `{` are dropped silently.
#[derive(Debug)]
pub struct SubFrames<'a> {
    buf: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> SubFrames<'a> {
    fn abort(&mut self, msg: String) -> Option<Result<&'a [u8]>> {
        self.done = true;
        Some(Err(BiliLiveError::MalformedFrame(msg)))
    }
}

impl<'a> Iterator for SubFrames<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done && self.offset < self.buf.len() {
            let buf = self.buf;
            let rest = buf.get(self.offset..)?;

            let header = match decode_header(rest) {
                Ok(h) => h,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let total = header.total_length as usize;
            if total == 0 {
                return self.abort(format!("sub-frame at offset {} declares zero length", self.offset));
            }
            if total > rest.len() {
                return self.abort(format!(
                    "sub-frame at offset {} declares {total} bytes, {} left",
                    self.offset,
                    rest.len()
                ));
            }

            self.offset += total;

            if total <= HEADER_LEN {
                continue;
            }
            let Some(body) = rest.get(HEADER_LEN..total) else {
                continue;
            };
            if let Some(json) = json_start(body) {
                return Some(Ok(json));
            }
        }
        None
    }
}

/// Expand an event frame body into its JSON payload candidates, in order.
///
/// `EventSingle` yields the body itself; `EventBatch` inflates and walks
/// sub-frames. A malformed sub-frame ends the batch but keeps the payloads
/// already extracted. Other kinds yield nothing.
pub fn extract(kind: FrameKind, body: &Bytes) -> Result<Vec<Bytes>> {
    match kind {
        FrameKind::EventSingle => Ok(json_start(body)
            .map(|json| body.slice_ref(json))
            .into_iter()
            .collect()),
        FrameKind::EventBatch => {
            let inflated = Bytes::from(decompress(body)?);
            let mut out = Vec::new();
            for item in sub_frames(&inflated) {
                match item {
                    Ok(json) => out.push(inflated.slice_ref(json)),
                    Err(e) => {
                        tracing::warn!(error = %e, extracted = out.len(), "batch walk aborted");
                        break;
                    }
                }
            }
            Ok(out)
        }
        FrameKind::CountUpdate | FrameKind::Ignored => Ok(Vec::new()),
    }
}
