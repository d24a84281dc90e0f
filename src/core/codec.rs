//! Newline-delimited frame codec.
//!
//! One frame is one `\n`-terminated unit of UTF-8 text carrying exactly one
//! encoded message. The decoder yields raw frame payloads (terminator
//! stripped) so the session can answer a payload that fails message-level
//! decoding with a structured `INVALID_FORMAT` error instead of dropping the
//! connection. The encoder writes the canonical payload plus the terminator
//! as one buffered unit, so writes from one sender never interleave partial
//! frames.
//!
//! Zero-length frames are skipped, not surfaced. Lines beyond
//! [`MAX_FRAME_SIZE`] fail with `OversizedFrame`; the bound exists so a peer
//! that never sends a newline cannot grow the buffer without limit.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::protocol::message::Message;

/// Maximum length of a single frame payload (1 MiB).
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Codec for newline-delimited message framing.
#[derive(Debug, Default)]
pub struct MessageCodec {
    /// Offset up to which the buffer has already been scanned for `\n`.
    scanned: usize,
}

impl MessageCodec {
    pub fn new() -> Self {
        Self { scanned: 0 }
    }

    fn take_line(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, ProtocolError> {
        loop {
            match src[self.scanned..].iter().position(|&b| b == b'\n') {
                Some(offset) => {
                    let end = self.scanned + offset;
                    let mut line = src.split_to(end + 1);
                    self.scanned = 0;

                    line.truncate(end); // drop the terminator
                    if line.is_empty() {
                        continue; // zero-length frame: skip, not an error
                    }
                    if line.len() > MAX_FRAME_SIZE {
                        return Err(ProtocolError::OversizedFrame(line.len()));
                    }
                    return Ok(Some(line.freeze()));
                }
                None => {
                    if src.len() > MAX_FRAME_SIZE {
                        return Err(ProtocolError::OversizedFrame(src.len()));
                    }
                    self.scanned = src.len();
                    return Ok(None);
                }
            }
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Bytes;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.take_line(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.take_line(src)? {
            return Ok(Some(frame));
        }
        // Deliver a trailing unterminated line as a final frame.
        if src.is_empty() {
            Ok(None)
        } else {
            let line = src.split_to(src.len());
            self.scanned = 0;
            Ok(Some(line.freeze()))
        }
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, message: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = message.encode()?;
        dst.reserve(payload.len() + 1);
        dst.extend_from_slice(&payload);
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut MessageCodec, src: &mut BytesMut) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(src).unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn splits_frames_on_newlines() {
        let mut codec = MessageCodec::new();
        let mut src = BytesMut::from(&b"{\"type\":\"a\"}\n{\"type\":\"b\"}\n"[..]);
        let frames = decode_all(&mut codec, &mut src);
        assert_eq!(frames, vec![&b"{\"type\":\"a\"}"[..], &b"{\"type\":\"b\"}"[..]]);
    }

    #[test]
    fn buffers_partial_frames_across_reads() {
        let mut codec = MessageCodec::new();
        let mut src = BytesMut::from(&b"{\"type\":"[..]);
        assert!(codec.decode(&mut src).unwrap().is_none());

        src.extend_from_slice(b"\"hello\"}\n");
        let frame = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(&frame[..], b"{\"type\":\"hello\"}");
    }

    #[test]
    fn skips_zero_length_frames() {
        let mut codec = MessageCodec::new();
        let mut src = BytesMut::from(&b"\n\n{\"type\":\"a\"}\n\n"[..]);
        let frames = decode_all(&mut codec, &mut src);
        assert_eq!(frames, vec![&b"{\"type\":\"a\"}"[..]]);
    }

    #[test]
    fn delivers_trailing_line_at_eof() {
        let mut codec = MessageCodec::new();
        let mut src = BytesMut::from(&b"{\"type\":\"a\"}"[..]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        let frame = codec.decode_eof(&mut src).unwrap().unwrap();
        assert_eq!(&frame[..], b"{\"type\":\"a\"}");
        assert!(codec.decode_eof(&mut src).unwrap().is_none());
    }

    #[test]
    fn rejects_oversized_unterminated_lines() {
        let mut codec = MessageCodec::new();
        let mut src = BytesMut::from(vec![b'x'; MAX_FRAME_SIZE + 1].as_slice());
        assert!(matches!(
            codec.decode(&mut src),
            Err(ProtocolError::OversizedFrame(_))
        ));
    }

    #[test]
    fn encode_appends_terminator() {
        let mut codec = MessageCodec::new();
        let mut dst = BytesMut::new();
        codec
            .encode(Message::hello("0.10.0", None), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], b"{\"type\":\"hello\",\"version\":\"0.10.0\"}\n");
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let mut codec = MessageCodec::new();
        let mut buf = BytesMut::new();
        let msg = Message::hello("0.10.0", Some("node-x".to_string()));
        codec.encode(msg.clone(), &mut buf).unwrap();

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(Message::decode(&frame).unwrap(), msg);
    }
}
