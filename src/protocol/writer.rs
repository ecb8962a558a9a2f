//! Outbound message builder.
use bytes::{BufMut, Bytes, BytesMut};

use crate::ext::{BufMutExt, UsizeExt};

const DEFAULT_CAPACITY: usize = 1024;

/// Builds one length-prefixed frontend message at a time.
///
/// A message begins with [`set_tag`][MessageWriter::set_tag], which writes the
/// message-type byte (if any) and reserves the four length bytes. Primitive
/// writes append to the payload, and [`finish`][MessageWriter::finish] patches
/// the length field and takes the frame out, leaving the writer empty for the
/// next message.
///
/// The length field counts every byte after the length field itself,
/// including itself, excluding the message-type byte.
pub struct MessageWriter {
    buf: BytesMut,
    tag: Option<u8>,
}

impl MessageWriter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            tag: None,
        }
    }

    /// Begin a new message. `None` begins the untagged startup message.
    ///
    /// Any partially built message is discarded.
    pub fn set_tag(&mut self, tag: Option<u8>) {
        self.buf.clear();
        self.tag = tag;
        if let Some(tag) = tag {
            self.buf.put_u8(tag);
        }
        // length placeholder, patched by `finish`
        self.buf.put_i32(0);
    }

    /// Grow the backing buffer so at least `len` more bytes fit.
    pub fn ensure_capacity(&mut self, len: usize) {
        let remaining = self.buf.capacity() - self.buf.len();
        if remaining < len {
            // amortized ~1.5x growth
            self.buf.reserve(self.buf.capacity() / 2 + len);
        }
    }

    pub fn add_int16(&mut self, value: i16) {
        self.ensure_capacity(size_of::<i16>());
        self.buf.put_i16(value);
    }

    pub fn add_int32(&mut self, value: i32) {
        self.ensure_capacity(size_of::<i32>());
        self.buf.put_i32(value);
    }

    /// Write a UTF-8 string with nul termination.
    ///
    /// An empty string still writes the bare terminator.
    pub fn add_cstring(&mut self, value: &str) {
        self.ensure_capacity(value.len() + 1);
        self.buf.put_nul_string(value);
    }

    /// Patch the length field and take the finished frame.
    ///
    /// # Panics
    ///
    /// Panics if no message was begun with [`set_tag`][MessageWriter::set_tag].
    pub fn finish(&mut self) -> Bytes {
        let tag_len = self.tag.map_or(0, |_| 1);
        let len = (self.buf.len() - tag_len).to_i32();
        self.buf[tag_len..tag_len + 4].copy_from_slice(&len.to_be_bytes());
        self.tag = None;
        self.buf.split().freeze()
    }

    /// Discard the message being built.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.tag = None;
    }
}

impl Default for MessageWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn declared_len(frame: &[u8], tag_len: usize) -> i32 {
        i32::from_be_bytes(frame[tag_len..tag_len + 4].try_into().unwrap())
    }

    #[test]
    fn tagged_frame_length() {
        let mut w = MessageWriter::new();
        w.set_tag(Some(b'Q'));
        w.add_cstring("SELECT 1");
        let frame = w.finish();

        assert_eq!(frame[0], b'Q');
        // length covers itself plus the payload, not the tag
        assert_eq!(declared_len(&frame, 1) as usize, frame.len() - 1);
        assert_eq!(&frame[5..], b"SELECT 1\0");
    }

    #[test]
    fn untagged_frame_length() {
        let mut w = MessageWriter::new();
        w.set_tag(None);
        w.add_int32(196608);
        w.add_cstring("user");
        let frame = w.finish();

        assert_eq!(declared_len(&frame, 0) as usize, frame.len());
    }

    #[test]
    fn empty_cstring_writes_bare_nul() {
        let mut w = MessageWriter::new();
        w.set_tag(Some(b'p'));
        w.add_cstring("");
        let frame = w.finish();

        assert_eq!(&frame[5..], b"\0");
    }

    #[test]
    fn reusable_after_finish() {
        let mut w = MessageWriter::new();
        w.set_tag(Some(b'Q'));
        w.add_cstring("SELECT 1");
        let first = w.finish();

        w.set_tag(Some(b'Q'));
        w.add_cstring("SELECT 2");
        let second = w.finish();

        assert_eq!(&first[5..], b"SELECT 1\0");
        assert_eq!(&second[5..], b"SELECT 2\0");
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut w = MessageWriter::with_capacity(8);
        w.set_tag(Some(b'Q'));
        let sql = "x".repeat(4096);
        w.add_cstring(&sql);
        let frame = w.finish();

        assert_eq!(declared_len(&frame, 1) as usize, frame.len() - 1);
        assert_eq!(frame.len(), 1 + 4 + sql.len() + 1);
    }

    #[test]
    fn reset_discards_partial_message() {
        let mut w = MessageWriter::new();
        w.set_tag(Some(b'Q'));
        w.add_cstring("SELECT 1");
        w.reset();

        w.set_tag(Some(b'X'));
        let frame = w.finish();
        assert_eq!(&frame[..], &[b'X', 0, 0, 0, 4]);
    }
}
