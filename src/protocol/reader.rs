//! Inbound message framing and cursor reads.
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::ProtocolError;
use crate::error::{Error, ErrorKind};

const HEADER: usize = 5;

/// Reads one length-prefixed backend message at a time.
///
/// [`next_message`][MessageReader::next_message] consumes exactly one frame
/// from the transport. The primitive reads then walk the payload with a
/// cursor; every read validates that enough bytes remain inside the declared
/// frame length and fails with [`ProtocolError::OutOfBounds`] otherwise, so a
/// malformed frame can never bleed into its neighbor.
pub struct MessageReader {
    tag: u8,
    body: Bytes,
    cursor: usize,
}

impl MessageReader {
    pub fn new() -> Self {
        Self {
            tag: 0,
            body: Bytes::new(),
            cursor: 0,
        }
    }

    /// Read the next frame: a 5 byte header, then exactly `length - 4`
    /// payload bytes. Returns the message-type byte.
    ///
    /// A transport that yields no bytes signals
    /// [`ErrorKind::ConnectionClosed`].
    pub async fn next_message<S>(&mut self, io: &mut S) -> Result<u8, Error>
    where
        S: AsyncRead + Unpin,
    {
        let mut header = [0u8; HEADER];
        read_exact(io, &mut header).await?;

        self.tag = header[0];
        let len = i32::from_be_bytes([header[1], header[2], header[3], header[4]]);
        let Some(body_len) = len.checked_sub(4).filter(|l| *l >= 0) else {
            return Err(ProtocolError::InvalidLength(len).into());
        };

        let mut body = vec![0u8; body_len as usize];
        read_exact(io, &mut body).await?;

        self.body = body.into();
        self.cursor = 0;
        Ok(self.tag)
    }

    /// Message-type byte of the current frame.
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Bytes left before the declared end of the current frame.
    pub fn remaining(&self) -> usize {
        self.body.len() - self.cursor
    }

    fn require(&self, width: usize) -> Result<(), ProtocolError> {
        let remaining = self.remaining();
        if width > remaining {
            return Err(ProtocolError::OutOfBounds { requested: width, remaining });
        }
        Ok(())
    }

    pub fn read_byte(&mut self) -> Result<u8, ProtocolError> {
        self.require(1)?;
        let byte = self.body[self.cursor];
        self.cursor += 1;
        Ok(byte)
    }

    /// Read one byte as a character. A nul byte maps to `None`.
    pub fn read_char(&mut self) -> Result<Option<char>, ProtocolError> {
        Ok(match self.read_byte()? {
            0 => None,
            byte => Some(byte as char),
        })
    }

    pub fn read_int16(&mut self) -> Result<i16, ProtocolError> {
        self.require(size_of::<i16>())?;
        let value = i16::from_be_bytes([self.body[self.cursor], self.body[self.cursor + 1]]);
        self.cursor += size_of::<i16>();
        Ok(value)
    }

    pub fn read_int32(&mut self) -> Result<i32, ProtocolError> {
        self.require(size_of::<i32>())?;
        let value = i32::from_be_bytes([
            self.body[self.cursor],
            self.body[self.cursor + 1],
            self.body[self.cursor + 2],
            self.body[self.cursor + 3],
        ]);
        self.cursor += size_of::<i32>();
        Ok(value)
    }

    /// Read text up to the next nul terminator, leaving the cursor just past
    /// the nul.
    pub fn read_cstring(&mut self) -> Result<String, ProtocolError> {
        let rest = &self.body[self.cursor..];
        let Some(end) = rest.iter().position(|b| *b == 0) else {
            return Err(ProtocolError::MissingNul);
        };
        let text = std::str::from_utf8(&rest[..end]).map_err(ProtocolError::NonUtf8)?;
        let text = text.to_owned();
        self.cursor += end + 1;
        Ok(text)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, ProtocolError> {
        self.require(len)?;
        let bytes = self.body.slice(self.cursor..self.cursor + len);
        self.cursor += len;
        Ok(bytes)
    }

    pub fn read_string(&mut self, len: usize) -> Result<String, ProtocolError> {
        self.require(len)?;
        let text = std::str::from_utf8(&self.body[self.cursor..self.cursor + len])
            .map_err(ProtocolError::NonUtf8)?;
        let text = text.to_owned();
        self.cursor += len;
        Ok(text)
    }

    /// Take everything left in the current frame.
    pub fn read_remaining(&mut self) -> Bytes {
        let bytes = self.body.slice(self.cursor..);
        self.cursor = self.body.len();
        bytes
    }

    #[cfg(test)]
    pub(crate) fn load(tag: u8, body: impl Into<Bytes>) -> Self {
        Self {
            tag,
            body: body.into(),
            cursor: 0,
        }
    }
}

impl Default for MessageReader {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_exact<S>(io: &mut S, buf: &mut [u8]) -> Result<(), Error>
where
    S: AsyncRead + Unpin,
{
    if let Err(err) = io.read_exact(buf).await {
        return Err(match err.kind() {
            std::io::ErrorKind::UnexpectedEof => ErrorKind::ConnectionClosed.into(),
            _ => err.into(),
        });
    }
    Ok(())
}
