//! Framed transport over the raw socket.
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::protocol::{
    BackendMessage, FrontendMessage, MessageReader, MessageWriter,
    frontend::Startup,
};

/// One message at a time, in either direction.
///
/// Owns the socket and the reusable reader/writer pair for the life of the
/// connection. Generic over the transport so tests can drive it with an
/// in-memory duplex.
pub(crate) struct Stream<S> {
    io: S,
    reader: MessageReader,
    writer: MessageWriter,
}

impl<S> Stream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(io: S) -> Self {
        Self {
            io,
            reader: MessageReader::new(),
            writer: MessageWriter::new(),
        }
    }

    /// Encode and flush one tagged frontend message.
    pub async fn send<F: FrontendMessage>(&mut self, message: &F) -> Result<()> {
        let frame = crate::protocol::frontend::encode(message, &mut self.writer);
        self.io.write_all(&frame).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Encode and flush the untagged startup message.
    pub async fn send_startup(&mut self, startup: &Startup<'_>) -> Result<()> {
        let frame = startup.encode(&mut self.writer);
        self.io.write_all(&frame).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Read and decode the next backend message.
    ///
    /// `NoticeResponse` is logged and skipped here; it can arrive at any
    /// point and no caller sequences on it. `ErrorResponse` is returned as a
    /// message, the caller decides whether it aborts a handshake or fails a
    /// single query.
    pub async fn recv(&mut self) -> Result<BackendMessage> {
        loop {
            self.reader.next_message(&mut self.io).await?;
            match BackendMessage::decode(&mut self.reader)? {
                BackendMessage::NoticeResponse(notice) => {
                    log::warn!("notice: {notice}");
                }
                message => return Ok(message),
            }
        }
    }

    /// Shut the transport down after a `Terminate`.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.io.shutdown().await?;
        Ok(())
    }
}
