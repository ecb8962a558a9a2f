//! Postgres frontend messages.
use bytes::Bytes;

use super::writer::MessageWriter;

/// A tagged message the client can send after startup.
pub trait FrontendMessage {
    /// Message-type byte.
    const TAG: u8;

    /// Write the message payload through `w`.
    fn write_body(&self, w: &mut MessageWriter);
}

/// Encode a tagged frontend message into a finished frame.
pub fn encode<F: FrontendMessage>(message: &F, w: &mut MessageWriter) -> Bytes {
    w.set_tag(Some(F::TAG));
    message.write_body(w);
    w.finish()
}

/// The startup message.
///
/// For historical reasons it has no initial message-type byte, so it does not
/// implement [`FrontendMessage`].
///
/// <https://www.postgresql.org/docs/current/protocol-message-formats.html#PROTOCOL-MESSAGE-FORMATS-STARTUPMESSAGE>
#[derive(Debug)]
pub struct Startup<'a> {
    /// The database user name to connect as. Required; there is no default.
    pub user: &'a str,
    /// The database to connect to.
    pub database: &'a str,
    /// Additional run-time parameters to apply at backend start, e.g.
    /// `client_encoding` or `application_name`.
    pub options: &'a [(String, String)],
}

impl Startup<'_> {
    /// The protocol version number: major 3, minor 0.
    pub const PROTOCOL_VERSION: i32 = 196608;

    pub fn encode(&self, w: &mut MessageWriter) -> Bytes {
        w.set_tag(None);

        w.add_int32(Self::PROTOCOL_VERSION);

        // one or more pairs of parameter name and value strings
        w.add_cstring("user");
        w.add_cstring(self.user);
        w.add_cstring("database");
        w.add_cstring(self.database);
        for (key, value) in self.options {
            w.add_cstring(key);
            w.add_cstring(value);
        }

        // a zero byte is required as a terminator after the last pair
        w.add_cstring("");

        w.finish()
    }
}

/// Identifies the message as a password response.
///
/// Cleartext only; encrypted variants are rejected during the handshake.
#[derive(Debug)]
pub struct PasswordMessage<'a> {
    pub password: &'a str,
}

impl FrontendMessage for PasswordMessage<'_> {
    const TAG: u8 = b'p';

    fn write_body(&self, w: &mut MessageWriter) {
        w.add_cstring(self.password);
    }
}

/// Identifies the message as a simple query.
#[derive(Debug)]
pub struct Query<'a> {
    /// The query string itself.
    pub sql: &'a str,
}

impl FrontendMessage for Query<'_> {
    const TAG: u8 = b'Q';

    fn write_body(&self, w: &mut MessageWriter) {
        w.add_cstring(self.sql);
    }
}

/// Identifies the message as a termination notice before disconnect.
#[derive(Debug)]
pub struct Terminate;

impl FrontendMessage for Terminate {
    const TAG: u8 = b'X';

    fn write_body(&self, _: &mut MessageWriter) {}
}

#[cfg(test)]
mod test {
    use super::*;

    fn split_cstrings(mut body: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(end) = body.iter().position(|b| *b == 0) {
            out.push(String::from_utf8(body[..end].to_vec()).unwrap());
            body = &body[end + 1..];
        }
        out
    }

    #[test]
    fn startup_round_trip() {
        let options = vec![("client_encoding".to_owned(), "UTF8".to_owned())];
        let startup = Startup {
            user: "alice",
            database: "mydb",
            options: &options,
        };

        let mut w = MessageWriter::new();
        let frame = startup.encode(&mut w);

        // untagged: length field first, covering the whole message
        let len = i32::from_be_bytes(frame[..4].try_into().unwrap());
        assert_eq!(len as usize, frame.len());

        let version = i32::from_be_bytes(frame[4..8].try_into().unwrap());
        assert_eq!(version, 196608);

        let pairs = split_cstrings(&frame[8..]);
        assert_eq!(
            pairs,
            ["user", "alice", "database", "mydb", "client_encoding", "UTF8", ""],
        );
    }

    #[test]
    fn query_frame() {
        let mut w = MessageWriter::new();
        let frame = encode(&Query { sql: "SELECT 1" }, &mut w);
        assert_eq!(frame[0], b'Q');
        assert_eq!(&frame[5..], b"SELECT 1\0");
    }

    #[test]
    fn terminate_frame() {
        let mut w = MessageWriter::new();
        let frame = encode(&Terminate, &mut w);
        assert_eq!(&frame[..], &[b'X', 0, 0, 0, 4]);
    }
}
