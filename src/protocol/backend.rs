//! Postgres backend messages.
use bytes::Bytes;

use super::error::ProtocolError;
use super::reader::MessageReader;
use crate::dberror::DbError;

/// Map a backend message-type byte to its protocol name.
pub fn message_name(tag: u8) -> &'static str {
    match tag {
        b'R' => "Authentication",
        b'K' => "BackendKeyData",
        b'2' => "BindComplete",
        b'3' => "CloseComplete",
        b'C' => "CommandComplete",
        b'd' => "CopyData",
        b'c' => "CopyDone",
        b'G' => "CopyInResponse",
        b'H' => "CopyOutResponse",
        b'D' => "DataRow",
        b'I' => "EmptyQueryResponse",
        b'E' => "ErrorResponse",
        b'v' => "NegotiateProtocolVersion",
        b'n' => "NoData",
        b'N' => "NoticeResponse",
        b'A' => "NotificationResponse",
        b't' => "ParameterDescription",
        b'S' => "ParameterStatus",
        b'1' => "ParseComplete",
        b's' => "PortalSuspended",
        b'Z' => "ReadyForQuery",
        b'T' => "RowDescription",
        _ => "Unknown",
    }
}

/// A decoded backend message.
///
/// Only the messages the simple query sub-protocol can produce are decoded;
/// any other message-type byte fails with [`ProtocolError::Unexpected`].
#[derive(Debug)]
pub enum BackendMessage {
    Authentication(Authentication),
    BackendKeyData(BackendKeyData),
    CommandComplete(CommandComplete),
    DataRow(DataRow),
    EmptyQueryResponse,
    ErrorResponse(DbError),
    NoticeResponse(DbError),
    ParameterStatus(ParameterStatus),
    ReadyForQuery(ReadyForQuery),
    RowDescription(RowDescription),
}

impl BackendMessage {
    /// The message-type byte this message was decoded from.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Authentication(_) => Authentication::MSGTYPE,
            Self::BackendKeyData(_) => BackendKeyData::MSGTYPE,
            Self::CommandComplete(_) => CommandComplete::MSGTYPE,
            Self::DataRow(_) => DataRow::MSGTYPE,
            Self::EmptyQueryResponse => b'I',
            Self::ErrorResponse(_) => b'E',
            Self::NoticeResponse(_) => b'N',
            Self::ParameterStatus(_) => ParameterStatus::MSGTYPE,
            Self::ReadyForQuery(_) => ReadyForQuery::MSGTYPE,
            Self::RowDescription(_) => RowDescription::MSGTYPE,
        }
    }

    /// Decode the frame currently held by `reader`.
    pub fn decode(reader: &mut MessageReader) -> Result<Self, ProtocolError> {
        Ok(match reader.tag() {
            Authentication::MSGTYPE => Self::Authentication(Authentication::decode(reader)?),
            BackendKeyData::MSGTYPE => Self::BackendKeyData(BackendKeyData::decode(reader)?),
            CommandComplete::MSGTYPE => Self::CommandComplete(CommandComplete::decode(reader)?),
            DataRow::MSGTYPE => Self::DataRow(DataRow::decode(reader)?),
            b'I' => Self::EmptyQueryResponse,
            b'E' => Self::ErrorResponse(DbError::decode(reader)?),
            b'N' => Self::NoticeResponse(DbError::decode(reader)?),
            ParameterStatus::MSGTYPE => Self::ParameterStatus(ParameterStatus::decode(reader)?),
            ReadyForQuery::MSGTYPE => Self::ReadyForQuery(ReadyForQuery::decode(reader)?),
            RowDescription::MSGTYPE => Self::RowDescription(RowDescription::decode(reader)?),
            found => return Err(ProtocolError::unknown(found)),
        })
    }
}

/// An authentication request.
///
/// Only `AuthenticationOk` and `AuthenticationCleartextPassword` are
/// supported; the remaining variants carry their request code so the caller
/// can report what the server asked for.
#[derive(Debug, PartialEq, Eq)]
pub enum Authentication {
    /// The authentication exchange is successfully completed.
    Ok,
    /// The frontend must now send a cleartext password.
    CleartextPassword,
    /// Any other authentication request, by code: 5 is md5, 10 is SASL.
    Unsupported(i32),
}

impl Authentication {
    pub const MSGTYPE: u8 = b'R';

    fn decode(reader: &mut MessageReader) -> Result<Self, ProtocolError> {
        Ok(match reader.read_int32()? {
            0 => Self::Ok,
            3 => Self::CleartextPassword,
            code => Self::Unsupported(code),
        })
    }
}

/// Cancellation key data.
///
/// The frontend must save these values if it wishes to be able to issue
/// `CancelRequest` messages later.
#[derive(Debug)]
pub struct BackendKeyData {
    /// The process ID of this backend.
    pub process_id: i32,
    /// The secret key of this backend.
    pub secret_key: i32,
}

impl BackendKeyData {
    pub const MSGTYPE: u8 = b'K';

    fn decode(reader: &mut MessageReader) -> Result<Self, ProtocolError> {
        Ok(Self {
            process_id: reader.read_int32()?,
            secret_key: reader.read_int32()?,
        })
    }
}

/// A command completed normally.
#[derive(Debug)]
pub struct CommandComplete {
    /// The command tag, e.g. `SELECT 2` or `INSERT 0 1`.
    pub tag: String,
}

impl CommandComplete {
    pub const MSGTYPE: u8 = b'C';

    fn decode(reader: &mut MessageReader) -> Result<Self, ProtocolError> {
        Ok(Self { tag: reader.read_cstring()? })
    }
}

/// One row of a query result.
///
/// Columns stay as raw text-format bytes here; decoding into typed values
/// needs the active `RowDescription` and happens upstream.
#[derive(Debug)]
pub struct DataRow {
    /// One entry per column, `None` for SQL NULL.
    pub columns: Vec<Option<Bytes>>,
}

impl DataRow {
    pub const MSGTYPE: u8 = b'D';

    fn decode(reader: &mut MessageReader) -> Result<Self, ProtocolError> {
        let count = reader.read_int16()?;
        let mut columns = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            // -1 indicates NULL, no value bytes follow
            columns.push(match reader.read_int32()? {
                -1 => None,
                len if len < 0 => return Err(ProtocolError::InvalidLength(len)),
                len => Some(reader.read_bytes(len as usize)?),
            });
        }
        Ok(Self { columns })
    }
}

/// A run-time parameter report.
///
/// Sent at backend start for every parameter the frontend should know about,
/// and again whenever one of them changes.
#[derive(Debug)]
pub struct ParameterStatus {
    pub name: String,
    pub value: String,
}

impl ParameterStatus {
    pub const MSGTYPE: u8 = b'S';

    fn decode(reader: &mut MessageReader) -> Result<Self, ProtocolError> {
        Ok(Self {
            name: reader.read_cstring()?,
            value: reader.read_cstring()?,
        })
    }
}

/// The backend is ready for a new query cycle.
#[derive(Debug)]
pub struct ReadyForQuery {
    /// Transaction status indicator: `I` idle, `T` in a transaction block,
    /// `E` in a failed transaction block.
    pub status: u8,
}

impl ReadyForQuery {
    pub const MSGTYPE: u8 = b'Z';

    fn decode(reader: &mut MessageReader) -> Result<Self, ProtocolError> {
        Ok(Self { status: reader.read_byte()? })
    }
}

/// Describes one field of an incoming row set.
#[derive(Debug)]
pub struct FieldDescription {
    /// The field name.
    pub name: String,
    /// If the field can be identified as a column of a specific table, the
    /// object ID of the table; otherwise zero.
    pub table_oid: i32,
    /// The attribute number of the column, or zero.
    pub column_id: i16,
    /// The object ID of the field's data type.
    pub type_oid: u32,
    /// The data type size. Negative values denote variable-width types.
    pub type_size: i16,
    /// The type modifier.
    pub type_modifier: i32,
    /// The format code: 0 for text, 1 for binary.
    pub format_code: i16,
}

/// Describes the rows that will follow in response to a query.
#[derive(Debug)]
pub struct RowDescription {
    pub fields: Vec<FieldDescription>,
}

impl RowDescription {
    pub const MSGTYPE: u8 = b'T';

    fn decode(reader: &mut MessageReader) -> Result<Self, ProtocolError> {
        let count = reader.read_int16()?;
        let mut fields = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            fields.push(FieldDescription {
                name: reader.read_cstring()?,
                table_oid: reader.read_int32()?,
                column_id: reader.read_int16()?,
                type_oid: reader.read_int32()? as u32,
                type_size: reader.read_int16()?,
                type_modifier: reader.read_int32()?,
                format_code: reader.read_int16()?,
            });
        }
        Ok(Self { fields })
    }
}
