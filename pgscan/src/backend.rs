//! Postgres Backend Messages
//!
//! Messages here are already framed and decoded by the transport, only the
//! parts relevant for interpretation are kept.
//!
//! Docs here mostly quoted from the official postgres documentation.
//!
//! <https://www.postgresql.org/docs/current/protocol-message-formats.html>
use bytes::Bytes;
use std::fmt;

use crate::ext::FmtExt;

/// Postgres backend messages
#[derive(Debug)]
pub enum Response {
    Authentication(AuthenticationStatus),
    BackendKeyData(BackendKeyData),
    BindComplete,
    CloseComplete,
    CommandComplete(CommandComplete),
    DataRow(DataRow),
    ErrorResponse(ErrorResponse),
    EmptyQueryResponse,
    NoData,
    NoticeResponse(NoticeResponse),
    ParameterStatus(ParameterStatus),
    ParseComplete,
    PortalSuspended,
    ReadyForQuery(TransactionStatus),
    /// Any other message, which is never interpreted.
    Other {
        msgtype: u8,
    },
}

macro_rules! match_backend {
    ($($name:ident $(($f:tt))? = $ty:literal,)*) => {
        impl Response {
            /// Returns the message type byte.
            pub fn msgtype(&self) -> u8 {
                match self {
                    $(Self::$name $(($f))? => $ty,)*
                    Self::Other { msgtype } => *msgtype,
                }
            }

            /// Get message name from message type.
            ///
            /// Returns `"Unknown"` for unknown message type.
            pub fn message_name(msgtype: u8) -> &'static str {
                match msgtype {
                    $($ty => stringify!($name),)*
                    _ => "Unknown",
                }
            }

            /// Returns the name of this message.
            ///
            /// Returns `"Unknown"` for [`Response::Other`].
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$name $(($f))? => stringify!($name),)*
                    Self::Other { .. } => "Unknown",
                }
            }
        }
    };
}

match_backend! {
    Authentication(_) = b'R',
    BackendKeyData(_) = b'K',
    BindComplete = b'2',
    CloseComplete = b'3',
    CommandComplete(_) = b'C',
    DataRow(_) = b'D',
    ErrorResponse(_) = b'E',
    EmptyQueryResponse = b'I',
    NoData = b'n',
    NoticeResponse(_) = b'N',
    ParameterStatus(_) = b'S',
    ParseComplete = b'1',
    PortalSuspended = b's',
    ReadyForQuery(_) = b'Z',
}

/// Identifies the message as an authentication request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationStatus {
    /// Specifies that the authentication was successful.
    Ok,
    /// Specifies that a clear-text password is required.
    CleartextPassword,
    /// Specifies that an MD5-encrypted password is required.
    MD5Password {
        /// The salt to use when encrypting the password.
        salt: [u8;4],
    },
}

/// Identifies the message as cancellation key data.
#[derive(Debug, Clone, Copy)]
pub struct BackendKeyData {
    /// The process ID of this backend.
    pub process_id: u32,
    /// The secret key of this backend.
    pub secret_key: u32,
}

/// Identifies the message as a run-time parameter status report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterStatus {
    /// The name of the run-time parameter being reported
    pub name: String,
    /// The current value of the parameter
    pub value: String,
}

impl ParameterStatus {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Current backend transaction status indicator, reported by `ReadyForQuery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// `I`, not in a transaction block.
    Idle,
    /// `T`, in a transaction block.
    Transaction,
    /// `E`, in a failed transaction block.
    Failed,
}

impl TransactionStatus {
    /// Returns [`None`] for unknown indicator.
    pub const fn from_indicator(indicator: u8) -> Option<Self> {
        match indicator {
            b'I' => Some(Self::Idle),
            b'T' => Some(Self::Transaction),
            b'E' => Some(Self::Failed),
            _ => None,
        }
    }

    pub const fn indicator(self) -> u8 {
        match self {
            Self::Idle => b'I',
            Self::Transaction => b'T',
            Self::Failed => b'E',
        }
    }
}

/// Identifies the message as an error.
///
/// Only the `SQLSTATE` code and the primary human-readable message are kept.
#[derive(Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// The `SQLSTATE` code for the error.
    pub code: String,
    /// The primary human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

impl std::error::Error for ErrorResponse { }

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "database error [{}]: {}", self.code, self.message)
    }
}

impl fmt::Debug for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// A warning message. The frontend should display the message.
#[derive(Debug, Clone)]
pub struct NoticeResponse {
    pub message: String,
}

/// Identifies the message as a data row.
///
/// Each column is the raw value in binary format, `None` is `NULL`.
#[derive(Clone, Default)]
pub struct DataRow {
    pub columns: Vec<Option<Bytes>>,
}

impl DataRow {
    pub fn new(columns: Vec<Option<Bytes>>) -> Self {
        Self { columns }
    }

    /// The number of column values (possibly zero).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl fmt::Debug for DataRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_list();
        for column in &self.columns {
            match column {
                Some(value) => dbg.entry(&value.lossy()),
                None => dbg.entry(&format_args!("NULL")),
            };
        }
        dbg.finish()
    }
}

/// Identifies the message as a command-completed response
///
/// For an INSERT command, the tag is INSERT oid rows, where rows is the number of rows inserted.
/// oid used to be the object ID of the inserted row if rows was 1 and the target table had OIDs,
/// but OIDs system columns are not supported anymore; therefore oid is always 0.
///
/// For a DELETE command, the tag is DELETE rows where rows is the number of rows deleted.
///
/// For an UPDATE command, the tag is UPDATE rows where rows is the number of rows updated.
///
/// For a MERGE command, the tag is MERGE rows where rows is the number of rows inserted, updated, or deleted.
///
/// For a SELECT or CREATE TABLE AS command, the tag is SELECT rows where rows is the number of rows retrieved.
///
/// For a MOVE command, the tag is MOVE rows where rows is the number of rows
/// the cursor's position has been changed by.
///
/// For a FETCH command, the tag is FETCH rows where rows is the number of rows that have
/// been retrieved from the cursor.
///
/// For a COPY command, the tag is COPY rows where rows is the number of rows copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandComplete {
    /// Number of rows affected by the command.
    pub rows: u64,
}

impl CommandComplete {
    pub const fn new(rows: u64) -> Self {
        Self { rows }
    }

    /// Decode the rows affected from command tag.
    ///
    /// Commands without row count, or malformed count, results in `0`.
    pub fn from_tag(tag: &str) -> Self {
        let mut whs = tag.split_whitespace();
        let (Some(tag), Some(rows)) = (whs.next(), whs.next()) else {
            return Self::new(0);
        };
        let rows = match tag {
            "INSERT" => whs.next().unwrap_or_default(),
            "SELECT" | "UPDATE" | "DELETE" | "MERGE" | "FETCH" | "MOVE" | "COPY" => rows,
            _ => return Self::new(0),
        };
        Self::new(rows.parse().unwrap_or_default())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn command_tag() {
        assert_eq!(CommandComplete::from_tag("INSERT 0 3").rows, 3);
        assert_eq!(CommandComplete::from_tag("SELECT 14").rows, 14);
        assert_eq!(CommandComplete::from_tag("DELETE 2").rows, 2);
        assert_eq!(CommandComplete::from_tag("CREATE TABLE").rows, 0);
        assert_eq!(CommandComplete::from_tag("BEGIN").rows, 0);
        assert_eq!(CommandComplete::from_tag("UPDATE nope").rows, 0);
        assert_eq!(CommandComplete::from_tag("INSERT 0").rows, 0);
    }

    #[test]
    fn message_name() {
        let dr = Response::DataRow(DataRow::default());
        assert_eq!(dr.msgtype(), b'D');
        assert_eq!(dr.name(), "DataRow");
        assert_eq!(Response::EmptyQueryResponse.name(), "EmptyQueryResponse");
        assert_eq!(Response::Other { msgtype: b'W' }.name(), "Unknown");
        assert_eq!(Response::Other { msgtype: b'D' }.name(), "Unknown");
        assert_eq!(Response::Other { msgtype: b'D' }.msgtype(), b'D');
    }

    #[test]
    fn transaction_indicator() {
        assert_eq!(TransactionStatus::from_indicator(b'T'), Some(TransactionStatus::Transaction));
        assert_eq!(TransactionStatus::from_indicator(b'x'), None);
        assert_eq!(TransactionStatus::Failed.indicator(), b'E');
    }
}
