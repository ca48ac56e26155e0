//! `pgscan` error types.
use std::{backtrace::Backtrace, borrow::Cow, fmt, io};

use crate::{backend::ErrorResponse, row::DecodeError};

/// A specialized [`Result`] type for `pgscan` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from `pgscan` library.
pub struct Error {
    context: Cow<'static, str>,
    backtrace: Backtrace,
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Attach context message, displayed before the error itself.
    pub fn context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        self.context = context.into();
        self
    }

    /// Returns `true` if the error is declared by the server.
    ///
    /// The whole operation may be retried by the caller in this case.
    pub fn is_backend(&self) -> bool {
        matches!(self.kind, ErrorKind::Backend(_))
    }
}

/// All possible error kind from `pgscan` library.
pub enum ErrorKind {
    /// Server reported an error.
    Backend(ErrorResponse),
    /// Row does not match the expected shape.
    Decode(DecodeError),
    /// Server behaved outside the expected handshake.
    Protocol(ProtocolError),
    /// Response source failed or closed.
    Io(io::Error),
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Error {
            fn from($pat: $ty) -> Self {
                let backtrace = std::backtrace::Backtrace::capture();
                Self { context: Cow::Borrowed(""), backtrace, kind: $body }
            }
        }
    };
}

from!(<ErrorKind>e => e);
from!(<ErrorResponse>e => ErrorKind::Backend(e));
from!(<DecodeError>e => ErrorKind::Decode(e));
from!(<ProtocolError>e => ErrorKind::Protocol(e));
from!(<io::Error>e => ErrorKind::Io(e));

impl std::error::Error for Error { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.context.is_empty() {
            write!(f, "{}: ", self.context)?;
        }

        fmt::Display::fmt(&self.kind, f)?;

        if let std::backtrace::BacktraceStatus::Captured = self.backtrace.status() {
            let mut backtrace = self.backtrace.to_string();
            write!(f, "\n\n")?;
            writeln!(f, "Stack backtrace:")?;
            backtrace.truncate(backtrace.trim_end().len());
            write!(f, "{}", backtrace)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ErrorKind { }

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(e) => e.fmt(f),
            Self::Decode(e) => e.fmt(f),
            Self::Protocol(e) => e.fmt(f),
            Self::Io(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// An error when the server does not follow the handshake.
#[derive(Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Required run-time parameter is never reported.
    MissingParameter(&'static str),
    /// Run-time parameter is reported with value that cannot be understood.
    UnexpectedParameter {
        name: &'static str,
        value: String,
    },
}

impl std::error::Error for ProtocolError { }

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameter(name) => write!(f, "missing {name}"),
            Self::UnexpectedParameter { name, value } => {
                write!(f, "unexpected value for {name}: {value:?}")
            },
        }
    }
}

impl fmt::Debug for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
