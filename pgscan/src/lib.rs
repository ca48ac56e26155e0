//! Postgres Backend Response Interpreter
//!
//! `pgscan` consumes already decoded backend messages and turns them into query results,
//! authentication decisions, and session parameters.
//!
//! An interpreter is a plain value describing which messages it consumes, it only runs when
//! awaited with a [`ResponseSource`], the effect that fetch and discard messages.
//!
//! # Examples
//!
//! Startup handshake:
//!
//! ```no_run
//! use pgscan::{Interpret, Replay, scan::{self, AuthenticationResult}};
//!
//! # async fn app(mut source: Replay) -> pgscan::Result<()> {
//! match scan::authentication_result().interpret(&mut source).await? {
//!     AuthenticationResult::Ok { integer_datetimes } => assert!(integer_datetimes),
//!     AuthenticationResult::MD5Password { salt: _ } => todo!("send password"),
//!     AuthenticationResult::CleartextPassword => todo!("send password"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Extended query:
//!
//! ```no_run
//! use pgscan::{Interpret, Replay, row_as, scan};
//!
//! # async fn app(mut source: Replay) -> pgscan::Result<()> {
//! let (id, name) = scan::parse_complete()
//!     .and_then(|_| scan::bind_complete())
//!     .and_then(|_| scan::until_ready(scan::single_row(row_as::<(i32, String)>())))
//!     .interpret(&mut source)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod common;
mod ext;

// Protocol
pub mod backend;

// Component
pub mod row;
pub mod source;
pub mod types;

// Operation
pub mod interpret;
pub mod scan;

mod error;

pub use backend::Response;
pub use row::{Decode, DecodeError, Fold, FromRow, RowDecoder, decoder_fn, fold_fn, row_as};
pub use source::{Replay, ResponseSource, ResponseSourceExt};
pub use interpret::{Interpret, pure};
pub use error::{Error, ErrorKind, ProtocolError, Result};

#[cfg(feature = "macros")]
pub use pgscan_macros::{Decode, FromRow};

#[doc(hidden)]
pub use bytes;
