//! Interpreters for the backend message flow.
//!
//! Every interpreter here follows the same rule: a message that is not interpreted is
//! [`discard`][ResponseSource::discard]ed and the next message is fetched, while an
//! `ErrorResponse` terminates the interpreter with [`ErrorKind::Backend`][crate::ErrorKind].
//! The only exception is [`parameters`], which discard `ErrorResponse` as well.
//!
//! - [`matching`], generic match and skip
//! - [`fold_rows`], [`fetch_all`], streaming rows
//! - [`single_row`], [`optional_row`], at most one row
//! - [`rows_affected`], rows count
//! - [`authentication_result`], [`parameters`], startup handshake
use crate::{
    Result,
    backend::{DataRow, Response, TransactionStatus},
    common::{span, verbose},
    interpret::Interpret,
    row::{DecodeError, RowDecoder},
    source::{ResponseSource, ResponseSourceExt},
};

mod fold;
mod single_row;
mod rows_affected;
mod handshake;

pub use fold::{FoldRows, fold_rows, fetch_all};
pub use single_row::{SingleRow, OptionalRow, single_row, optional_row};
pub use rows_affected::{RowsAffected, rows_affected};
pub use handshake::{
    AuthenticationResult, Parameters, authentication_result, authentication_status,
    parameter_status, parameters,
};

/// Outcome of a [`matching`] classifier.
#[derive(Debug)]
pub enum Matched<T> {
    /// Stop with this result.
    Yield(Result<T>),
    /// Message is not interpreted, give it back.
    Skip(Response),
}

/// Fetch messages until `classify` yield a result.
///
/// Skipped `ErrorResponse` fails with [`ErrorKind::Backend`][crate::ErrorKind], any other
/// skipped message is discarded before the next message is fetched and classified.
pub fn matching<F, T>(classify: F) -> Matching<F>
where
    F: FnMut(Response) -> Matched<T>,
{
    Matching { classify }
}

/// Returned from [`matching`].
#[derive(Debug, Clone)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub struct Matching<F> {
    classify: F,
}

impl<F, T> Interpret for Matching<F>
where
    F: FnMut(Response) -> Matched<T>,
{
    type Output = T;

    async fn interpret<S: ResponseSource>(mut self, mut source: S) -> Result<T> {
        loop {
            let response = source.fetch().await?;
            span!("matching");
            match (self.classify)(response) {
                Matched::Yield(result) => return result,
                Matched::Skip(Response::ErrorResponse(err)) => return Err(err.into()),
                Matched::Skip(response) => skip(&mut source, response),
            }
        }
    }
}

/// Expect `ParseComplete`.
pub fn parse_complete() -> impl Interpret<Output = ()> {
    matching(|response| match response {
        Response::ParseComplete => Matched::Yield(Ok(())),
        response => Matched::Skip(response),
    })
}

/// Expect `BindComplete`.
pub fn bind_complete() -> impl Interpret<Output = ()> {
    matching(|response| match response {
        Response::BindComplete => Matched::Yield(Ok(())),
        response => Matched::Skip(response),
    })
}

/// Expect `CloseComplete`.
pub fn close_complete() -> impl Interpret<Output = ()> {
    matching(|response| match response {
        Response::CloseComplete => Matched::Yield(Ok(())),
        response => Matched::Skip(response),
    })
}

/// Expect `NoData`.
pub fn no_data() -> impl Interpret<Output = ()> {
    matching(|response| match response {
        Response::NoData => Matched::Yield(Ok(())),
        response => Matched::Skip(response),
    })
}

/// Expect `ReadyForQuery`, returns the transaction status.
pub fn ready_for_query() -> impl Interpret<Output = TransactionStatus> {
    matching(|response| match response {
        Response::ReadyForQuery(status) => Matched::Yield(Ok(status)),
        response => Matched::Skip(response),
    })
}

/// Run `interpreter`, then expect `ReadyForQuery`.
///
/// The query cycle after `Sync` is always terminated by `ReadyForQuery`.
pub fn until_ready<I: Interpret>(interpreter: I) -> impl Interpret<Output = I::Output> {
    interpreter.and_then(|value| ready_for_query().map(move |_| value))
}

/// Release message that is not interpreted.
pub(crate) fn skip<S: ResponseSource>(source: &mut S, response: Response) {
    verbose!(response = response.name(), "discard");
    source.discard(response);
}

/// Check the column count before decoding.
pub(crate) fn decode_row<D: RowDecoder>(decoder: &D, row: &DataRow) -> Result<D::Row, DecodeError> {
    let expected = decoder.column_len();
    if row.len() != expected {
        return Err(DecodeError::ColumnCount { expected, found: row.len() });
    }
    decoder.decode(&row.columns, 0)
}
