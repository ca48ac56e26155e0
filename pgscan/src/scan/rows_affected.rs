use super::skip;
use crate::{
    Result,
    backend::Response,
    common::span,
    interpret::Interpret,
    source::{ResponseSource, ResponseSourceExt},
};

/// Returns rows affected from `CommandComplete`.
///
/// `DataRow` is discarded without decoding, an empty query affects `0` rows.
pub fn rows_affected() -> RowsAffected {
    RowsAffected { _priv: () }
}

/// Returned from [`rows_affected`].
#[derive(Debug, Clone, Copy)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub struct RowsAffected {
    _priv: (),
}

impl Interpret for RowsAffected {
    type Output = u64;

    async fn interpret<S: ResponseSource>(self, mut source: S) -> Result<u64> {
        loop {
            let response = source.fetch().await?;
            span!("rows_affected");
            match response {
                Response::CommandComplete(cmd) => return Ok(cmd.rows),
                Response::EmptyQueryResponse => return Ok(0),
                Response::ErrorResponse(err) => return Err(err.into()),
                response => skip(&mut source, response),
            }
        }
    }
}
