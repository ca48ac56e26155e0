use super::{decode_row, skip};
use crate::{
    Result,
    backend::Response,
    common::{span, verbose},
    interpret::Interpret,
    row::{Collect, Fold, RowDecoder},
    source::{ResponseSource, ResponseSourceExt},
};

/// Fold every `DataRow` until `CommandComplete` or `EmptyQueryResponse`.
///
/// Returns the fold output and the rows affected, which is `0` for an empty query.
///
/// On error, the fold state is dropped without [`finish`][Fold::finish].
pub fn fold_rows<D, F>(decoder: D, fold: F) -> FoldRows<D, F>
where
    D: RowDecoder,
    F: Fold<D::Row>,
{
    FoldRows { decoder, fold }
}

/// Collect every `DataRow` into [`Vec`].
pub fn fetch_all<D>(decoder: D) -> impl Interpret<Output = Vec<D::Row>>
where
    D: RowDecoder,
{
    fold_rows(decoder, Collect).map(|(rows, _)| rows)
}

/// Returned from [`fold_rows`].
#[derive(Debug, Clone)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub struct FoldRows<D, F> {
    decoder: D,
    fold: F,
}

impl<D, F> Interpret for FoldRows<D, F>
where
    D: RowDecoder,
    F: Fold<D::Row>,
{
    type Output = (F::Output, u64);

    async fn interpret<S: ResponseSource>(self, mut source: S) -> Result<Self::Output> {
        let FoldRows { decoder, mut fold } = self;
        let mut state = fold.start();

        loop {
            let response = source.fetch().await?;
            span!("fold_rows");
            match response {
                Response::DataRow(row) => {
                    let row = decode_row(&decoder, &row)?;
                    state = fold.step(state, row);
                },
                Response::CommandComplete(cmd) => {
                    verbose!(rows = cmd.rows, "fold complete");
                    return Ok((fold.finish(state), cmd.rows));
                },
                Response::EmptyQueryResponse => return Ok((fold.finish(state), 0)),
                Response::ErrorResponse(err) => return Err(err.into()),
                response => skip(&mut source, response),
            }
        }
    }
}
