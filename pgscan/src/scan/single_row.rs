use super::{decode_row, skip};
use crate::{
    Result,
    backend::Response,
    common::span,
    interpret::Interpret,
    row::{DecodeError, RowDecoder},
    source::{ResponseSource, ResponseSourceExt},
};

/// Expect exactly one row.
///
/// The first `DataRow` is decoded, any following `DataRow` is discarded without decoding.
/// Completing without any row is [`DecodeError::NotSingleRow`], an empty query is
/// [`DecodeError::EmptyQuery`].
pub fn single_row<D: RowDecoder>(decoder: D) -> SingleRow<D> {
    SingleRow { decoder }
}

/// Expect at most one row.
///
/// Same as [`single_row`], but completing without any row returns [`None`].
pub fn optional_row<D: RowDecoder>(decoder: D) -> OptionalRow<D> {
    OptionalRow { decoder }
}

/// Returned from [`single_row`].
#[derive(Debug, Clone)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub struct SingleRow<D> {
    decoder: D,
}

/// Returned from [`optional_row`].
#[derive(Debug, Clone)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub struct OptionalRow<D> {
    decoder: D,
}

impl<D: RowDecoder> Interpret for SingleRow<D> {
    type Output = D::Row;

    async fn interpret<S: ResponseSource>(self, source: S) -> Result<D::Row> {
        match first_row(&self.decoder, source).await? {
            Some(row) => Ok(row),
            None => Err(DecodeError::NotSingleRow.into()),
        }
    }
}

impl<D: RowDecoder> Interpret for OptionalRow<D> {
    type Output = Option<D::Row>;

    async fn interpret<S: ResponseSource>(self, source: S) -> Result<Option<D::Row>> {
        first_row(&self.decoder, source).await
    }
}

async fn first_row<D, S>(decoder: &D, mut source: S) -> Result<Option<D::Row>>
where
    D: RowDecoder,
    S: ResponseSource,
{
    let mut output = None;

    loop {
        let response = source.fetch().await?;
        span!("single_row");
        match response {
            Response::DataRow(row) if output.is_none() => {
                output = Some(decode_row(decoder, &row)?);
            },
            Response::CommandComplete(_) => return Ok(output),
            Response::EmptyQueryResponse if output.is_none() => {
                return Err(DecodeError::EmptyQuery.into());
            },
            Response::ErrorResponse(err) => return Err(err.into()),
            response => skip(&mut source, response),
        }
    }
}

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use std::cell::Cell;

    use super::*;
    use crate::{
        ErrorKind,
        backend::{CommandComplete, DataRow, ErrorResponse, NoticeResponse},
        row::{decoder_fn, row_as, try_get},
        source::Replay,
    };

    fn text_row(s: &str) -> Response {
        Response::DataRow(DataRow::new(vec![Some(Bytes::copy_from_slice(s.as_bytes()))]))
    }

    fn complete() -> Response {
        Response::CommandComplete(CommandComplete::new(1))
    }

    #[tokio::test]
    async fn first_row_wins() {
        let decoded = Cell::new(0);
        let decoder = decoder_fn(1, |columns, offset| {
            decoded.set(decoded.get() + 1);
            try_get::<String>(columns, offset)
        });
        let mut source = Replay::new([text_row("a"), text_row("b"), complete()]);
        let row = single_row(&decoder).interpret(&mut source).await.unwrap();
        assert_eq!(row, "a");
        assert_eq!(decoded.get(), 1);
        assert!(matches!(&source.discarded()[..], [Response::DataRow(row)] if row.len() == 1));
    }

    #[tokio::test]
    async fn no_row() {
        let mut source = Replay::new([complete()]);
        let err = single_row(row_as::<(String,)>()).interpret(&mut source).await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Decode(DecodeError::NotSingleRow)));
        assert_eq!(err.to_string().lines().next(), Some("Not a single row"));
    }

    #[tokio::test]
    async fn empty_query() {
        let mut source = Replay::new([Response::EmptyQueryResponse]);
        let err = single_row(row_as::<(String,)>()).interpret(&mut source).await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Decode(DecodeError::EmptyQuery)));
    }

    #[tokio::test]
    async fn wrong_shape() {
        let mut source = Replay::new([text_row("a"), complete()]);
        let err = single_row(row_as::<(String, String)>()).interpret(&mut source).await.unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Decode(DecodeError::ColumnCount { expected: 2, found: 1 })
        ));
        assert_eq!(source.remaining(), 1);
    }

    #[tokio::test]
    async fn error_after_row() {
        let mut source = Replay::new([
            text_row("a"),
            Response::ErrorResponse(ErrorResponse::new("40001", "serialization failure")),
            complete(),
        ]);
        let err = single_row(row_as::<(String,)>()).interpret(&mut source).await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Backend(e) if e.code == "40001"));
    }

    #[tokio::test]
    async fn empty_query_after_row() {
        let mut source = Replay::new([text_row("a"), Response::EmptyQueryResponse, complete()]);
        let (row,) = single_row(row_as::<(String,)>()).interpret(&mut source).await.unwrap();
        assert_eq!(row, "a");
        assert!(matches!(source.discarded(), [Response::EmptyQueryResponse]));
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn skip_notice() {
        let mut source = Replay::new([
            Response::NoticeResponse(NoticeResponse { message: "note".into() }),
            text_row("a"),
            Response::PortalSuspended,
            complete(),
        ]);
        let (row,) = single_row(row_as::<(String,)>()).interpret(&mut source).await.unwrap();
        assert_eq!(row, "a");
        assert_eq!(source.discarded().len(), 2);
    }

    #[tokio::test]
    async fn optional() {
        let mut source = Replay::new([complete()]);
        let row = optional_row(row_as::<(String,)>()).interpret(&mut source).await.unwrap();
        assert!(row.is_none());

        let mut source = Replay::new([text_row("x"), complete()]);
        let row = optional_row(row_as::<(String,)>()).interpret(&mut source).await.unwrap();
        assert_eq!(row, Some(("x".to_owned(),)));
    }
}
