use bytes::Bytes;
use std::cell::{Cell, RefCell};

use pgscan::{
    DecodeError, ErrorKind, Interpret, ProtocolError, Replay, Response, decoder_fn, fold_fn,
    row::try_get,
    row_as,
    backend::{
        AuthenticationStatus, CommandComplete, DataRow, ErrorResponse, NoticeResponse,
        ParameterStatus, TransactionStatus,
    },
    scan::{self, AuthenticationResult},
};

fn row(values: &[i32]) -> Response {
    Response::DataRow(DataRow::new(
        values
            .iter()
            .map(|n| Some(Bytes::copy_from_slice(&n.to_be_bytes())))
            .collect(),
    ))
}

fn complete(rows: u64) -> Response {
    Response::CommandComplete(CommandComplete::new(rows))
}

fn server_error() -> Response {
    Response::ErrorResponse(ErrorResponse::new("57014", "canceling statement due to user request"))
}

fn notice() -> Response {
    Response::NoticeResponse(NoticeResponse { message: "identifier will be truncated".into() })
}

fn assert_backend(err: pgscan::Error) {
    let ErrorKind::Backend(db) = err.kind() else {
        panic!("expected backend error, found: {err}");
    };
    assert_eq!(db.code, "57014");
    assert_eq!(db.message, "canceling statement due to user request");
}

#[tokio::test]
async fn short_circuit_every_interpreter() {
    let responses = || [notice(), server_error(), row(&[1]), complete(1)];

    let mut source = Replay::new(responses());
    assert_backend(scan::fold_rows(row_as::<(i32,)>(), pgscan::row::Collect).interpret(&mut source).await.unwrap_err());
    assert_eq!(source.remaining(), 2);

    let mut source = Replay::new(responses());
    assert_backend(scan::single_row(row_as::<(i32,)>()).interpret(&mut source).await.unwrap_err());
    assert_eq!(source.remaining(), 2);

    let mut source = Replay::new(responses());
    assert_backend(scan::rows_affected().interpret(&mut source).await.unwrap_err());
    assert_eq!(source.remaining(), 2);

    let mut source = Replay::new(responses());
    assert_backend(scan::authentication_result().interpret(&mut source).await.unwrap_err());
    assert_eq!(source.remaining(), 2);

    let mut source = Replay::new(responses());
    assert_backend(scan::ready_for_query().interpret(&mut source).await.unwrap_err());
    assert_eq!(source.fetched(), 2);
}

#[tokio::test]
async fn arity_mismatch_never_decode() {
    let called = Cell::new(false);
    let decoder = decoder_fn(1, |columns, offset| {
        called.set(true);
        try_get::<i32>(columns, offset)
    });

    let mut source = Replay::new([row(&[1, 2]), complete(1)]);
    let err = scan::fetch_all(&decoder).interpret(&mut source).await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Decode(DecodeError::ColumnCount { expected: 1, found: 2 })));

    let mut source = Replay::new([row(&[]), complete(1)]);
    let err = scan::single_row(&decoder).interpret(&mut source).await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Decode(DecodeError::ColumnCount { expected: 1, found: 0 })));

    assert!(!called.get());
}

#[tokio::test]
async fn fold_order_and_count() {
    let steps = RefCell::new(Vec::new());
    let fold = fold_fn(
        || 0,
        |count, (n,): (i32,)| {
            steps.borrow_mut().push(n);
            count + 1
        },
        |count| count,
    );
    let mut source = Replay::new([row(&[1]), row(&[2]), row(&[3]), complete(3)]);
    let (folded, n) = scan::fold_rows(row_as::<(i32,)>(), fold).interpret(&mut source).await.unwrap();
    assert_eq!(*steps.borrow(), [1, 2, 3]);
    assert_eq!(folded, 3);
    assert_eq!(n, 3);
}

#[tokio::test]
async fn empty_query() {
    let mut source = Replay::new([Response::EmptyQueryResponse]);
    let fold = fold_fn(|| "start", |state, _: (i32,)| state, |state| format!("{state} finish"));
    let (folded, n) = scan::fold_rows(row_as::<(i32,)>(), fold).interpret(&mut source).await.unwrap();
    assert_eq!(folded, "start finish");
    assert_eq!(n, 0);

    let mut source = Replay::new([Response::EmptyQueryResponse]);
    let err = scan::single_row(row_as::<(i32,)>()).interpret(&mut source).await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Decode(DecodeError::EmptyQuery)));
}

#[tokio::test]
async fn single_row_extra_rows() {
    let decoded = RefCell::new(Vec::new());
    let decoder = decoder_fn(1, |columns, offset| {
        let n = try_get::<i32>(columns, offset)?;
        decoded.borrow_mut().push(n);
        Ok(n)
    });
    let mut source = Replay::new([row(&[10]), row(&[20]), complete(2)]);
    let value = scan::single_row(&decoder).interpret(&mut source).await.unwrap();
    assert_eq!(value, 10);
    assert_eq!(*decoded.borrow(), [10]);
    assert_eq!(source.discarded().len(), 1);
}

#[tokio::test]
async fn md5_branch_consumes_nothing_more() {
    let mut source = Replay::new([
        Response::Authentication(AuthenticationStatus::MD5Password { salt: *b"abcd" }),
        Response::ParameterStatus(ParameterStatus::new("integer_datetimes", "on")),
        Response::ReadyForQuery(TransactionStatus::Idle),
    ]);
    let result = scan::authentication_result().interpret(&mut source).await.unwrap();
    assert_eq!(result, AuthenticationResult::MD5Password { salt: *b"abcd" });
    assert_eq!(source.fetched(), 1);
    assert_eq!(source.remaining(), 2);
}

#[tokio::test]
async fn parameter_scan() {
    let mut source = Replay::new([
        Response::Authentication(AuthenticationStatus::Ok),
        Response::ParameterStatus(ParameterStatus::new("integer_datetimes", "on")),
        Response::ReadyForQuery(TransactionStatus::Idle),
    ]);
    let result = scan::authentication_result().interpret(&mut source).await.unwrap();
    assert_eq!(result, AuthenticationResult::Ok { integer_datetimes: true });
    assert_eq!(source.remaining(), 0);
}

#[tokio::test]
async fn missing_parameter() {
    let mut source = Replay::new([
        Response::Authentication(AuthenticationStatus::Ok),
        Response::ReadyForQuery(TransactionStatus::Idle),
    ]);
    let err = scan::authentication_result().interpret(&mut source).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Protocol(ProtocolError::MissingParameter("integer_datetimes"))
    ));
    assert_eq!(err.to_string().lines().next(), Some("missing integer_datetimes"));
}

#[tokio::test]
async fn skip_and_continue() {
    let plain = [row(&[7]), complete(1)];
    let mut source = Replay::new(plain);
    let expected = scan::single_row(row_as::<(i32,)>()).interpret(&mut source).await.unwrap();

    let mut source = Replay::new([row(&[7]), notice(), complete(1)]);
    let value = scan::single_row(row_as::<(i32,)>()).interpret(&mut source).await.unwrap();
    assert_eq!(value, expected);
    assert!(matches!(source.discarded(), [Response::NoticeResponse(_)]));

    // the message after a skipped one is classified, not the skipped one again
    let mut source = Replay::new([notice(), Response::BindComplete, Response::ParseComplete]);
    let err = scan::parse_complete()
        .and_then(|_| scan::bind_complete())
        .interpret(&mut source)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Io(_)));
    assert_eq!(source.discarded().len(), 2);
    assert!(matches!(source.discarded(), [Response::NoticeResponse(_), Response::BindComplete]));
}
