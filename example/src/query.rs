use pgscan::{
    FromRow, Interpret, Result, Response, row_as,
    backend::{CommandComplete, ErrorResponse, NoticeResponse, TransactionStatus},
    scan,
};
use time::PrimitiveDateTime;

use crate::transport::{data_row, scripted};

#[derive(Debug, FromRow)]
struct Post {
    id: i32,
    title: String,
    created_at: PrimitiveDateTime,
}

fn post(id: i32, title: &str, micros: i64) -> Response {
    data_row([
        Some(id.to_be_bytes().to_vec()),
        Some(title.as_bytes().to_vec()),
        Some(micros.to_be_bytes().to_vec()),
    ])
}

pub async fn main() -> Result<()> {
    // Fetch all

    let mut source = scripted(vec![
        Response::ParseComplete,
        Response::BindComplete,
        post(1, "Foo", 0),
        Response::NoticeResponse(NoticeResponse { message: "slow query".into() }),
        post(2, "Bar", 86_400_000_000),
        Response::CommandComplete(CommandComplete::from_tag("SELECT 2")),
        Response::ReadyForQuery(TransactionStatus::Idle),
    ]);
    let posts = scan::parse_complete()
        .and_then(|_| scan::bind_complete())
        .and_then(|_| scan::until_ready(scan::fetch_all(row_as::<Post>())))
        .interpret(&mut source)
        .await?;
    for post in &posts {
        tracing::info!(post.id, %post.title, %post.created_at, "post");
    }
    assert_eq!(posts.len(), 2);

    // Execute

    let mut source = scripted(vec![
        Response::BindComplete,
        Response::CommandComplete(CommandComplete::from_tag("INSERT 0 3")),
        Response::ReadyForQuery(TransactionStatus::Transaction),
    ]);
    let rows = scan::bind_complete()
        .and_then(|_| scan::until_ready(scan::rows_affected()))
        .interpret(&mut source)
        .await?;
    tracing::info!(rows, "inserted");

    // Error

    let mut source = scripted(vec![
        Response::BindComplete,
        Response::ErrorResponse(ErrorResponse::new("42P01", "relation \"foo\" does not exist")),
        Response::ReadyForQuery(TransactionStatus::Idle),
    ]);
    let result = scan::bind_complete()
        .and_then(|_| scan::single_row(row_as::<(i32,)>()))
        .interpret(&mut source)
        .await;
    if let Err(err) = result {
        assert!(err.is_backend());
        tracing::warn!("query failed: {}", err.kind());
        let status = scan::ready_for_query().interpret(&mut source).await?;
        tracing::info!(?status, "recovered");
    }

    Ok(())
}
