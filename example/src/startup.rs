use pgscan::{
    Interpret, Result, Response,
    backend::{AuthenticationStatus, BackendKeyData, ParameterStatus, TransactionStatus},
    scan::{self, AuthenticationResult},
};

use crate::transport::scripted;

pub async fn main() -> Result<()> {
    // password requested, nothing else is read
    let mut source = scripted(vec![
        Response::Authentication(AuthenticationStatus::MD5Password { salt: *b"abcd" }),
    ]);
    let result = scan::authentication_result().interpret(&mut source).await?;
    tracing::info!(?result, "authentication");
    assert_eq!(result, AuthenticationResult::MD5Password { salt: *b"abcd" });

    let mut source = scripted(vec![
        Response::Authentication(AuthenticationStatus::Ok),
        Response::ParameterStatus(ParameterStatus::new("server_version", "17.2")),
        Response::ParameterStatus(ParameterStatus::new("integer_datetimes", "on")),
        Response::BackendKeyData(BackendKeyData { process_id: 4242, secret_key: 7 }),
        Response::ReadyForQuery(TransactionStatus::Idle),
    ]);
    let result = scan::authentication_result().interpret(&mut source).await?;
    tracing::info!(?result, "authentication");
    assert_eq!(result, AuthenticationResult::Ok { integer_datetimes: true });

    // server never reports `integer_datetimes`
    let mut source = scripted(vec![
        Response::Authentication(AuthenticationStatus::Ok),
        Response::ReadyForQuery(TransactionStatus::Idle),
    ]);
    match scan::authentication_result().interpret(&mut source).await {
        Ok(result) => unreachable!("unexpected {result:?}"),
        Err(err) => tracing::warn!("startup failed: {}", err.kind()),
    }

    Ok(())
}
