use super::{Matched, matching, skip};
use crate::{
    Result,
    backend::{AuthenticationStatus, Response},
    common::{log_warn, span, verbose},
    error::ProtocolError,
    interpret::{Either, Interpret, pure},
    source::{ResponseSource, ResponseSourceExt},
};

const INTEGER_DATETIMES: &str = "integer_datetimes";

/// Outcome of the authentication handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationResult {
    /// Clear-text password is required.
    CleartextPassword,
    /// MD5-encrypted password is required.
    MD5Password {
        /// The salt to use when encrypting the password.
        salt: [u8;4],
    },
    /// Authenticated, and the backend is ready for query.
    Ok {
        /// Whether datetime values are transmitted as 64-bit integer.
        integer_datetimes: bool,
    },
}

/// Expect `Authentication`, returns the authentication request.
pub fn authentication_status() -> impl Interpret<Output = AuthenticationStatus> {
    matching(|response| match response {
        Response::Authentication(status) => Matched::Yield(Ok(status)),
        response => Matched::Skip(response),
    })
}

/// Expect `ParameterStatus`, returns `combine(name, value)`.
pub fn parameter_status<F, T>(mut combine: F) -> impl Interpret<Output = T>
where
    F: FnMut(String, String) -> T,
{
    matching(move |response| match response {
        Response::ParameterStatus(param) => Matched::Yield(Ok(combine(param.name, param.value))),
        response => Matched::Skip(response),
    })
}

/// Scan `ParameterStatus` until `ReadyForQuery`, returns `integer_datetimes` setting.
///
/// Fails with [`ProtocolError`] when the setting is never reported or has unknown value.
///
/// Note that `ErrorResponse` is discarded here, the server reports authentication failure
/// before any parameter, which [`authentication_status`] already guards.
pub fn parameters() -> Parameters {
    Parameters { _priv: () }
}

/// Returned from [`parameters`].
#[derive(Debug, Clone, Copy)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub struct Parameters {
    _priv: (),
}

impl Interpret for Parameters {
    type Output = bool;

    async fn interpret<S: ResponseSource>(self, mut source: S) -> Result<bool> {
        let mut state = Err(ProtocolError::MissingParameter(INTEGER_DATETIMES));

        loop {
            let response = source.fetch().await?;
            span!("parameters");
            match response {
                Response::ParameterStatus(param) if param.name == INTEGER_DATETIMES => {
                    state = match param.value.as_str() {
                        "on" => Ok(true),
                        "off" => Ok(false),
                        _ => Err(ProtocolError::UnexpectedParameter {
                            name: INTEGER_DATETIMES,
                            value: param.value,
                        }),
                    };
                },
                Response::ParameterStatus(_param) => {
                    verbose!(name = %_param.name, value = %_param.value, "parameter");
                },
                Response::ReadyForQuery(_) => return Ok(state?),
                Response::ErrorResponse(err) => {
                    log_warn!("error while reading parameters: {err}");
                    skip(&mut source, Response::ErrorResponse(err));
                },
                response => skip(&mut source, response),
            }
        }
    }
}

/// Expect `Authentication`, and scan [`parameters`] when authenticated.
///
/// Password request returns immediately without consuming further message.
pub fn authentication_result() -> impl Interpret<Output = AuthenticationResult> {
    authentication_status().and_then(|status| match status {
        AuthenticationStatus::CleartextPassword => {
            Either::Left(pure(AuthenticationResult::CleartextPassword))
        },
        AuthenticationStatus::MD5Password { salt } => {
            Either::Left(pure(AuthenticationResult::MD5Password { salt }))
        },
        AuthenticationStatus::Ok => Either::Right(
            parameters().map(|integer_datetimes| AuthenticationResult::Ok { integer_datetimes }),
        ),
    })
}
