//! The [`Interpret`] trait.
//!
//! An interpreter is a description of how to consume a prefix of backend messages. It does
//! nothing until [`interpret`][Interpret::interpret] is awaited with a [`ResponseSource`].
//!
//! Interpreters compose left to right, and the first error short-circuits the rest:
//!
//! ```no_run
//! use pgscan::{Interpret, Replay, scan};
//!
//! # async fn app(mut source: Replay) -> pgscan::Result<()> {
//! let rows = scan::parse_complete()
//!     .and_then(|_| scan::bind_complete())
//!     .and_then(|_| scan::rows_affected())
//!     .interpret(&mut source)
//!     .await?;
//! # Ok(())
//! # }
//! ```
use crate::{Result, source::ResponseSource};

/// A composable computation over backend messages.
pub trait Interpret: Sized {
    /// Value produced on success.
    type Output;

    /// Run the interpreter against `source`.
    ///
    /// Returns after the last message it needs is consumed, or on the first error. No further
    /// message is fetched or discarded once it fails.
    fn interpret<S: ResponseSource>(self, source: S) -> impl Future<Output = Result<Self::Output>>;

    /// Run `f` with the output of this interpreter, continuing from where it stopped.
    fn and_then<F, I>(self, f: F) -> AndThen<Self, F>
    where
        F: FnOnce(Self::Output) -> I,
        I: Interpret,
    {
        AndThen { inner: self, f }
    }

    /// Transform the output of this interpreter.
    fn map<F, T>(self, f: F) -> Map<Self, F>
    where
        F: FnOnce(Self::Output) -> T,
    {
        Map { inner: self, f }
    }
}

/// Interpreter that consumes nothing and always succeeds with `value`.
pub fn pure<T>(value: T) -> Pure<T> {
    Pure { value }
}

/// Returned from [`pure`].
#[derive(Debug, Clone)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub struct Pure<T> {
    value: T,
}

impl<T> Interpret for Pure<T> {
    type Output = T;

    async fn interpret<S: ResponseSource>(self, _: S) -> Result<T> {
        Ok(self.value)
    }
}

/// Returned from [`Interpret::and_then`].
#[derive(Debug, Clone)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub struct AndThen<I, F> {
    inner: I,
    f: F,
}

impl<I, F, J> Interpret for AndThen<I, F>
where
    I: Interpret,
    F: FnOnce(I::Output) -> J,
    J: Interpret,
{
    type Output = J::Output;

    async fn interpret<S: ResponseSource>(self, mut source: S) -> Result<J::Output> {
        let value = self.inner.interpret(&mut source).await?;
        (self.f)(value).interpret(source).await
    }
}

/// Returned from [`Interpret::map`].
#[derive(Debug, Clone)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub struct Map<I, F> {
    inner: I,
    f: F,
}

impl<I, F, T> Interpret for Map<I, F>
where
    I: Interpret,
    F: FnOnce(I::Output) -> T,
{
    type Output = T;

    async fn interpret<S: ResponseSource>(self, source: S) -> Result<T> {
        let value = self.inner.interpret(source).await?;
        Ok((self.f)(value))
    }
}

/// Either of two interpreters with the same output.
///
/// Allow [`Interpret::and_then`] to continue with different interpreter per branch.
#[derive(Debug, Clone)]
#[must_use = "interpreters do nothing unless `interpret` is awaited"]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L, R> Interpret for Either<L, R>
where
    L: Interpret,
    R: Interpret<Output = L::Output>,
{
    type Output = L::Output;

    async fn interpret<S: ResponseSource>(self, source: S) -> Result<L::Output> {
        match self {
            Either::Left(l) => l.interpret(source).await,
            Either::Right(r) => r.interpret(source).await,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        ErrorKind,
        backend::{CommandComplete, ErrorResponse, Response},
        scan,
        source::Replay,
    };

    #[tokio::test]
    async fn pure_consumes_nothing() {
        let mut source = Replay::new([Response::ParseComplete]);
        let value = pure(7).interpret(&mut source).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(source.remaining(), 1);
        assert!(source.discarded().is_empty());
    }

    #[tokio::test]
    async fn sequence_continues_stream() {
        let mut source = Replay::new([
            Response::ParseComplete,
            Response::BindComplete,
            Response::CommandComplete(CommandComplete::new(4)),
        ]);
        let rows = scan::parse_complete()
            .and_then(|_| scan::bind_complete())
            .and_then(|_| scan::rows_affected())
            .map(|n| n * 10)
            .interpret(&mut source)
            .await
            .unwrap();
        assert_eq!(rows, 40);
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn failure_short_circuits() {
        let mut source = Replay::new([
            Response::ErrorResponse(ErrorResponse::new("42601", "syntax error")),
            Response::BindComplete,
        ]);
        let mut called = false;
        let err = scan::parse_complete()
            .and_then(|_| {
                called = true;
                scan::bind_complete()
            })
            .interpret(&mut source)
            .await
            .unwrap_err();
        assert!(!called);
        assert!(matches!(err.kind(), ErrorKind::Backend(e) if e.code == "42601"));
        assert_eq!(source.remaining(), 1);
    }

    #[tokio::test]
    async fn either_branch() {
        for flag in [true, false] {
            let mut source = Replay::new([Response::CommandComplete(CommandComplete::new(2))]);
            let value = pure(flag)
                .and_then(|flag| match flag {
                    true => Either::Left(pure(1)),
                    false => Either::Right(scan::rows_affected()),
                })
                .interpret(&mut source)
                .await
                .unwrap();
            assert_eq!(value, if flag { 1 } else { 2 });
            assert_eq!(source.remaining(), if flag { 1 } else { 0 });
        }
    }
}
