//! Postgres row operation.
//!
//! - [`RowDecoder`]
//! - [`FromRow`]
//! - [`Decode`]
//! - [`Fold`]
//!
//! - [`DecodeError`]
use bytes::Bytes;
use std::{borrow::Cow, fmt, marker::PhantomData, str::Utf8Error, string::FromUtf8Error};

use crate::ext::SliceExt;

/// Raw column values of a `DataRow`, in binary format, `None` is `NULL`.
pub type Columns = [Option<Bytes>];

/// Decode raw columns into a typed row.
pub trait RowDecoder {
    /// The decoded row.
    type Row;

    /// Number of columns `DataRow` must have.
    ///
    /// Row with different column count will never be passed to [`decode`][RowDecoder::decode].
    fn column_len(&self) -> usize;

    /// Decode row, starting from column at `offset`.
    fn decode(&self, columns: &Columns, offset: usize) -> Result<Self::Row, DecodeError>;
}

impl<D: RowDecoder> RowDecoder for &D {
    type Row = D::Row;

    fn column_len(&self) -> usize {
        D::column_len(self)
    }

    fn decode(&self, columns: &Columns, offset: usize) -> Result<Self::Row, DecodeError> {
        D::decode(self, columns, offset)
    }
}

/// [`RowDecoder`] for type that implement [`FromRow`].
///
/// Created by [`row_as`].
pub struct RowAs<R>(PhantomData<fn() -> R>);

/// Decode rows using [`FromRow`] implementation.
pub fn row_as<R: FromRow>() -> RowAs<R> {
    RowAs(PhantomData)
}

impl<R: FromRow> RowDecoder for RowAs<R> {
    type Row = R;

    fn column_len(&self) -> usize {
        R::COLUMNS
    }

    fn decode(&self, columns: &Columns, offset: usize) -> Result<R, DecodeError> {
        R::from_row(columns, offset)
    }
}

impl<R> Clone for RowAs<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for RowAs<R> { }

impl<R> fmt::Debug for RowAs<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowAs<{}>", std::any::type_name::<R>())
    }
}

/// [`RowDecoder`] from a closure.
///
/// Created by [`decoder_fn`].
#[derive(Clone, Copy)]
pub struct DecodeFn<F> {
    column_len: usize,
    f: F,
}

/// Create [`RowDecoder`] from column count and a closure.
pub fn decoder_fn<F, R>(column_len: usize, f: F) -> DecodeFn<F>
where
    F: Fn(&Columns, usize) -> Result<R, DecodeError>,
{
    DecodeFn { column_len, f }
}

impl<F, R> RowDecoder for DecodeFn<F>
where
    F: Fn(&Columns, usize) -> Result<R, DecodeError>,
{
    type Row = R;

    fn column_len(&self) -> usize {
        self.column_len
    }

    fn decode(&self, columns: &Columns, offset: usize) -> Result<R, DecodeError> {
        (self.f)(columns, offset)
    }
}

impl<F> fmt::Debug for DecodeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeFn").field("column_len", &self.column_len).finish_non_exhaustive()
    }
}

// ===== Traits =====

/// Type that can be constructed from a row.
pub trait FromRow: Sized {
    /// Number of columns consumed.
    const COLUMNS: usize;

    /// Construct self from columns, starting at `offset`.
    fn from_row(columns: &Columns, offset: usize) -> Result<Self, DecodeError>;
}

impl FromRow for () {
    const COLUMNS: usize = 0;

    fn from_row(_: &Columns, _: usize) -> Result<Self, DecodeError> {
        Ok(())
    }
}

/// Get and decode single column, used by [`FromRow`] implementations.
pub fn try_get<D: Decode>(columns: &Columns, index: usize) -> Result<D, DecodeError> {
    match columns.get(index) {
        Some(value) => D::decode(value.as_ref()),
        None => Err(DecodeError::IndexOutOfBounds(index)),
    }
}

macro_rules! from_row_tuple {
    ($len:literal; $($t:ident $i:literal),*) => {
        impl<$($t),*> FromRow for ($($t),*,)
        where
            $($t: Decode),*
        {
            const COLUMNS: usize = $len;

            fn from_row(columns: &Columns, offset: usize) -> Result<Self, DecodeError> {
                Ok((
                    $(try_get(columns, offset + $i)?),*,
                ))
            }
        }
    };
}

from_row_tuple!(1; T0 0);
from_row_tuple!(2; T0 0, T1 1);
from_row_tuple!(3; T0 0, T1 1, T2 2);
from_row_tuple!(4; T0 0, T1 1, T2 2, T3 3);
from_row_tuple!(5; T0 0, T1 1, T2 2, T3 3, T4 4);
from_row_tuple!(6; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5);
from_row_tuple!(7; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6);
from_row_tuple!(8; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7);

/// A type that can be decoded from single binary column value.
pub trait Decode: Sized {
    /// Try decode self from column value, [`None`] is `NULL`.
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError>;
}

/// Returns [`DecodeError::Null`] if value is `NULL`.
pub fn not_null(value: Option<&Bytes>) -> Result<&Bytes, DecodeError> {
    value.ok_or(DecodeError::Null)
}

impl<T: Decode> Decode for Option<T> {
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
        match value {
            None => Ok(None),
            Some(_) => T::decode(value).map(Some),
        }
    }
}

impl Decode for () {
    fn decode(_: Option<&Bytes>) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl Decode for Bytes {
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
        not_null(value).cloned()
    }
}

impl Decode for Vec<u8> {
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
        Ok(not_null(value)?.to_vec())
    }
}

impl Decode for String {
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
        Ok(String::from_utf8(not_null(value)?.to_vec())?)
    }
}

impl Decode for bool {
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
        let [b] = fixed(value)?;
        Ok(b != 0)
    }
}

macro_rules! decode_be {
    ($($ty:ty),*) => {$(
        impl Decode for $ty {
            fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
                Ok(<$ty>::from_be_bytes(fixed(value)?))
            }
        }
    )*};
}

decode_be!(i16, i32, i64, f32, f64);

/// Fixed width non-null value.
pub(crate) fn fixed<const N: usize>(value: Option<&Bytes>) -> Result<[u8; N], DecodeError> {
    not_null(value)?
        .to_array()
        .map_err(|found| DecodeError::InvalidLength { expected: N, found })
}

/// Accumulate rows incrementally.
///
/// [`start`][Fold::start] runs once before the first row, [`step`][Fold::step] once per row in
/// arrival order, [`finish`][Fold::finish] once when the result completes. On error the state
/// is dropped without calling `finish`.
pub trait Fold<R> {
    /// The accumulator.
    type State;
    /// The final result.
    type Output;

    fn start(&mut self) -> Self::State;

    fn step(&mut self, state: Self::State, row: R) -> Self::State;

    fn finish(&mut self, state: Self::State) -> Self::Output;
}

/// [`Fold`] that collect rows into [`Vec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Collect;

impl<R> Fold<R> for Collect {
    type State = Vec<R>;
    type Output = Vec<R>;

    fn start(&mut self) -> Vec<R> {
        Vec::new()
    }

    fn step(&mut self, mut state: Vec<R>, row: R) -> Vec<R> {
        state.push(row);
        state
    }

    fn finish(&mut self, state: Vec<R>) -> Vec<R> {
        state
    }
}

/// [`Fold`] from closures.
///
/// Created by [`fold_fn`].
#[derive(Clone, Copy)]
pub struct FoldFn<S, T, F> {
    start: S,
    step: T,
    finish: F,
}

/// Create [`Fold`] from `start`, `step`, and `finish` closures.
pub fn fold_fn<S, T, F, St, R, O>(start: S, step: T, finish: F) -> FoldFn<S, T, F>
where
    S: FnMut() -> St,
    T: FnMut(St, R) -> St,
    F: FnMut(St) -> O,
{
    FoldFn { start, step, finish }
}

impl<S, T, F, St, R, O> Fold<R> for FoldFn<S, T, F>
where
    S: FnMut() -> St,
    T: FnMut(St, R) -> St,
    F: FnMut(St) -> O,
{
    type State = St;
    type Output = O;

    fn start(&mut self) -> St {
        (self.start)()
    }

    fn step(&mut self, state: St, row: R) -> St {
        (self.step)(state, row)
    }

    fn finish(&mut self, state: St) -> O {
        (self.finish)(state)
    }
}

impl<S, T, F> fmt::Debug for FoldFn<S, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FoldFn")
    }
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for DecodeError {
            fn from($pat: $ty) -> Self {
                $body
            }
        }
    };
}

/// An error when decoding row value.
pub enum DecodeError {
    /// `DataRow` column count differs from the expected.
    ColumnCount {
        expected: usize,
        found: usize,
    },
    /// Query that expected a single row complete without any row.
    NotSingleRow,
    /// Query that expected rows is an empty query.
    EmptyQuery,
    /// Postgres return non utf8 string.
    Utf8(Utf8Error),
    /// Index requested is out of bounds.
    IndexOutOfBounds(usize),
    /// Fixed width value have different length.
    InvalidLength {
        expected: usize,
        found: usize,
    },
    /// Row is null.
    Null,
    /// Custom decoding error.
    Custom(Cow<'static, str>),
    /// Failed to deserialize using `serde_json`.
    #[cfg(feature = "json")]
    Json(serde_json::error::Error),
}

impl DecodeError {
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(message.into())
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnCount { expected, found } => {
                write!(f, "expected {expected} columns, found {found}")
            },
            Self::NotSingleRow => f.write_str("Not a single row"),
            Self::EmptyQuery => f.write_str("Empty query"),
            Self::Utf8(e) => write!(f, "failed to decode value, {e}"),
            Self::IndexOutOfBounds(u) => write!(f, "index out of bounds: {u:?}"),
            Self::InvalidLength { expected, found } => {
                write!(f, "invalid value length, expected {expected} bytes, found {found}")
            },
            Self::Null => f.write_str("unexpected NULL value"),
            Self::Custom(e) => f.write_str(e),
            #[cfg(feature = "json")]
            Self::Json(e) => write!(f, "failed to decode value, {e}"),
        }
    }
}

from!(<Utf8Error>e => Self::Utf8(e));
from!(<FromUtf8Error>e => Self::Utf8(e.utf8_error()));
#[cfg(feature = "json")]
from!(<serde_json::error::Error>e => Self::Json(e));

impl std::error::Error for DecodeError { }

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
