use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::ops::{Deref, DerefMut};

use crate::{Decode, DecodeError, row::not_null};

const JSONB_VERSION: u8 = 1;

/// Decode postgres `jsonb` value.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Decode for Json<T>
where
    T: DeserializeOwned,
{
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
        let value = not_null(value)?;
        let Some((&JSONB_VERSION, json)) = value.split_first() else {
            return Err(DecodeError::custom("unsupported jsonb version"));
        };
        Ok(Self(serde_json::from_slice(json)?))
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn jsonb() {
        let value = Bytes::from_static(b"\x01[1,2,3]");
        let Json(list) = Json::<Vec<i32>>::decode(Some(&value)).unwrap();
        assert_eq!(list, [1, 2, 3]);

        let text = Bytes::from_static(b"[1]");
        assert!(matches!(Json::<Vec<i32>>::decode(Some(&text)), Err(DecodeError::Custom(_))));
    }
}
