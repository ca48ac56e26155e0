//! Binary datetime values.
//!
//! Only integer datetimes are supported, which is reported by `integer_datetimes` parameter,
//! see [`authentication_result`][crate::scan::authentication_result].
use bytes::Bytes;
use time::{Date, Duration, PrimitiveDateTime, Time, UtcDateTime};

use crate::{Decode, DecodeError, row::fixed};

/// 2000-01-01
const PG_EPOCH_DATE: Date = match Date::from_julian_day(2_451_545) {
    Ok(ok) => ok,
    Err(_) => panic!("invalid postgres epoch"),
};

const PRIMITIVE_PG_EPOCH: PrimitiveDateTime = PrimitiveDateTime::new(PG_EPOCH_DATE, Time::MIDNIGHT);

const UTC_PG_EPOCH: UtcDateTime = UtcDateTime::new(PG_EPOCH_DATE, Time::MIDNIGHT);

fn out_of_range() -> DecodeError {
    DecodeError::custom("datetime out of range")
}

/// `date`, days since postgres epoch.
impl Decode for Date {
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
        let days = i32::from_be_bytes(fixed(value)?);
        PG_EPOCH_DATE
            .checked_add(Duration::days(days.into()))
            .ok_or_else(out_of_range)
    }
}

/// `timestamp`, microseconds since postgres epoch.
impl Decode for PrimitiveDateTime {
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
        let micros = i64::from_be_bytes(fixed(value)?);
        PRIMITIVE_PG_EPOCH
            .checked_add(Duration::microseconds(micros))
            .ok_or_else(out_of_range)
    }
}

/// `timestamptz`, microseconds since postgres epoch in UTC.
impl Decode for UtcDateTime {
    fn decode(value: Option<&Bytes>) -> Result<Self, DecodeError> {
        let micros = i64::from_be_bytes(fixed(value)?);
        UTC_PG_EPOCH
            .checked_add(Duration::microseconds(micros))
            .ok_or_else(out_of_range)
    }
}
