//! Extension traits.

/// Helper trait to [`Display`][std::fmt::Display] bytes.
pub trait FmtExt {
    /// Lossy [`Display`][std::fmt::Display] bytes.
    fn lossy(&self) -> LossyFmt<'_>;
}

/// Lossy [`Display`][std::fmt::Display] implementation for bytes.
pub struct LossyFmt<'a>(pub &'a [u8]);

impl FmtExt for [u8] {
    fn lossy(&self) -> LossyFmt<'_> {
        LossyFmt(self)
    }
}

impl std::fmt::Display for LossyFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for LossyFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "b\"{self}\"")
    }
}

/// Fixed width binary value.
pub trait SliceExt {
    /// Copy exactly `N` bytes, returns the actual length otherwise.
    fn to_array<const N: usize>(&self) -> Result<[u8; N], usize>;
}

impl SliceExt for [u8] {
    fn to_array<const N: usize>(&self) -> Result<[u8; N], usize> {
        self.try_into().map_err(|_| self.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lossy_bytes() {
        assert_eq!(b"ab\x01 c".lossy().to_string(), "ab\\x01 c");
        assert_eq!(format!("{:?}", b"id".lossy()), "b\"id\"");
    }

    #[test]
    fn fixed_width() {
        assert_eq!([0u8, 7].to_array::<2>(), Ok([0, 7]));
        assert_eq!([0u8, 7, 1].to_array::<2>(), Err(3));
    }
}
