//! C-compatible element kind tags.

use tessel_core::ElementKind;

/// Element kind tag accepted by `tessel_block_alloc` and friends.
///
/// Mirrors [`ElementKind`] value for value.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TesselKind {
    /// `double`
    Float64 = 0,
    /// `int32_t`
    Int32 = 1,
    /// `uint8_t`
    UInt8 = 2,
}

impl From<TesselKind> for ElementKind {
    fn from(kind: TesselKind) -> Self {
        match kind {
            TesselKind::Float64 => ElementKind::Float64,
            TesselKind::Int32 => ElementKind::Int32,
            TesselKind::UInt8 => ElementKind::UInt8,
        }
    }
}

impl From<ElementKind> for TesselKind {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Float64 => TesselKind::Float64,
            ElementKind::Int32 => TesselKind::Int32,
            ElementKind::UInt8 => TesselKind::UInt8,
        }
    }
}

/// Parse a raw kind tag from C.
pub(crate) fn parse_kind(tag: i32) -> Option<ElementKind> {
    match tag {
        x if x == TesselKind::Float64 as i32 => Some(ElementKind::Float64),
        x if x == TesselKind::Int32 as i32 => Some(ElementKind::Int32),
        x if x == TesselKind::UInt8 as i32 => Some(ElementKind::UInt8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_agree_with_core_kinds() {
        for kind in ElementKind::ALL {
            assert_eq!(TesselKind::from(kind) as i32, kind as i32);
            assert_eq!(parse_kind(kind as i32), Some(kind));
            assert_eq!(ElementKind::from(TesselKind::from(kind)), kind);
        }
        assert_eq!(parse_kind(3), None);
        assert_eq!(parse_kind(-1), None);
    }
}
