//! Tag length classes

use serde::{Deserialize, Serialize};

/// Byte-length category of a frame chunk, selected by the tag's numeric range.
///
/// Every tag byte falls in exactly one class, including tags no interpreter
/// knows about, so unknown chunks can be stepped over without losing sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthClass {
    /// `0x00..=0x3F`: the tag alone, no value bytes
    TagOnly,
    /// `0x40..=0x7F`: tag plus one value byte
    OneByte,
    /// `0x80..=0xBF`: tag plus two value bytes
    TwoBytes,
    /// `0xC0..=0xFF`: tag plus four value bytes
    FourBytes,
}

impl LengthClass {
    /// Classify a tag byte.
    pub const fn of(tag: u8) -> Self {
        match tag {
            0x00..=0x3F => LengthClass::TagOnly,
            0x40..=0x7F => LengthClass::OneByte,
            0x80..=0xBF => LengthClass::TwoBytes,
            0xC0..=0xFF => LengthClass::FourBytes,
        }
    }

    /// Total bytes the chunk occupies, tag included.
    pub const fn size(&self) -> usize {
        match self {
            LengthClass::TagOnly => 1,
            LengthClass::OneByte => 2,
            LengthClass::TwoBytes => 3,
            LengthClass::FourBytes => 5,
        }
    }

    /// Number of value bytes following the tag.
    pub const fn value_len(&self) -> usize {
        self.size() - 1
    }
}
