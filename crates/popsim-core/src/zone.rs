//! Zone identifiers.

use std::fmt;

/// Identifier of a zone at any geography level (county, PUMA, ...).
///
/// Zones are always processed in ascending id order so that results are
/// reproducible regardless of how work is scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ZoneId(pub u64);

impl ZoneId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        ZoneId(id)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ZoneId {
    fn from(id: u64) -> Self {
        ZoneId(id)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
