//! Dispatch targets.

use std::fmt;

use collections::Index;

/// Generation-checked handle to a surface. Stale handles never resolve.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub Index);

impl SurfaceId {
    /// Non-zero integer form, for opaque handles and logs.
    pub fn to_bits(self) -> u64 {
        self.0.to_bits()
    }

    pub fn from_bits(bits: u64) -> Option<Self> {
        Index::from_bits(bits).map(Self)
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{:?}", self.0)
    }
}

/// What an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    App,
    Surface(SurfaceId),
}

impl Target {
    pub fn surface(self) -> Option<SurfaceId> {
        match self {
            Self::App => None,
            Self::Surface(id) => Some(id),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App => f.write_str("app"),
            Self::Surface(id) => write!(f, "{id:?}"),
        }
    }
}
