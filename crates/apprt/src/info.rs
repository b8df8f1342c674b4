//! Build information reported to hosts.

use std::fmt;

/// How the engine was compiled. Wire values are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BuildMode {
    Debug = 0,
    ReleaseSafe = 1,
    ReleaseFast = 2,
    ReleaseSmall = 3,
}

impl BuildMode {
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::ReleaseFast
        }
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Debug),
            1 => Some(Self::ReleaseSafe),
            2 => Some(Self::ReleaseFast),
            3 => Some(Self::ReleaseSmall),
            _ => None,
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::ReleaseSafe => write!(f, "release-safe"),
            Self::ReleaseFast => write!(f, "release-fast"),
            Self::ReleaseSmall => write!(f, "release-small"),
        }
    }
}

/// Engine version, from the package manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_matches_build() {
        assert_eq!(BuildMode::current() == BuildMode::Debug, cfg!(debug_assertions));
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn wire_values() {
        assert_eq!(BuildMode::from_raw(3), Some(BuildMode::ReleaseSmall));
        assert_eq!(BuildMode::from_raw(4), None);
    }
}
