//! Resolving where an action goes.

use actions::{SurfaceId, Target};
use collections::Arena;

/// Where an action originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    App,
    Surface(SurfaceId),
}

/// Turns an [`Origin`] into a [`Target`] against the live surface set.
#[derive(Debug)]
pub struct TargetResolver<'a, T> {
    surfaces: &'a Arena<T>,
}

impl<'a, T> TargetResolver<'a, T> {
    pub fn new(surfaces: &'a Arena<T>) -> Self {
        Self { surfaces }
    }

    /// `None` when the origin surface no longer exists.
    pub fn resolve(&self, origin: Origin) -> Option<Target> {
        match origin {
            Origin::App => Some(Target::App),
            Origin::Surface(id) if self.surfaces.contains(id.0) => Some(Target::Surface(id)),
            Origin::Surface(id) => {
                tracing::debug!("Dropping action from stale {:?}", id);
                None
            }
        }
    }

    /// Like [`Self::resolve`], but application-scoped actions always go to
    /// the app, whichever surface raised them.
    pub fn resolve_scoped(&self, origin: Origin, app_scoped: bool) -> Option<Target> {
        if app_scoped {
            return Some(Target::App);
        }
        self.resolve(origin)
    }
}
