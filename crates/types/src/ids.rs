//! Newtype wrappers for identifiers handed out by the layout engine.

use std::fmt;

/// An opaque handle to a space reservation in the flowing content.
///
/// The layout engine hands these out when a block asks for room it will only
/// fill in once the final position is known. Handles are unique within one
/// document build.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(u32);

impl PlaceholderId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "placeholder#{}", self.0)
    }
}
