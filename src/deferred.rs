//! Deferred rendering of blocks whose position is only known at assembly time.
//!
//! Blocks register a callback either against a placeholder they reserved in
//! the flowing content, or against an explicit page rectangle. The registry
//! is engine-agnostic: it only needs a [`DocumentFinalizer`] that reports
//! where each placeholder ended up and hands out per-page overlay surfaces.

use log::{debug, warn};
use mapsheet_render_core::{DocumentFinalizer, DrawSurface, RenderError};
use mapsheet_types::{PlaceholderId, Rect};
use std::collections::HashMap;
use std::fmt;

/// Draws one block into its final rectangle.
pub type RenderCallback = Box<dyn FnOnce(Rect, &mut dyn DrawSurface) -> Result<(), RenderError>>;

/// An explicit page position for an absolutely placed block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteSlot {
    pub page: usize,
    pub rect: Rect,
}

pub enum RegistryEntry {
    /// Waits for the layout engine to resolve `placeholder`.
    Flow {
        placeholder: PlaceholderId,
        callback: RenderCallback,
    },
    /// Geometry known up front; drawn on the page overlay.
    Absolute {
        slot: AbsoluteSlot,
        callback: RenderCallback,
    },
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEntry::Flow { placeholder, .. } => {
                f.debug_struct("Flow").field("placeholder", placeholder).finish_non_exhaustive()
            }
            RegistryEntry::Absolute { slot, .. } => {
                f.debug_struct("Absolute").field("slot", slot).finish_non_exhaustive()
            }
        }
    }
}

/// What happened during [`DeferredBlockRegistry::resolve_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub flow_rendered: usize,
    pub absolute_rendered: usize,
    /// Flow entries whose placeholder never came back from the layout engine.
    pub dropped: usize,
}

/// Per-document registry of deferred block renders.
///
/// Entries are kept in registration order. Each one is consumed when it
/// fires, so no callback can run twice.
#[derive(Debug, Default)]
pub struct DeferredBlockRegistry {
    entries: Vec<Option<RegistryEntry>>,
    by_placeholder: HashMap<PlaceholderId, usize>,
}

impl DeferredBlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not fired yet.
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    pub fn reserve_flow(&mut self, placeholder: PlaceholderId, callback: RenderCallback) {
        if self.by_placeholder.contains_key(&placeholder) {
            warn!("{} is already registered; ignoring the second registration", placeholder);
            return;
        }
        debug!("Registered flow block for {}", placeholder);
        self.by_placeholder.insert(placeholder, self.entries.len());
        self.entries.push(Some(RegistryEntry::Flow { placeholder, callback }));
    }

    pub fn reserve_absolute(&mut self, slot: AbsoluteSlot, callback: RenderCallback) {
        debug!("Registered absolute block on page {} at {:?}", slot.page, slot.rect);
        self.entries.push(Some(RegistryEntry::Absolute { slot, callback }));
    }

    /// Report that `placeholder` was laid out at `rect` on `surface`.
    ///
    /// Returns `Ok(true)` if a callback fired. Unknown placeholders and
    /// repeated reports for one that already fired are no-ops.
    pub fn on_resolved(
        &mut self,
        placeholder: PlaceholderId,
        rect: Rect,
        surface: &mut dyn DrawSurface,
    ) -> Result<bool, RenderError> {
        let Some(index) = self.by_placeholder.remove(&placeholder) else {
            debug!("{} resolved with no pending callback", placeholder);
            return Ok(false);
        };
        match self.entries.get_mut(index).and_then(Option::take) {
            Some(RegistryEntry::Flow { callback, .. }) => {
                debug!("Rendering flow block for {} at {:?}", placeholder, rect);
                callback(rect, surface)?;
                Ok(true)
            }
            Some(absolute) => {
                // Absolute entries are never indexed by placeholder
                self.entries[index] = Some(absolute);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Fire every callback against `finalizer`.
    ///
    /// Flow callbacks fire in the order the finalizer resolves their
    /// placeholders. Absolute callbacks fire afterwards, in registration
    /// order, on the overlay of their page. The first callback error aborts
    /// the whole resolution.
    pub fn resolve_all(
        mut self,
        finalizer: &mut dyn DocumentFinalizer,
    ) -> Result<ResolutionReport, RenderError> {
        let mut report = ResolutionReport::default();

        finalizer.emit_flow(&mut |placeholder, rect, surface| {
            if self.on_resolved(placeholder, rect, surface)? {
                report.flow_rendered += 1;
            }
            Ok(())
        })?;

        for entry in self.entries.iter_mut() {
            if !matches!(entry, Some(RegistryEntry::Absolute { .. })) {
                continue;
            }
            if let Some(RegistryEntry::Absolute { slot, callback }) = entry.take() {
                let surface = finalizer.overlay(slot.page)?;
                callback(slot.rect, surface)?;
                report.absolute_rendered += 1;
            }
        }

        for entry in self.entries.iter().flatten() {
            if let RegistryEntry::Flow { placeholder, .. } = entry {
                debug!("Dropping block for {}: it was never laid out", placeholder);
                report.dropped += 1;
            }
        }

        Ok(report)
    }
}
