use std::collections::BTreeMap;

use foundation::{HandleAllocator, MarkerHandle};

use crate::layer::MarkerCategory;
use crate::marker::RenderedMarker;

/// The visual map layer markers are drawn on.
///
/// Only [`crate::MarkerRegistry`] calls into a surface; everything else
/// goes through the registry.
pub trait MapSurface {
    fn add_marker(&mut self, marker: RenderedMarker) -> MarkerHandle;

    /// Returns `false` when `handle` is not (or no longer) drawn.
    fn remove_marker(&mut self, handle: MarkerHandle) -> bool;
}

/// In-memory surface that keeps what is drawn and counts operations.
///
/// Used headless (CLI, tests) and as the reference for what a real widget
/// binding must do.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    handles: HandleAllocator,
    drawn: BTreeMap<MarkerHandle, RenderedMarker>,
    adds: u64,
    removes: u64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.drawn.len()
    }

    pub fn live_in(&self, category: MarkerCategory) -> Vec<&RenderedMarker> {
        self.drawn
            .values()
            .filter(|m| m.category == category)
            .collect()
    }

    pub fn is_drawn(&self, handle: MarkerHandle) -> bool {
        self.drawn.contains_key(&handle)
    }

    pub fn adds(&self) -> u64 {
        self.adds
    }

    pub fn removes(&self) -> u64 {
        self.removes
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, marker: RenderedMarker) -> MarkerHandle {
        let handle = self.handles.allocate();
        self.drawn.insert(handle, marker);
        self.adds += 1;
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) -> bool {
        if !self.handles.release(handle) {
            return false;
        }
        self.drawn.remove(&handle);
        self.removes += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{MapSurface, RecordingSurface};
    use crate::marker::MarkerDescriptor;
    use foundation::LatLon;

    #[test]
    fn remove_is_idempotent() {
        let mut s = RecordingSurface::new();
        let h = s.add_marker(
            MarkerDescriptor::User {
                position: LatLon::new(0.0, 0.0),
            }
            .render(),
        );
        assert!(s.is_drawn(h));
        assert!(s.remove_marker(h));
        assert!(!s.remove_marker(h));
        assert_eq!((s.adds(), s.removes(), s.live_count()), (1, 1, 0));
    }
}
