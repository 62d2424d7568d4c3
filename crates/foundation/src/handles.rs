/// Generational handle for a live marker on a map surface: (slot, generation).
///
/// A slot is reused after its marker is removed, but the generation is bumped,
/// so a stale handle never aliases the marker that replaced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle {
    slot: u32,
    generation: u32,
}

impl MarkerHandle {
    pub fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }
}

/// Slot allocator for [`MarkerHandle`]s with free-list reuse.
#[derive(Debug, Default, Clone)]
pub struct HandleAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: Vec<u32>,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> MarkerHandle {
        if let Some(slot) = self.free.pop() {
            let idx = slot as usize;
            self.live[idx] = true;
            return MarkerHandle::new(slot, self.generations[idx]);
        }
        let slot = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        MarkerHandle::new(slot, 0)
    }

    /// Frees `handle`. Returns `false` if it was already freed or is stale.
    pub fn release(&mut self, handle: MarkerHandle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        let idx = handle.slot as usize;
        self.live[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free.push(handle.slot);
        true
    }

    pub fn is_live(&self, handle: MarkerHandle) -> bool {
        let idx = handle.slot as usize;
        self.live.get(idx).copied().unwrap_or(false)
            && self.generations.get(idx) == Some(&handle.generation)
    }

    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|l| **l).count()
    }
}
