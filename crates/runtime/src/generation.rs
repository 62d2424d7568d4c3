use std::cell::Cell;

/// Tag stamped on one amenity refresh.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic refresh counter.
///
/// Lives on the single event-loop thread (hence `Cell`), shared by the
/// coordinator and its in-flight tasks. Only the response carrying the
/// latest issued generation may touch the marker registry.
#[derive(Debug, Default)]
pub struct FetchGeneration {
    current: Cell<u64>,
}

impl FetchGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next generation. The first call returns `Generation(1)`.
    pub fn advance(&self) -> Generation {
        let next = self.current.get() + 1;
        self.current.set(next);
        Generation(next)
    }

    /// The most recently issued generation (`Generation(0)` before any refresh).
    pub fn current(&self) -> Generation {
        Generation(self.current.get())
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current.get() == generation.0
    }
}
