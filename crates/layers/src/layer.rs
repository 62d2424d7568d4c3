/// Marker categories. Each is reconciled independently by the registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerCategory {
    Amenity,
    Report,
    /// The "you are here" pin.
    User,
}

impl MarkerCategory {
    pub const ALL: [MarkerCategory; 3] = [Self::Amenity, Self::Report, Self::User];

    /// Maximum live markers, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Self::User => Some(1),
            Self::Amenity | Self::Report => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amenity => "amenity",
            Self::Report => "report",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for MarkerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
