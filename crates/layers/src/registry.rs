use std::collections::BTreeMap;

use foundation::{LatLon, MarkerHandle};
use streaming::ReportRecord;
use tracing::{trace, warn};

use crate::classifier::AmenityMarkerDescriptor;
use crate::layer::MarkerCategory;
use crate::marker::MarkerDescriptor;
use crate::surface::MapSurface;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{found} marker cannot be placed in the {expected} category")]
    CategoryMismatch {
        expected: MarkerCategory,
        found: MarkerCategory,
    },
    #[error("{category} category holds at most {max} marker(s), got {requested}")]
    CapacityExceeded {
        category: MarkerCategory,
        max: usize,
        requested: usize,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    handle: MarkerHandle,
    descriptor: MarkerDescriptor,
}

/// Single source of truth for what is on the map.
///
/// Each category maps to an ordered list of live marker handles, one per
/// rendered entity. Every operation validates its input first and then
/// applies fully, so a failed call leaves both the registry and the surface
/// untouched. Each successful mutation bumps [`revision`](Self::revision)
/// exactly once.
#[derive(Debug)]
pub struct MarkerRegistry<S> {
    surface: S,
    entries: BTreeMap<MarkerCategory, Vec<Entry>>,
    revision: u64,
}

impl<S: MapSurface> MarkerRegistry<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            entries: BTreeMap::new(),
            revision: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self, category: MarkerCategory) -> usize {
        self.entries.get(&category).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, category: MarkerCategory) -> bool {
        self.len(category) == 0
    }

    pub fn total_len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn descriptors(&self, category: MarkerCategory) -> impl Iterator<Item = &MarkerDescriptor> {
        self.entries
            .get(&category)
            .into_iter()
            .flatten()
            .map(|e| &e.descriptor)
    }

    pub fn handles(&self, category: MarkerCategory) -> Vec<MarkerHandle> {
        self.entries
            .get(&category)
            .into_iter()
            .flatten()
            .map(|e| e.handle)
            .collect()
    }

    /// Swaps the whole contents of `category` for `descriptors`.
    ///
    /// Old markers are taken off the surface before the new ones are drawn;
    /// the caller observes a single transition.
    pub fn replace_category(
        &mut self,
        category: MarkerCategory,
        descriptors: Vec<MarkerDescriptor>,
    ) -> Result<Vec<MarkerHandle>, RegistryError> {
        for d in &descriptors {
            check_category(category, d)?;
        }
        if let Some(max) = category.capacity()
            && descriptors.len() > max
        {
            return Err(RegistryError::CapacityExceeded {
                category,
                max,
                requested: descriptors.len(),
            });
        }
        Ok(self.replace_checked(category, descriptors))
    }

    /// Adds one marker, leaving the rest of the category alone.
    ///
    /// A bounded category that is already full has its oldest marker
    /// replaced, which is how the singleton user pin moves.
    pub fn append(
        &mut self,
        category: MarkerCategory,
        descriptor: MarkerDescriptor,
    ) -> Result<MarkerHandle, RegistryError> {
        check_category(category, &descriptor)?;
        Ok(self.append_checked(category, descriptor))
    }

    pub fn replace_amenities(
        &mut self,
        amenities: Vec<AmenityMarkerDescriptor>,
    ) -> Vec<MarkerHandle> {
        let descriptors = amenities.into_iter().map(MarkerDescriptor::from).collect();
        self.replace_checked(MarkerCategory::Amenity, descriptors)
    }

    pub fn append_report(&mut self, report: ReportRecord) -> MarkerHandle {
        self.append_checked(MarkerCategory::Report, report.into())
    }

    /// Places the user pin, replacing the previous one if any.
    pub fn place_user(&mut self, position: LatLon) -> MarkerHandle {
        self.append_checked(MarkerCategory::User, MarkerDescriptor::User { position })
    }

    // Callers guarantee every descriptor belongs to `category` and the
    // capacity holds.
    fn replace_checked(
        &mut self,
        category: MarkerCategory,
        descriptors: Vec<MarkerDescriptor>,
    ) -> Vec<MarkerHandle> {
        let removed = self.remove_all(category);
        let entries: Vec<Entry> = descriptors
            .into_iter()
            .map(|descriptor| Entry {
                handle: self.surface.add_marker(descriptor.render()),
                descriptor,
            })
            .collect();
        let handles = entries.iter().map(|e| e.handle).collect();
        trace!(%category, removed, added = entries.len(), "replaced category");
        self.entries.insert(category, entries);
        self.revision += 1;
        handles
    }

    fn append_checked(
        &mut self,
        category: MarkerCategory,
        descriptor: MarkerDescriptor,
    ) -> MarkerHandle {
        let list = self.entries.entry(category).or_default();
        if let Some(max) = category.capacity() {
            while !list.is_empty() && list.len() >= max {
                let evicted = list.remove(0);
                if !self.surface.remove_marker(evicted.handle) {
                    warn!(%category, handle = ?evicted.handle, "marker was already off the surface");
                }
            }
        }

        let handle = self.surface.add_marker(descriptor.render());
        list.push(Entry { handle, descriptor });
        self.revision += 1;
        handle
    }

    /// Removes every marker in `category`. Returns how many were removed.
    pub fn clear_category(&mut self, category: MarkerCategory) -> usize {
        let removed = self.remove_all(category);
        if removed > 0 {
            self.revision += 1;
        }
        removed
    }

    /// Releases every entry in every category.
    pub fn clear_all(&mut self) -> usize {
        MarkerCategory::ALL
            .iter()
            .map(|c| self.clear_category(*c))
            .sum()
    }

    fn remove_all(&mut self, category: MarkerCategory) -> usize {
        let Some(old) = self.entries.remove(&category) else {
            return 0;
        };
        for entry in &old {
            if !self.surface.remove_marker(entry.handle) {
                warn!(%category, handle = ?entry.handle, "marker was already off the surface");
            }
        }
        old.len()
    }
}

fn check_category(expected: MarkerCategory, d: &MarkerDescriptor) -> Result<(), RegistryError> {
    let found = d.category();
    if found != expected {
        return Err(RegistryError::CategoryMismatch { expected, found });
    }
    Ok(())
}
