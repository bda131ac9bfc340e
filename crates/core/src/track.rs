use infiniscroll_protocol::{ItemMeasure, ItemRole};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("track has no original items")]
    Empty,
}

/// Which copy of the item sequence a track position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Copies inserted before the originals.
    Leading,
    Original,
    /// Copies appended after the originals.
    Trailing,
}

/// One element of the built track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Index of the original item this slot shows.
    pub source: usize,
    pub region: Region,
    /// Measured width without the gap.
    pub width: f64,
}

impl Slot {
    pub fn role(&self) -> ItemRole {
        match self.region {
            Region::Original => ItemRole::Original,
            Region::Leading | Region::Trailing => ItemRole::Duplicate,
        }
    }
}

/// The circular track: `[leading copies] + [originals] + [trailing copies]`.
///
/// All offset math works in units of one *segment*, the span of a single
/// full copy of the originals (`item_width × original_count`). The track
/// itself is three segments wide.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    slots: Vec<Slot>,
    original_count: usize,
    item_width: f64,
    gap: f64,
}

impl Track {
    /// Build a track from the host's current items.
    ///
    /// Items flagged as duplicates (left over from an earlier build) are
    /// purged first, so building from a built track's own items yields the
    /// same structure again.
    pub fn build(items: &[ItemMeasure], gap: f64) -> Result<Self, TrackError> {
        let originals: Vec<f64> = items
            .iter()
            .filter(|item| item.role == ItemRole::Original)
            .map(|item| item.width)
            .collect();
        if originals.is_empty() {
            return Err(TrackError::Empty);
        }

        let mut slots = Vec::with_capacity(originals.len() * 3);
        for region in [Region::Leading, Region::Original, Region::Trailing] {
            slots.extend(
                originals
                    .iter()
                    .enumerate()
                    .map(|(source, &width)| Slot {
                        source,
                        region,
                        width,
                    }),
            );
        }

        // The first element of the built track is the leading copy of item 0.
        let item_width = measure(slots[0].width, gap);
        Ok(Self {
            slots,
            original_count: originals.len(),
            item_width,
            gap,
        })
    }

    /// Build again from this track's own items.
    pub fn rebuild(&self) -> Result<Self, TrackError> {
        Self::build(&self.measures(), self.gap)
    }

    /// The track's items in order, as a host would report them.
    pub fn measures(&self) -> Vec<ItemMeasure> {
        self.slots
            .iter()
            .map(|slot| ItemMeasure {
                width: slot.width,
                role: slot.role(),
            })
            .collect()
    }

    /// Replace the item width after a layout change. `first_width` is the
    /// first track element's rendered width without the gap.
    pub fn remeasure(&mut self, first_width: f64) {
        self.item_width = measure(first_width, self.gap);
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn original_count(&self) -> usize {
        self.original_count
    }

    /// Size of each duplicate set.
    pub fn duplicate_count(&self) -> usize {
        self.original_count
    }

    /// Width of one item including the gap; zero while not yet laid out.
    pub fn item_width(&self) -> f64 {
        self.item_width
    }

    pub fn is_measured(&self) -> bool {
        self.item_width > 0.0
    }

    pub fn segment_width(&self) -> f64 {
        self.item_width * self.original_count as f64
    }

    /// Where a freshly built track is parked: the start of the originals.
    pub fn park_offset(&self) -> f64 {
        self.segment_width()
    }

    /// Original indices to copy in front of the originals, in order.
    pub fn leading(&self) -> Vec<usize> {
        self.sources_in(Region::Leading)
    }

    /// Original indices to copy after the originals, in order.
    pub fn trailing(&self) -> Vec<usize> {
        self.sources_in(Region::Trailing)
    }

    fn sources_in(&self, region: Region) -> Vec<usize> {
        self.slots
            .iter()
            .filter(|slot| slot.region == region)
            .map(|slot| slot.source)
            .collect()
    }

    /// Index of the original item whose leading edge is at or before
    /// `offset`. Offsets outside the track wrap around.
    pub fn logical_index(&self, offset: f64) -> Option<usize> {
        if !self.is_measured() || !offset.is_finite() {
            return None;
        }
        let slot = (offset / self.item_width).floor() as i64;
        Some(slot.rem_euclid(self.original_count as i64) as usize)
    }

    /// Which copy of the items `offset` falls in, or `None` outside the
    /// track (or before measurement).
    pub fn region_at(&self, offset: f64) -> Option<Region> {
        let segment = self.segment_width();
        if segment <= 0.0 || !(0.0..3.0 * segment).contains(&offset) {
            return None;
        }
        Some(if offset < segment {
            Region::Leading
        } else if offset < 2.0 * segment {
            Region::Original
        } else {
            Region::Trailing
        })
    }
}

/// Item width including the gap. Elements that have not been laid out yet
/// report zero width; that stays zero instead of collapsing to the gap.
fn measure(width: f64, gap: f64) -> f64 {
    if width.is_finite() && width > 0.0 {
        width + gap
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn originals(n: usize, width: f64) -> Vec<ItemMeasure> {
        (0..n).map(|_| ItemMeasure::original(width)).collect()
    }

    #[test]
    fn build_surrounds_originals_with_copies() {
        let track = Track::build(&originals(4, 80.0), 20.0).unwrap();
        assert_eq!(track.len(), 12);
        assert_eq!(track.original_count(), 4);
        assert_eq!(track.duplicate_count(), 4);
        assert_eq!(track.item_width(), 100.0);
        assert_eq!(track.segment_width(), 400.0);
        assert_eq!(track.park_offset(), 400.0);
        assert_eq!(track.leading(), vec![0, 1, 2, 3]);
        assert_eq!(track.trailing(), vec![0, 1, 2, 3]);

        let roles: Vec<ItemRole> = track.slots().iter().map(Slot::role).collect();
        assert!(roles[..4].iter().all(|r| *r == ItemRole::Duplicate));
        assert!(roles[4..8].iter().all(|r| *r == ItemRole::Original));
        assert!(roles[8..].iter().all(|r| *r == ItemRole::Duplicate));
    }

    #[test]
    fn stale_duplicates_are_purged() {
        let mut items = vec![ItemMeasure::duplicate(80.0); 3];
        items.extend(originals(3, 80.0));
        items.extend(vec![ItemMeasure::duplicate(80.0); 3]);
        items.push(ItemMeasure::duplicate(80.0));

        let track = Track::build(&items, 20.0).unwrap();
        assert_eq!(track.len(), 9);
        assert_eq!(track.original_count(), 3);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let first = Track::build(&originals(5, 60.0), 20.0).unwrap();
        let second = first.rebuild().unwrap();
        let third = second.rebuild().unwrap();
        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(third.len(), 15);
    }

    #[test]
    fn empty_or_all_duplicates_is_rejected() {
        assert_eq!(Track::build(&[], 20.0), Err(TrackError::Empty));
        assert_eq!(
            Track::build(&[ItemMeasure::duplicate(80.0)], 20.0),
            Err(TrackError::Empty)
        );
    }

    #[test]
    fn unlaid_items_measure_zero() {
        let track = Track::build(&originals(4, 0.0), 20.0).unwrap();
        assert_eq!(track.item_width(), 0.0);
        assert_eq!(track.segment_width(), 0.0);
        assert!(!track.is_measured());
        assert_eq!(track.logical_index(120.0), None);
        assert_eq!(track.region_at(120.0), None);
    }

    #[test]
    fn remeasure_updates_segment() {
        let mut track = Track::build(&originals(4, 0.0), 20.0).unwrap();
        track.remeasure(130.0);
        assert_eq!(track.item_width(), 150.0);
        assert_eq!(track.segment_width(), 600.0);
    }

    #[test]
    fn logical_index_wraps_across_copies() {
        let track = Track::build(&originals(4, 80.0), 20.0).unwrap();
        assert_eq!(track.logical_index(0.0), Some(0));
        assert_eq!(track.logical_index(399.0), Some(3));
        assert_eq!(track.logical_index(400.0), Some(0));
        assert_eq!(track.logical_index(801.0), Some(0));
        assert_eq!(track.logical_index(-1.0), Some(3));
    }

    #[test]
    fn regions() {
        let track = Track::build(&originals(4, 80.0), 20.0).unwrap();
        assert_eq!(track.region_at(0.0), Some(Region::Leading));
        assert_eq!(track.region_at(400.0), Some(Region::Original));
        assert_eq!(track.region_at(799.5), Some(Region::Original));
        assert_eq!(track.region_at(800.0), Some(Region::Trailing));
        assert_eq!(track.region_at(1200.0), None);
        assert_eq!(track.region_at(-0.5), None);
    }
}
