use crate::error::DumpError;
use crate::property::Property;
use crate::sim_box::SimBox;
use crate::snapshot::Snapshot;
use crate::source;
use crate::writer;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::{Add, Bound, Index, RangeBounds};
use std::path::Path;
use std::slice::SliceIndex;

/// An ordered group of snapshots. This should be one's main interaction
/// with the crate.
///
/// A `Snapshots` owns its members outright. Indexing borrows (`&snapshots[i]`,
/// `&snapshots[a..b]`); the `extract*` operations return a new owning
/// collection instead. Combining collections with `+` concatenates by
/// cloning the members, so editing one collection never shows up in another
/// (materialized per-atom tables are immutable and shared, not re-read).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshots {
    snapshots: Vec<Snapshot>,
}

impl Snapshots {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        Snapshots { snapshots }
    }

    /// A collection with no snapshots.
    pub fn empty() -> Self {
        Snapshots::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Snapshots {
            snapshots: vec![snapshot],
        }
    }

    /// Scan a dump file and build one lazy snapshot per block.
    ///
    /// Only headers are parsed; per-atom rows stay on disk until a member's
    /// `atoms()` is called.
    ///
    /// # Errors
    ///
    /// Propagates scan failures ([`DumpError::MalformedHeader`],
    /// [`DumpError::TruncatedFile`], [`DumpError::Io`]).
    pub fn from_dump(path: &Path) -> Result<Self, DumpError> {
        let headers = source::scan(path)?;
        let snapshots = headers
            .into_iter()
            .map(|header| Snapshot::from_header(path, header))
            .collect();
        Ok(Snapshots { snapshots })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Snapshot> {
        self.snapshots.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Snapshot> {
        self.snapshots.iter_mut()
    }

    /// Borrowed view of all members, in order.
    pub fn as_slice(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// New owning collection holding clones of the members in `range`.
    ///
    /// The range is clamped, so an out-of-range or empty selection yields
    /// an empty collection rather than an error.
    pub fn extract<R: RangeBounds<usize>>(&self, range: R) -> Snapshots {
        let (start, end) = clamp_range(&range, self.len());
        Snapshots {
            snapshots: self.snapshots[start..end].to_vec(),
        }
    }

    /// Like [`extract`], keeping every `step`-th member of `range`.
    /// A zero step selects nothing.
    ///
    /// [`extract`]: Snapshots::extract
    pub fn extract_stepped<R: RangeBounds<usize>>(&self, range: R, step: usize) -> Snapshots {
        if step == 0 {
            return Snapshots::empty();
        }
        let (start, end) = clamp_range(&range, self.len());
        Snapshots {
            snapshots: self.snapshots[start..end]
                .iter()
                .step_by(step)
                .cloned()
                .collect(),
        }
    }

    /// New owning collection with the member order reversed.
    pub fn reversed(&self) -> Snapshots {
        Snapshots {
            snapshots: self.snapshots.iter().rev().cloned().collect(),
        }
    }

    /// Timesteps of all members, in order.
    pub fn timesteps(&self) -> Vec<i64> {
        self.snapshots.iter().map(|s| s.timestep).collect()
    }

    /// Set every member's timestep to `timestep`.
    pub fn set_timesteps_all(&mut self, timestep: i64) {
        for snapshot in &mut self.snapshots {
            snapshot.timestep = timestep;
        }
    }

    /// Set member timesteps positionally. Nothing is assigned unless
    /// `timesteps` has exactly one value per member.
    pub fn set_timesteps(&mut self, timesteps: &[i64]) -> Result<(), DumpError> {
        self.check_len(timesteps.len())?;
        for (snapshot, &timestep) in self.snapshots.iter_mut().zip(timesteps) {
            snapshot.timestep = timestep;
        }
        Ok(())
    }

    /// Atom counts of all members, in order. Read-only: the count is fixed
    /// once a snapshot exists.
    pub fn n_atoms(&self) -> Vec<usize> {
        self.snapshots.iter().map(Snapshot::n_atoms).collect()
    }

    /// Boxes of all members, in order.
    pub fn boxes(&self) -> Vec<&SimBox> {
        self.snapshots.iter().map(|s| &s.sim_box).collect()
    }

    /// Replace every member's box with a clone of `sim_box`.
    pub fn set_boxes_all(&mut self, sim_box: &SimBox) {
        for snapshot in &mut self.snapshots {
            snapshot.sim_box = sim_box.clone();
        }
    }

    /// Replace member boxes positionally. Nothing is assigned unless
    /// `boxes` has exactly one value per member.
    pub fn set_boxes(&mut self, boxes: &[SimBox]) -> Result<(), DumpError> {
        self.check_len(boxes.len())?;
        for (snapshot, sim_box) in self.snapshots.iter_mut().zip(boxes) {
            snapshot.sim_box = sim_box.clone();
        }
        Ok(())
    }

    /// Apply `f` to every member's box, e.g. to scale all bounds at once.
    pub fn for_each_box<F: FnMut(&mut SimBox)>(&mut self, mut f: F) {
        for snapshot in &mut self.snapshots {
            f(&mut snapshot.sim_box);
        }
    }

    /// Value of the custom key `key` for each member, in order; `None` for
    /// members that do not carry the key.
    pub fn custom_values(&self, key: &str) -> Vec<Option<&Property>> {
        self.snapshots.iter().map(|s| s.custom.get(key)).collect()
    }

    /// Set `key` to a clone of `value` on every member, creating the key
    /// where it is absent.
    pub fn set_custom_all(&mut self, key: &str, value: Property) {
        for snapshot in &mut self.snapshots {
            snapshot.custom.insert(key.to_string(), value.clone());
        }
    }

    /// Set `key` positionally across members. Nothing is assigned unless
    /// `values` has exactly one value per member.
    pub fn set_custom(&mut self, key: &str, values: &[Property]) -> Result<(), DumpError> {
        self.check_len(values.len())?;
        for (snapshot, value) in self.snapshots.iter_mut().zip(values) {
            snapshot.custom.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    /// Write all members to `path` in the dump format, in collection order,
    /// loading any per-atom table that is not cached yet. An existing file
    /// is overwritten.
    ///
    /// # Errors
    ///
    /// Load errors and [`DumpError::Io`] write failures are surfaced as-is;
    /// blocks already written are not rolled back, so the file may hold a
    /// prefix of the collection afterwards.
    pub fn write_dump(&self, path: &Path) -> Result<(), DumpError> {
        let file = File::create(path)?;
        let mut buffer = BufWriter::new(file);
        for snapshot in &self.snapshots {
            writer::write_snapshot(&mut buffer, snapshot)?;
        }
        buffer.flush()?;
        debug!("wrote {} snapshot blocks to {}", self.len(), path.display());
        Ok(())
    }

    fn check_len(&self, got: usize) -> Result<(), DumpError> {
        if got == self.len() {
            Ok(())
        } else {
            Err(DumpError::LengthMismatch {
                expected: self.len(),
                got,
            })
        }
    }
}

fn clamp_range<R: RangeBounds<usize>>(range: &R, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&bound) => bound,
        Bound::Excluded(&bound) => bound.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&bound) => bound.saturating_add(1),
        Bound::Excluded(&bound) => bound,
        Bound::Unbounded => len,
    };
    let start = start.min(len);
    (start, end.min(len).max(start))
}

impl<I: SliceIndex<[Snapshot]>> Index<I> for Snapshots {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.snapshots[index]
    }
}

impl IntoIterator for Snapshots {
    type Item = Snapshot;
    type IntoIter = std::vec::IntoIter<Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshots {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

impl<'a> IntoIterator for &'a mut Snapshots {
    type Item = &'a mut Snapshot;
    type IntoIter = std::slice::IterMut<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter_mut()
    }
}

impl FromIterator<Snapshot> for Snapshots {
    fn from_iter<T: IntoIterator<Item = Snapshot>>(iter: T) -> Self {
        Snapshots {
            snapshots: iter.into_iter().collect(),
        }
    }
}

impl Add<&Snapshots> for &Snapshots {
    type Output = Snapshots;

    /// Concatenation: left members first, then right, duplicates kept.
    fn add(self, rhs: &Snapshots) -> Snapshots {
        let mut snapshots = self.snapshots.clone();
        snapshots.extend(rhs.snapshots.iter().cloned());
        Snapshots { snapshots }
    }
}

impl Add<&Snapshot> for &Snapshots {
    type Output = Snapshots;

    fn add(self, rhs: &Snapshot) -> Snapshots {
        let mut snapshots = self.snapshots.clone();
        snapshots.push(rhs.clone());
        Snapshots { snapshots }
    }
}

impl Add<&Snapshots> for &Snapshot {
    type Output = Snapshots;

    fn add(self, rhs: &Snapshots) -> Snapshots {
        let mut snapshots = Vec::with_capacity(rhs.len() + 1);
        snapshots.push(self.clone());
        snapshots.extend(rhs.snapshots.iter().cloned());
        Snapshots { snapshots }
    }
}
