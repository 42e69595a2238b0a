use crate::atom_table::AtomTable;
use crate::error::DumpError;
use crate::property::Properties;
use crate::sim_box::SimBox;
use crate::source::SnapshotHeader;
use crate::system::System;
use crate::visualize::{self, RenderBackend};
use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Where a snapshot's per-atom rows come from.
#[derive(Debug, Clone)]
enum AtomData {
    /// Rows still on disk; parsed and cached on first access.
    File {
        path: PathBuf,
        offset: u64,
        block: usize,
        cache: OnceCell<Rc<AtomTable>>,
    },
    /// Rows supplied in memory at construction.
    Memory(Rc<AtomTable>),
}

/// One time-slice of a simulated system: timestep, box, custom global
/// properties, and a handle to the per-atom table.
///
/// The table is loaded from the backing file the first time [`atoms`] is
/// called and stays cached for the snapshot's lifetime; a snapshot that is
/// never asked for its atoms never reads them. Mutating `timestep`,
/// `sim_box` or `custom` does not touch the cache. There is no way to edit
/// the cached table in place: per-atom data changes go through
/// [`Snapshot::to_system`] and [`Snapshot::from_system`].
///
/// Cloning copies the metadata and shares the cached table, which is
/// immutable, so a trajectory sliced many ways still materializes each
/// block at most once.
///
/// [`atoms`]: Snapshot::atoms
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub timestep: i64,
    pub sim_box: SimBox,
    pub custom: Properties,
    columns: Vec<String>,
    n_atoms: usize,
    atom_data: AtomData,
}

impl Snapshot {
    pub(crate) fn from_header(path: &Path, header: SnapshotHeader) -> Self {
        Snapshot {
            timestep: header.timestep,
            sim_box: header.sim_box,
            custom: header.custom,
            columns: header.columns,
            n_atoms: header.n_atoms,
            atom_data: AtomData::File {
                path: path.to_path_buf(),
                offset: header.atoms_offset,
                block: header.block,
                cache: OnceCell::new(),
            },
        }
    }

    /// Build a snapshot around an in-memory table; no backing file is
    /// involved and the atom data is considered loaded from the start.
    pub fn from_table(
        table: AtomTable,
        timestep: i64,
        sim_box: SimBox,
        custom: Properties,
    ) -> Self {
        Snapshot {
            timestep,
            sim_box,
            custom,
            columns: table.names().to_vec(),
            n_atoms: table.n_atoms(),
            atom_data: AtomData::Memory(Rc::new(table)),
        }
    }

    /// Number of atoms, known from the header without loading any rows.
    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    /// Declared per-atom column names, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the per-atom table has been materialized yet.
    pub fn is_loaded(&self) -> bool {
        match &self.atom_data {
            AtomData::Memory(_) => true,
            AtomData::File { cache, .. } => cache.get().is_some(),
        }
    }

    /// The per-atom table, loading and caching it on first access.
    ///
    /// The backing file is opened for the duration of the load only.
    pub fn atoms(&self) -> Result<&AtomTable, DumpError> {
        match &self.atom_data {
            AtomData::Memory(table) => Ok(table.as_ref()),
            AtomData::File {
                path,
                offset,
                block,
                cache,
            } => {
                if let Some(table) = cache.get() {
                    return Ok(table.as_ref());
                }
                let table = Rc::new(AtomTable::load(
                    path,
                    *offset,
                    &self.columns,
                    self.n_atoms,
                    *block,
                )?);
                Ok(cache.get_or_init(|| table).as_ref())
            }
        }
    }

    /// Export the box and per-atom table as a [`System`], the in-memory
    /// structural representation. Timestep and custom data stay behind.
    pub fn to_system(&self) -> Result<System, DumpError> {
        Ok(System::new(self.sim_box.clone(), self.atoms()?.clone()))
    }

    /// Import a [`System`] as a new snapshot. This is the only way to get
    /// modified per-atom data back into a trajectory.
    pub fn from_system(system: System, timestep: i64, custom: Properties) -> Self {
        let (sim_box, atoms) = system.into_parts();
        Snapshot::from_table(atoms, timestep, sim_box, custom)
    }

    /// Serialize this snapshot as a single dump block, loading the per-atom
    /// table if needed.
    pub fn to_dump(&self) -> Result<String, DumpError> {
        let mut buffer = Vec::new();
        crate::writer::write_snapshot(&mut buffer, self)?;
        Ok(String::from_utf8(buffer).expect("dump output is ASCII"))
    }

    /// Open an interactive view of this snapshot, if a backend is present.
    pub fn render(&self, backend: Option<&dyn RenderBackend>) -> Result<(), DumpError> {
        visualize::render_snapshot(self, backend)
    }
}

impl PartialEq for Snapshot {
    /// Metadata value equality; per-atom tables are compared separately via
    /// [`Snapshot::atoms`] since doing it here would trigger loads.
    fn eq(&self, other: &Self) -> bool {
        self.timestep == other.timestep
            && self.sim_box == other.sim_box
            && self.custom == other.custom
            && self.columns == other.columns
            && self.n_atoms == other.n_atoms
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Timestep: {}", self.timestep)?;
        writeln!(f, "Number of atoms: {}", self.n_atoms)?;
        writeln!(f, "Per-atom data: {}", self.columns.join(" "))?;
        write!(f, "Box:\n{}", self.sim_box)?;
        if !self.custom.is_empty() {
            writeln!(f, "Custom:")?;
            for (key, value) in &self.custom {
                writeln!(f, "  {key}: {value}")?;
            }
        }
        Ok(())
    }
}
