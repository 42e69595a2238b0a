pub mod atom_table;
pub mod error;
pub mod property;
pub mod sim_box;
pub mod snapshot;
pub mod snapshots;
pub mod source;
pub mod system;
pub mod visualize;
pub mod writer;

use snapshots::Snapshots;
use std::{hint::black_box, path::Path};

/// Read a dump file and return the total number of atoms processed
pub fn read_dump(path: &Path) -> usize {
    let trajectory = Snapshots::from_dump(path).unwrap();
    let mut total_atoms = 0;
    for snapshot in &trajectory {
        total_atoms += snapshot.atoms().unwrap().n_atoms();
    }
    black_box(total_atoms)
}
