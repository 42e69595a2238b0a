// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2025 William Bro-Jørgensen
// Copyright (c) 2020 Guillaume Fraux and contributors
//
// See LICENSE at the project root for full text.

use crate::atom_table::AtomTable;
use crate::sim_box::SimBox;

/// In-memory structural representation of one configuration: the box plus a
/// fully materialized per-atom table, with no timestep and no custom data.
///
/// This is the boundary where per-atom data becomes editable: export a
/// snapshot with [`crate::snapshot::Snapshot::to_system`], build a
/// replacement [`AtomTable`], and reimport with
/// [`crate::snapshot::Snapshot::from_system`]. Snapshots themselves never
/// expose their columns for mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    pub sim_box: SimBox,
    pub atoms: AtomTable,
}

impl System {
    pub fn new(sim_box: SimBox, atoms: AtomTable) -> Self {
        System { sim_box, atoms }
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.n_atoms()
    }

    pub(crate) fn into_parts(self) -> (SimBox, AtomTable) {
        (self.sim_box, self.atoms)
    }
}
