// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2025 William Bro-Jørgensen
// Copyright (c) 2020 Guillaume Fraux and contributors
//
// See LICENSE at the project root for full text.

use crate::error::DumpError;
use crate::property::format_float;
use crate::sim_box::SimBox;
use crate::snapshot::Snapshot;
use std::io::Write;

/// Serialize one snapshot block in the dump format: timestep, atom count,
/// custom items, box, then the per-atom rows. The per-atom table is
/// materialized first, so a load failure surfaces before anything of this
/// block reaches the writer.
pub fn write_snapshot<W: Write>(writer: &mut W, snapshot: &Snapshot) -> Result<(), DumpError> {
    let table = snapshot.atoms()?;

    writeln!(writer, "ITEM: TIMESTEP")?;
    writeln!(writer, "{}", snapshot.timestep)?;
    writeln!(writer, "ITEM: NUMBER OF ATOMS")?;
    writeln!(writer, "{}", snapshot.n_atoms())?;
    for (key, value) in &snapshot.custom {
        writeln!(writer, "ITEM: {key}")?;
        writeln!(writer, "{value}")?;
    }
    write_box(writer, &snapshot.sim_box)?;

    writeln!(writer, "ITEM: ATOMS {}", table.names().join(" "))?;
    for row in 0..table.n_atoms() {
        let fields: Vec<String> = table.iter().map(|(_, column)| column.token(row)).collect();
        writeln!(writer, "{}", fields.join(" "))?;
    }
    Ok(())
}

fn write_box<W: Write>(writer: &mut W, sim_box: &SimBox) -> Result<(), DumpError> {
    if sim_box.is_triclinic() {
        writeln!(writer, "ITEM: BOX BOUNDS xy xz yz {}", sim_box.bc_line())?;
    } else {
        writeln!(writer, "ITEM: BOX BOUNDS {}", sim_box.bc_line())?;
    }
    for axis in 0..3 {
        let lo = format_float(sim_box.bounds[(axis, 0)]);
        let hi = format_float(sim_box.bounds[(axis, 1)]);
        match sim_box.tilt {
            Some(tilt) => writeln!(writer, "{lo} {hi} {}", format_float(tilt[axis]))?,
            None => writeln!(writer, "{lo} {hi}")?,
        }
    }
    Ok(())
}
