// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2025 William Bro-Jørgensen
// Copyright (c) 2020 Guillaume Fraux and contributors
//
// See LICENSE at the project root for full text.

use crate::error::DumpError;
use crate::property::{Properties, Property};
use crate::sim_box::{Boundary, SimBox};
use log::{debug, warn};
use nalgebra::{Matrix3x2, Vector3};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub(crate) const ITEM_PREFIX: &str = "ITEM: ";

/// Everything known about one snapshot block after the header-only scan:
/// the parsed header fields plus the byte offset where the per-atom rows
/// begin. Entries are immutable once scanned.
#[derive(Debug, Clone)]
pub struct SnapshotHeader {
    /// Index of the block in its file, in file order.
    pub block: usize,
    pub timestep: i64,
    pub n_atoms: usize,
    pub sim_box: SimBox,
    pub custom: Properties,
    /// Declared per-atom column schema, in file order.
    pub columns: Vec<String>,
    /// Byte offset of the first per-atom row.
    pub atoms_offset: u64,
}

/// Scan a dump file in a single forward pass, parsing only header lines and
/// recording where each block's per-atom rows start. The per-atom region is
/// skipped row by row without parsing, so the memory footprint does not
/// depend on the atom count.
///
/// Headers are returned in file order; duplicate timesteps are kept as-is.
/// The file handle is released before this function returns.
///
/// # Errors
///
/// `MalformedHeader` if a required header field is missing or does not
/// parse, `TruncatedFile` if the file ends before the declared atom rows
/// are present.
pub fn scan(path: &Path) -> Result<Vec<SnapshotHeader>, DumpError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut headers: Vec<SnapshotHeader> = Vec::new();
    let mut offset: u64 = 0;
    let mut line = String::new();

    // Header fields of the block currently being assembled.
    let mut timestep: Option<i64> = None;
    let mut n_atoms: Option<usize> = None;
    let mut sim_box: Option<SimBox> = None;
    let mut custom = Properties::new();

    loop {
        line.clear();
        let item_offset = offset;
        let bytes = reader.read_line(&mut line)?;
        if bytes == 0 {
            let mid_header =
                timestep.is_some() || n_atoms.is_some() || sim_box.is_some() || !custom.is_empty();
            if mid_header {
                return Err(DumpError::MalformedHeader {
                    offset,
                    reason: "file ends inside a snapshot header".to_string(),
                });
            }
            break;
        }
        offset += bytes as u64;

        let item = match line.strip_prefix(ITEM_PREFIX) {
            Some(rest) => rest.trim_end(),
            None => {
                return Err(DumpError::MalformedHeader {
                    offset: item_offset,
                    reason: format!("expected an 'ITEM:' line, got '{}'", line.trim_end()),
                });
            }
        };
        let words: Vec<&str> = item.split_whitespace().collect();

        if words.first() == Some(&"TIMESTEP") {
            let (value, value_offset) = read_value_line(&mut reader, &mut offset)?;
            let parsed = value.trim().parse::<i64>().map_err(|_| {
                DumpError::MalformedHeader {
                    offset: value_offset,
                    reason: format!("invalid timestep '{}'", value.trim()),
                }
            })?;
            timestep = Some(parsed);
        } else if words.len() >= 3 && words[..3] == ["NUMBER", "OF", "ATOMS"] {
            let (value, value_offset) = read_value_line(&mut reader, &mut offset)?;
            let parsed = value.trim().parse::<usize>().map_err(|_| {
                DumpError::MalformedHeader {
                    offset: value_offset,
                    reason: format!("invalid atom count '{}'", value.trim()),
                }
            })?;
            n_atoms = Some(parsed);
        } else if words.len() >= 2 && words[..2] == ["BOX", "BOUNDS"] {
            sim_box = Some(parse_box(&words[2..], &mut reader, &mut offset, item_offset)?);
        } else if words.first() == Some(&"ATOMS") {
            // ATOMS comes last in a block, so finish the entry here.
            let block = headers.len();
            let timestep = timestep.take().ok_or_else(|| DumpError::MalformedHeader {
                offset: item_offset,
                reason: format!("block {block} has no TIMESTEP item"),
            })?;
            let n_atoms = n_atoms.take().ok_or_else(|| DumpError::MalformedHeader {
                offset: item_offset,
                reason: format!("block {block} has no NUMBER OF ATOMS item"),
            })?;
            let sim_box = sim_box.take().ok_or_else(|| DumpError::MalformedHeader {
                offset: item_offset,
                reason: format!("block {block} has no BOX BOUNDS item"),
            })?;
            let columns: Vec<String> = words[1..].iter().map(|w| w.to_string()).collect();
            if columns.is_empty() {
                return Err(DumpError::MalformedHeader {
                    offset: item_offset,
                    reason: "ATOMS item declares no columns".to_string(),
                });
            }

            let atoms_offset = offset;
            for row in 0..n_atoms {
                line.clear();
                let bytes = reader.read_line(&mut line)?;
                if bytes == 0 {
                    return Err(DumpError::TruncatedFile {
                        block,
                        expected: n_atoms,
                        got: row,
                    });
                }
                offset += bytes as u64;
            }

            headers.push(SnapshotHeader {
                block,
                timestep,
                n_atoms,
                sim_box,
                custom: std::mem::take(&mut custom),
                columns,
                atoms_offset,
            });
        } else {
            // Anything else is a user-defined global item with one value line.
            let (value, value_offset) = read_value_line(&mut reader, &mut offset)?;
            let trimmed = value.trim();
            if trimmed.is_empty() || value.starts_with(ITEM_PREFIX) {
                return Err(DumpError::MalformedHeader {
                    offset: value_offset,
                    reason: format!("missing data for custom item '{item}'"),
                });
            }
            let parsed = if trimmed.split_whitespace().nth(1).is_some() {
                Property::Str(trimmed.to_string())
            } else {
                Property::parse(trimmed)
            };
            custom.insert(item.to_string(), parsed);
        }
    }

    debug!("scanned {} snapshot blocks from {}", headers.len(), path.display());
    Ok(headers)
}

/// Read the single data line that follows a header item.
fn read_value_line(
    reader: &mut BufReader<File>,
    offset: &mut u64,
) -> Result<(String, u64), DumpError> {
    let value_offset = *offset;
    let mut line = String::new();
    let bytes = reader.read_line(&mut line)?;
    if bytes == 0 {
        return Err(DumpError::MalformedHeader {
            offset: value_offset,
            reason: "unexpected end of file inside a snapshot header".to_string(),
        });
    }
    *offset += bytes as u64;
    Ok((line, value_offset))
}

/// Parse the `BOX BOUNDS` item and its three bound lines.
///
/// The last three words of the item line are the boundary codes; the cell is
/// triclinic exactly when the bound lines carry a third value.
fn parse_box(
    extra: &[&str],
    reader: &mut BufReader<File>,
    offset: &mut u64,
    item_offset: u64,
) -> Result<SimBox, DumpError> {
    if extra.len() < 3 {
        return Err(DumpError::MalformedHeader {
            offset: item_offset,
            reason: "BOX BOUNDS item is missing boundary codes".to_string(),
        });
    }
    let labels = &extra[..extra.len() - 3];
    if !labels.is_empty() && labels != ["xy", "xz", "yz"] {
        warn!("unexpected tokens {labels:?} in BOX BOUNDS item, ignoring");
    }

    let mut bc = [[Boundary::Periodic; 2]; 3];
    for (axis, word) in extra[extra.len() - 3..].iter().enumerate() {
        let mut codes = word.chars();
        let pair = (codes.next(), codes.next(), codes.next());
        let (lo, hi) = match pair {
            (Some(lo), Some(hi), None) => (Boundary::from_code(lo), Boundary::from_code(hi)),
            _ => (None, None),
        };
        match (lo, hi) {
            (Some(lo), Some(hi)) => bc[axis] = [lo, hi],
            _ => {
                return Err(DumpError::MalformedHeader {
                    offset: item_offset,
                    reason: format!("invalid boundary code '{word}'"),
                });
            }
        }
    }

    let mut bounds = Matrix3x2::zeros();
    let mut tilt = [0.0; 3];
    let mut triclinic: Option<bool> = None;
    for axis in 0..3 {
        let (value, value_offset) = read_value_line(reader, offset)?;
        let numbers: Result<Vec<f64>, _> = value
            .split_whitespace()
            .map(fast_float::parse::<f64, _>)
            .collect();
        let numbers = numbers.map_err(|_| DumpError::MalformedHeader {
            offset: value_offset,
            reason: format!("invalid box bound line '{}'", value.trim()),
        })?;
        let has_tilt = match numbers.len() {
            2 => false,
            3 => true,
            count => {
                return Err(DumpError::MalformedHeader {
                    offset: value_offset,
                    reason: format!("box bound line has {count} values, expected 2 or 3"),
                });
            }
        };
        if *triclinic.get_or_insert(has_tilt) != has_tilt {
            return Err(DumpError::MalformedHeader {
                offset: value_offset,
                reason: "box bound lines disagree on tilt factors".to_string(),
            });
        }
        if numbers[0] > numbers[1] {
            return Err(DumpError::MalformedHeader {
                offset: value_offset,
                reason: format!("box bounds are inverted: {} > {}", numbers[0], numbers[1]),
            });
        }
        bounds[(axis, 0)] = numbers[0];
        bounds[(axis, 1)] = numbers[1];
        if has_tilt {
            tilt[axis] = numbers[2];
        }
    }

    let tilt = if triclinic == Some(true) {
        Some(Vector3::new(tilt[0], tilt[1], tilt[2]))
    } else {
        None
    };
    Ok(SimBox::new(bounds, tilt, bc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn scan_small_file() {
        let path = Path::new("./src/tests-data/lammpstrj/small.lammpstrj");
        let headers = scan(path).unwrap();
        assert_eq!(headers.len(), 2);

        let first = &headers[0];
        assert_eq!(first.block, 0);
        assert_eq!(first.timestep, 0);
        assert_eq!(first.n_atoms, 4);
        assert_eq!(first.columns, vec!["id", "type", "x", "y", "z"]);
        assert_approx_eq!(first.sim_box.lx(), 10.0);
        assert!(!first.sim_box.is_triclinic());

        let second = &headers[1];
        assert_eq!(second.block, 1);
        assert_eq!(second.timestep, 100);
        assert!(second.atoms_offset > first.atoms_offset);
    }

    #[test]
    fn scan_parses_custom_items() {
        let path = Path::new("./src/tests-data/lammpstrj/small.lammpstrj");
        let headers = scan(path).unwrap();
        let custom = &headers[0].custom;

        assert_approx_eq!(custom.get("ENERGY").unwrap().expect_float(), -3.5);
        assert_eq!(custom.get("STEPS DONE").unwrap().expect_int(), 42);
        assert_eq!(custom.get("RUN NAME").unwrap().expect_str(), "quench");

        assert_approx_eq!(
            headers[1].custom.get("ENERGY").unwrap().expect_float(),
            -4.25
        );
    }

    #[test]
    fn scan_triclinic_box() {
        let path = Path::new("./src/tests-data/lammpstrj/triclinic.lammpstrj");
        let headers = scan(path).unwrap();
        assert_eq!(headers.len(), 1);

        let sim_box = &headers[0].sim_box;
        assert!(sim_box.is_triclinic());
        assert_approx_eq!(sim_box.xy(), 1.5);
        assert_approx_eq!(sim_box.xz(), 0.5);
        assert_approx_eq!(sim_box.yz(), 0.25);
        assert_eq!(sim_box.bc_line(), "pp pp ff");
    }

    #[test]
    fn scan_does_not_read_atom_rows() {
        // The offsets must point at the first atom row of each block.
        let path = Path::new("./src/tests-data/lammpstrj/small.lammpstrj");
        let content = std::fs::read_to_string(path).unwrap();
        let headers = scan(path).unwrap();
        let first_row = &content[headers[0].atoms_offset as usize..];
        assert!(first_row.starts_with("1 1 0.5"));
    }

    #[test]
    fn truncated_file() {
        let path = Path::new("./src/tests-data/lammpstrj/bad/truncated.lammpstrj");
        match scan(path) {
            Err(DumpError::TruncatedFile {
                block,
                expected,
                got,
            }) => {
                assert_eq!(block, 0);
                assert_eq!(expected, 10);
                assert_eq!(got, 3);
            }
            other => panic!("expected TruncatedFile, got {other:?}"),
        }
    }

    #[test]
    fn missing_timestep() {
        let path = Path::new("./src/tests-data/lammpstrj/bad/missing_timestep.lammpstrj");
        match scan(path) {
            Err(DumpError::MalformedHeader { reason, .. }) => {
                assert!(reason.contains("TIMESTEP"), "{reason}");
            }
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn not_a_dump() {
        let path = Path::new("./src/tests-data/lammpstrj/bad/not_a_dump.lammpstrj");
        match scan(path) {
            Err(DumpError::MalformedHeader { offset, reason }) => {
                assert_eq!(offset, 0);
                assert!(reason.contains("ITEM:"), "{reason}");
            }
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn multiline_custom_item() {
        let path = Path::new("./src/tests-data/lammpstrj/bad/multiline_custom.lammpstrj");
        assert!(matches!(
            scan(path),
            Err(DumpError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn inverted_bounds() {
        let path = Path::new("./src/tests-data/lammpstrj/bad/inverted_bounds.lammpstrj");
        match scan(path) {
            Err(DumpError::MalformedHeader { reason, .. }) => {
                assert!(reason.contains("inverted"), "{reason}");
            }
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_is_empty_scan() {
        let path = Path::new("./src/tests-data/lammpstrj/empty.lammpstrj");
        let headers = scan(path).unwrap();
        assert!(headers.is_empty());
    }
}
