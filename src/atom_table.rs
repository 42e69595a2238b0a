// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2025 William Bro-Jørgensen
// Copyright (c) 2020 Guillaume Fraux and contributors
//
// See LICENSE at the project root for full text.

use crate::error::DumpError;
use crate::property::format_float;
use log::debug;
use phf::phf_set;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Column names that always hold integer identifiers in LAMMPS dumps.
static IDENTIFIER_COLUMNS: phf::Set<&'static str> = phf_set! {
    "id", "mol", "type", "proc", "procp1", "ix", "iy", "iz",
};

/// One typed column of per-atom data.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int(values) => values.len(),
            Column::Float(values) => values.len(),
            Column::Str(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&[i64]> {
        if let Column::Int(ref values) = *self {
            Some(values)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<&[f64]> {
        if let Column::Float(ref values) = *self {
            Some(values)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&[String]> {
        if let Column::Str(ref values) = *self {
            Some(values)
        } else {
            None
        }
    }

    /// Dump token for the value at `row`.
    pub(crate) fn token(&self, row: usize) -> String {
        match self {
            Column::Int(values) => values[row].to_string(),
            Column::Float(values) => format_float(values[row]),
            Column::Str(values) => values[row].clone(),
        }
    }
}

/// Accumulates one column while rows stream in, promoting the storage type
/// as soon as a token stops fitting: Int -> Float -> Str. Identifier columns
/// never promote; a non-integer token there is a format violation.
struct ColumnBuilder {
    name: String,
    identifier: bool,
    data: Column,
}

impl ColumnBuilder {
    fn new(name: &str, capacity: usize) -> Self {
        ColumnBuilder {
            name: name.to_string(),
            identifier: IDENTIFIER_COLUMNS.contains(name),
            data: Column::Int(Vec::with_capacity(capacity)),
        }
    }

    fn push(&mut self, token: &str) -> Result<(), String> {
        match &mut self.data {
            Column::Int(values) => {
                if let Ok(value) = token.parse::<i64>() {
                    values.push(value);
                    return Ok(());
                }
                if self.identifier {
                    return Err(format!(
                        "identifier column '{}' expects an integer, got '{token}'",
                        self.name
                    ));
                }
                if let Ok(value) = fast_float::parse::<f64, _>(token) {
                    let mut floats: Vec<f64> = values.iter().map(|&v| v as f64).collect();
                    floats.push(value);
                    self.data = Column::Float(floats);
                } else {
                    let mut strings: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                    strings.push(token.to_string());
                    self.data = Column::Str(strings);
                }
                Ok(())
            }
            Column::Float(values) => {
                if let Ok(value) = fast_float::parse::<f64, _>(token) {
                    values.push(value);
                } else {
                    let mut strings: Vec<String> =
                        values.iter().map(|&v| format_float(v)).collect();
                    strings.push(token.to_string());
                    self.data = Column::Str(strings);
                }
                Ok(())
            }
            Column::Str(values) => {
                values.push(token.to_string());
                Ok(())
            }
        }
    }
}

/// Column-oriented per-atom data of one snapshot.
///
/// Tables are immutable once constructed. Per-atom data is changed by
/// building a fresh table with [`AtomTable::new`] and reimporting it through
/// [`crate::system::System`], never in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomTable {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl AtomTable {
    /// Build a table from `(name, column)` pairs.
    ///
    /// Every column must hold the same number of atoms; otherwise
    /// `LengthMismatch` is returned and nothing is built.
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self, DumpError> {
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        let mut n_atoms = None;
        for (name, column) in columns {
            match n_atoms {
                None => n_atoms = Some(column.len()),
                Some(expected) if column.len() != expected => {
                    return Err(DumpError::LengthMismatch {
                        expected,
                        got: column.len(),
                    });
                }
                Some(_) => {}
            }
            names.push(name);
            data.push(column);
        }
        Ok(AtomTable {
            names,
            columns: data,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let index = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Read exactly `n_atoms` rows starting at `offset` and parse them into
    /// typed columns following `columns`.
    ///
    /// The file handle lives only for the duration of this call. `block` is
    /// the snapshot's index in its file, used for error reporting.
    pub fn load(
        path: &Path,
        offset: u64,
        columns: &[String],
        n_atoms: usize,
        block: usize,
    ) -> Result<Self, DumpError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;

        let mut builders: Vec<ColumnBuilder> = columns
            .iter()
            .map(|name| ColumnBuilder::new(name, n_atoms))
            .collect();

        let mut line = String::new();
        let mut row_offset = offset;
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

            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != builders.len() {
                return Err(DumpError::ColumnParse {
                    offset: row_offset,
                    reason: format!(
                        "row has {} fields, expected {}",
                        tokens.len(),
                        builders.len()
                    ),
                });
            }
            for (builder, token) in builders.iter_mut().zip(tokens) {
                builder.push(token).map_err(|reason| DumpError::ColumnParse {
                    offset: row_offset,
                    reason,
                })?;
            }
            row_offset += bytes as u64;
        }
        debug!(
            "loaded {} atoms x {} columns from block {block} of {}",
            n_atoms,
            columns.len(),
            path.display()
        );

        let (names, data): (Vec<String>, Vec<Column>) = builders
            .into_iter()
            .map(|builder| (builder.name, builder.data))
            .unzip();
        Ok(AtomTable {
            names,
            columns: data,
        })
    }
}
