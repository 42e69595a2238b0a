use crate::error::DumpError;
use crate::snapshot::Snapshot;
use crate::writer;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Capability interface for an interactive visualization window.
///
/// Backends consume a dump file on disk, so the core stays independent of
/// any particular rendering stack; a backend is handed in per call and may
/// simply be absent.
pub trait RenderBackend {
    fn render(&self, path: &Path) -> Result<(), DumpError>;
}

/// Render `snapshot` with `backend`, if one is present.
///
/// The snapshot is written to a temporary dump file whose path is handed to
/// the backend; the file is removed again when rendering returns. Without a
/// backend this fails with [`DumpError::VisualizationUnavailable`] before
/// touching the snapshot.
pub fn render_snapshot(
    snapshot: &Snapshot,
    backend: Option<&dyn RenderBackend>,
) -> Result<(), DumpError> {
    let backend = backend.ok_or(DumpError::VisualizationUnavailable)?;

    let file = NamedTempFile::new()?;
    let mut buffer = BufWriter::new(file.as_file());
    writer::write_snapshot(&mut buffer, snapshot)?;
    buffer.flush()?;
    drop(buffer);

    backend.render(file.path())
}
