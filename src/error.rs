use thiserror::Error;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("malformed header at byte {offset}: {reason}")]
    MalformedHeader { offset: u64, reason: String },
    #[error("truncated file in block {block}: expected {expected} atom rows, got {got}")]
    TruncatedFile {
        block: usize,
        expected: usize,
        got: usize,
    },
    #[error("bad atom row at byte {offset}: {reason}")]
    ColumnParse { offset: u64, reason: String },
    #[error("bulk assignment expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("no visualization backend available")]
    VisualizationUnavailable,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
