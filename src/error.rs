use crate::field::FieldId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field type `{0}`")]
pub(crate) struct UnknownFieldType(pub(crate) String);

#[derive(Debug, Error)]
pub(crate) enum SnapshotError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("not a valid form snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("snapshot contains field id `{0}` more than once")]
    DuplicateId(FieldId),
}

#[derive(Debug, Error)]
pub(crate) enum ExportError {
    #[error("export directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
