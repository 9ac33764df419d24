mod apply;
mod artifact;
mod create;
mod diff;
mod metadata;
mod show;

pub use apply::{apply_patch, apply_to, apply_validated};
pub use artifact::{IntegrityStatus, PatchArtifact, ValidatedPatch};
pub use create::{create_patch, write_patch};
pub use diff::{ChangeSet, HeaderTransition, compare_archives, compute_changes};
pub use metadata::{
    EXPECTED_CRC_FILENAME, HEADER_FILENAME, IntegrityRecord, METADATA_FILENAME, Metadata,
    REMOVED_FILENAME, RESERVED_PREFIX,
};
pub use show::{DiffReport, PatchReport, show_patch};
