use std::fmt::{self, Display, Formatter};
use std::path::Path;

use super::artifact::{IntegrityStatus, PatchArtifact};
use super::diff::{ChangeSet, HeaderTransition};
use crate::error::ArchiveResult;
use crate::utils::size_to_string;

/// 读取补丁包以供查看，不做校验也不应用
pub fn show_patch(patch_path: &Path) -> ArchiveResult<PatchArtifact> {
    PatchArtifact::read(patch_path)
}

/// 两个归档之间差异的文字报告
pub struct DiffReport<'a> {
    pub old_name: &'a str,
    pub new_name: &'a str,
    pub changes: &'a ChangeSet,
    pub verbose: bool,
}

impl Display for DiffReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let changes = self.changes;
        if changes.is_empty() {
            return write!(f, "No changes from {} to {}", self.old_name, self.new_name);
        }

        write!(f, "Changes from {} to {}:", self.old_name, self.new_name)?;
        if changes.header.is_changed() {
            write!(f, "\nNew header data (before start of zip)")?;
        }
        for (label, names) in [
            ("Added", &changes.added),
            ("Replaced", &changes.replaced),
            ("Removed", &changes.removed),
        ] {
            if names.is_empty() {
                continue;
            }
            write!(f, "\n{} {}", label, names.len())?;
            if self.verbose {
                write!(f, ":")?;
                for name in names {
                    write!(f, "\n - {}", name)?;
                }
            }
        }
        Ok(())
    }
}

/// 补丁包内容的文字报告
pub struct PatchReport<'a>(pub &'a PatchArtifact);

impl Display for PatchReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let patch = self.0;
        writeln!(f, "Patch file: {}", patch.path().display())?;

        // 显示元数据
        if let Some(metadata) = patch.metadata() {
            writeln!(f)?;
            writeln!(f, "=== Metadata ===")?;
            writeln!(f, "Version: {}", metadata.version)?;
            writeln!(f, "Created at: {}", metadata.created_at)?;
        }

        writeln!(f)?;
        let status = match patch.integrity_status() {
            IntegrityStatus::Valid => "valid",
            IntegrityStatus::Missing => "missing integrity record",
            IntegrityStatus::Mismatch => "CRC mismatch",
        };
        writeln!(f, "Integrity: {}", status)?;

        match patch.header() {
            Ok(HeaderTransition::Unchanged) => writeln!(f, "Header data: unchanged")?,
            Ok(HeaderTransition::Explicit(bytes)) if bytes.is_empty() => {
                writeln!(f, "Header data: removed")?
            }
            Ok(HeaderTransition::Explicit(bytes)) => {
                writeln!(f, "Header data: {}", size_to_string(bytes.len() as u64))?
            }
            Err(e) => writeln!(f, "Header data: {}", e)?,
        }

        if !patch.entries().is_empty() {
            writeln!(f)?;
            writeln!(f, "=== Added or replaced ({}) ===", patch.entries().len())?;
            for (name, content) in patch.entries() {
                writeln!(f, "  + {} ({})", name, size_to_string(content.len() as u64))?;
            }
        }

        if !patch.removed().is_empty() {
            writeln!(f)?;
            writeln!(f, "=== Removed ({}) ===", patch.removed().len())?;
            for name in patch.removed() {
                writeln!(f, "  - {}", name)?;
            }
        }

        if !patch.corrupt().is_empty() {
            writeln!(f)?;
            writeln!(f, "=== Unreadable ({}) ===", patch.corrupt().len())?;
            for name in patch.corrupt() {
                writeln!(f, "  ! {}", name)?;
            }
        }

        Ok(())
    }
}
