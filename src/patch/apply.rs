use log::{debug, info};
use std::path::Path;

use super::artifact::{PatchArtifact, ValidatedPatch};
use super::diff::HeaderTransition;
use crate::archive::{ArchiveHandle, write_archive};
use crate::error::ArchiveResult;

/// 应用补丁包：读取 `base_path` 与 `patch_path`，将结果写入 `target_path`
pub fn apply_patch(
    base_path: &Path,
    patch_path: &Path,
    target_path: &Path,
    ignore_validation: bool,
) -> ArchiveResult<()> {
    let base = ArchiveHandle::open(base_path)?;
    let patch = PatchArtifact::read(patch_path)?;
    apply_to(&base, patch, target_path, ignore_validation)
}

/// 校验补丁包后将其应用到 `base`
///
/// 校验失败时不写入任何文件。
pub fn apply_to(
    base: &ArchiveHandle,
    patch: PatchArtifact,
    target_path: &Path,
    ignore_validation: bool,
) -> ArchiveResult<()> {
    info!("正在校验补丁包 {}", patch.path().display());
    let validated = patch.validate(ignore_validation)?;
    apply_validated(base, &validated, target_path)
}

/// 应用已校验的补丁包
pub fn apply_validated(
    base: &ArchiveHandle,
    patch: &ValidatedPatch,
    target_path: &Path,
) -> ArchiveResult<()> {
    let artifact = patch.artifact();
    let mut entries = base.read_all()?;

    // 删除条目
    for name in artifact.removed() {
        if entries.remove(name).is_some() {
            debug!("  - {}", name);
        }
    }

    // 新增和替换条目
    for (name, content) in artifact.entries() {
        let symbol = if entries.contains_key(name) { "*" } else { "+" };
        debug!("  {} {}", symbol, name);
        entries.insert(name.clone(), content.clone());
    }

    let header_data = match patch.header() {
        HeaderTransition::Unchanged => base.header_data(),
        HeaderTransition::Explicit(bytes) if bytes.is_empty() => None,
        HeaderTransition::Explicit(bytes) => Some(bytes.as_slice()),
    };

    info!("正在写入 {}", target_path.display());
    write_archive(target_path, header_data, &entries)?;

    info!("补丁应用完成!");
    Ok(())
}
