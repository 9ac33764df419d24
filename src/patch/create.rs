use log::{debug, info};
use std::collections::BTreeMap;
use std::path::Path;

use super::diff::{ChangeSet, compute_changes};
use super::metadata::{
    EXPECTED_CRC_FILENAME, HEADER_FILENAME, IntegrityRecord, METADATA_FILENAME, Metadata,
    REMOVED_FILENAME, encode_header, encode_removed,
};
use crate::archive::{ArchiveHandle, write_archive};
use crate::error::ArchiveResult;

/// 生成补丁包
pub fn create_patch(old_path: &Path, new_path: &Path, output: &Path) -> ArchiveResult<ChangeSet> {
    info!("正在比较 {} 与 {}", old_path.display(), new_path.display());
    let old = ArchiveHandle::open(old_path)?;
    let new = ArchiveHandle::open(new_path)?;
    let changes = compute_changes(&old, &new);

    write_patch(&new, &changes, output)?;
    Ok(changes)
}

/// 将差异写成补丁包
///
/// 新增和替换的条目以原名称保存，其后是删除列表、头部数据记录、元数据和完整性记录。
pub fn write_patch(new: &ArchiveHandle, changes: &ChangeSet, output: &Path) -> ArchiveResult<()> {
    let mut new_content = new.read_all()?;
    let mut entries = BTreeMap::new();

    for name in changes.added.iter().chain(&changes.replaced) {
        if let Some(content) = new_content.remove(name) {
            debug!("  + {}", name);
            entries.insert(name.clone(), content);
        }
    }
    for name in &changes.removed {
        debug!("  - {}", name);
    }

    entries.insert(REMOVED_FILENAME.to_string(), encode_removed(&changes.removed));
    entries.insert(HEADER_FILENAME.to_string(), encode_header(&changes.header));
    entries.insert(
        METADATA_FILENAME.to_string(),
        Metadata::new(changes).to_bytes(output)?,
    );

    let integrity = IntegrityRecord::compute(&entries);
    entries.insert(EXPECTED_CRC_FILENAME.to_string(), integrity.to_bytes(output)?);

    info!("正在写入补丁包 {}", output.display());
    write_archive(output, None, &entries)?;
    info!("  {}", changes.summary());

    Ok(())
}
