use std::collections::BTreeSet;
use std::path::Path;

use crate::archive::ArchiveHandle;
use crate::error::ArchiveResult;
use crate::utils::is_equal;

/// 头部数据的变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderTransition {
    /// 新旧头部数据相同（包括都不存在）
    Unchanged,
    /// 新的头部数据；空序列表示删除头部数据
    Explicit(Vec<u8>),
}

impl HeaderTransition {
    pub fn is_changed(&self) -> bool {
        matches!(self, HeaderTransition::Explicit(_))
    }
}

/// 两个归档之间的差异
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub replaced: BTreeSet<String>,
    pub header: HeaderTransition,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.replaced.is_empty()
            && !self.header.is_changed()
    }

    pub fn summary(&self) -> String {
        format!(
            "新增: {} 个条目, 删除: {} 个条目, 替换: {} 个条目{}",
            self.added.len(),
            self.removed.len(),
            self.replaced.len(),
            if self.header.is_changed() {
                ", 头部数据已变化"
            } else {
                ""
            }
        )
    }
}

/// 比较两个归档并返回差异
///
/// 只比较 CRC-32：校验值相同的条目视为未变化。
pub fn compute_changes(old: &ArchiveHandle, new: &ArchiveHandle) -> ChangeSet {
    let mut added = BTreeSet::new();
    let mut replaced = BTreeSet::new();

    // 检查新增和替换的条目
    for name in new.names() {
        match old.checksum(name) {
            Some(old_crc) if Some(old_crc) != new.checksum(name) => {
                replaced.insert(name.to_string());
            }
            Some(_) => {}
            None => {
                added.insert(name.to_string());
            }
        }
    }

    // 检查删除的条目
    let removed = old
        .names()
        .filter(|name| !new.contains(name))
        .map(str::to_string)
        .collect();

    let header = if is_equal(old.header_data(), new.header_data()) {
        HeaderTransition::Unchanged
    } else {
        HeaderTransition::Explicit(new.header_data().unwrap_or_default().to_vec())
    };

    ChangeSet {
        added,
        removed,
        replaced,
        header,
    }
}

/// 打开两个归档文件并比较
pub fn compare_archives(old_path: &Path, new_path: &Path) -> ArchiveResult<ChangeSet> {
    let old = ArchiveHandle::open(old_path)?;
    let new = ArchiveHandle::open(new_path)?;
    Ok(compute_changes(&old, &new))
}
