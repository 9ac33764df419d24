use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;

use super::diff::{ChangeSet, HeaderTransition};
use crate::error::{ArchiveError, ArchiveResult};
use crate::utils::{DualHasher, as_string};

/// 补丁包内保留条目的目录前缀
pub const RESERVED_PREFIX: &str = ".zipdiff/";
/// 被删除条目的名称列表，每行一个
pub const REMOVED_FILENAME: &str = ".zipdiff/removed";
/// 头部数据变化记录
pub const HEADER_FILENAME: &str = ".zipdiff/header";
/// 补丁包元数据
pub const METADATA_FILENAME: &str = ".zipdiff/metadata.toml";
/// 完整性记录
pub const EXPECTED_CRC_FILENAME: &str = ".zipdiff/integrity.toml";

const HEADER_TAG_UNCHANGED: u8 = 0x00;
const HEADER_TAG_EXPLICIT: u8 = 0x01;

/// 补丁包元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub created_at: String,
    pub added: usize,
    pub removed: usize,
    pub replaced: usize,
    pub header_changed: bool,
}

impl Metadata {
    pub fn new(changes: &ChangeSet) -> Self {
        Self {
            version: "1.0".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            added: changes.added.len(),
            removed: changes.removed.len(),
            replaced: changes.replaced.len(),
            header_changed: changes.header.is_changed(),
        }
    }

    pub fn to_bytes(&self, patch_path: &Path) -> ArchiveResult<Vec<u8>> {
        to_toml_bytes(patch_path, self)
    }

    pub fn from_bytes(patch_path: &Path, bytes: &[u8]) -> ArchiveResult<Self> {
        toml::from_str(&as_string(bytes)).map_err(|e| {
            ArchiveError::invalid(patch_path, format!("无法解析 {}: {}", METADATA_FILENAME, e))
        })
    }
}

/// 补丁包的完整性记录
///
/// 覆盖除自身外的所有条目：按名称升序，依次计入条目名、一个 `0x00` 字节和条目内容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityRecord {
    pub crc32: u32,
    pub sha256: String,
}

impl IntegrityRecord {
    pub fn compute(entries: &BTreeMap<String, Vec<u8>>) -> Self {
        let mut hasher = DualHasher::new();
        for (name, content) in entries {
            if name == EXPECTED_CRC_FILENAME {
                continue;
            }
            hasher.update(name.as_bytes());
            hasher.update(&[0]);
            hasher.update(content);
        }
        let (crc32, sha256) = hasher.finalize();
        Self { crc32, sha256 }
    }

    pub fn to_bytes(&self, patch_path: &Path) -> ArchiveResult<Vec<u8>> {
        to_toml_bytes(patch_path, self)
    }

    pub fn from_bytes(patch_path: &Path, bytes: &[u8]) -> ArchiveResult<Self> {
        toml::from_str(&as_string(bytes)).map_err(|e| {
            ArchiveError::invalid(
                patch_path,
                format!("无法解析 {}: {}", EXPECTED_CRC_FILENAME, e),
            )
        })
    }
}

/// 序列化失败发生在写出补丁包时，按写入错误报告
fn to_toml_bytes<T: Serialize>(patch_path: &Path, value: &T) -> ArchiveResult<Vec<u8>> {
    toml::to_string_pretty(value)
        .map(String::into_bytes)
        .map_err(|e| ArchiveError::io(patch_path, io::Error::other(e)))
}

pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

pub fn encode_header(header: &HeaderTransition) -> Vec<u8> {
    match header {
        HeaderTransition::Unchanged => vec![HEADER_TAG_UNCHANGED],
        HeaderTransition::Explicit(bytes) => {
            let mut record = Vec::with_capacity(bytes.len() + 1);
            record.push(HEADER_TAG_EXPLICIT);
            record.extend_from_slice(bytes);
            record
        }
    }
}

pub fn decode_header(patch_path: &Path, record: &[u8]) -> ArchiveResult<HeaderTransition> {
    match record.split_first() {
        Some((&HEADER_TAG_UNCHANGED, [])) => Ok(HeaderTransition::Unchanged),
        Some((&HEADER_TAG_EXPLICIT, bytes)) => Ok(HeaderTransition::Explicit(bytes.to_vec())),
        Some((tag, _)) => Err(ArchiveError::invalid(
            patch_path,
            format!("未知的头部数据标记: {:#04x}", tag),
        )),
        None => Err(ArchiveError::invalid(patch_path, "头部数据记录为空")),
    }
}

pub fn encode_removed(removed: &BTreeSet<String>) -> Vec<u8> {
    removed
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes()
}

pub fn decode_removed(record: &[u8]) -> BTreeSet<String> {
    as_string(record)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_failure_is_a_write_error() {
        // toml 文档的顶层必须是表
        let err = to_toml_bytes(Path::new("out.zpatch"), &5u32).unwrap_err();
        assert!(matches!(err, ArchiveError::Io { ref path, .. } if path == Path::new("out.zpatch")));
    }
}
