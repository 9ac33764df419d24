//! 补丁包的读取与校验
//!
//! 读取得到的 [`PatchArtifact`] 尚未校验；只有通过 [`PatchArtifact::validate`]
//! 得到的 [`ValidatedPatch`] 才能被应用。

use log::warn;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::diff::HeaderTransition;
use super::metadata::{
    EXPECTED_CRC_FILENAME, HEADER_FILENAME, IntegrityRecord, METADATA_FILENAME, Metadata,
    REMOVED_FILENAME, decode_header, decode_removed, is_reserved,
};
use crate::archive::ArchiveHandle;
use crate::error::{ArchiveError, ArchiveResult, IntegrityFailure};

/// 完整性记录与重新计算结果的比对状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityStatus {
    Valid,
    Missing,
    Mismatch,
}

/// 从文件读取的补丁包
#[derive(Debug, Clone)]
pub struct PatchArtifact {
    path: PathBuf,
    entries: BTreeMap<String, Vec<u8>>,
    removed: BTreeSet<String>,
    header_record: Option<Vec<u8>>,
    metadata: Option<Metadata>,
    expected: Option<IntegrityRecord>,
    actual: IntegrityRecord,
    /// 解压失败或 CRC 不符的条目
    corrupt: BTreeSet<String>,
}

impl PatchArtifact {
    /// 读取补丁包，不做校验
    ///
    /// 缺少的保留条目按空删除列表、头部未变化处理，是否可信由校验决定。
    /// 无法解码的条目不会导致读取失败，而是记为损坏，使校验不通过。
    pub fn read(path: &Path) -> ArchiveResult<Self> {
        let (mut all, corrupt) = ArchiveHandle::open(path)?.read_all_lenient()?;
        for (name, reason) in &corrupt {
            warn!("补丁包 {} 的条目 {} 已损坏: {}", path.display(), name, reason);
        }
        let actual = IntegrityRecord::compute(&all);

        // 无法解析的完整性记录与缺失同样处理
        let expected = all
            .remove(EXPECTED_CRC_FILENAME)
            .and_then(|bytes| match IntegrityRecord::from_bytes(path, &bytes) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            });
        let removed = all
            .remove(REMOVED_FILENAME)
            .map(|bytes| decode_removed(&bytes))
            .unwrap_or_default();
        let header_record = all.remove(HEADER_FILENAME);
        let metadata = all
            .remove(METADATA_FILENAME)
            .and_then(|bytes| Metadata::from_bytes(path, &bytes).ok());

        // 未知的保留条目不作为内容条目应用
        all.retain(|name, _| !is_reserved(name));

        Ok(Self {
            path: path.to_path_buf(),
            entries: all,
            removed,
            header_record,
            metadata,
            expected,
            actual,
            corrupt: corrupt.into_keys().collect(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 新增或替换的条目内容
    pub fn entries(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.entries
    }

    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    /// 解析头部数据记录；记录缺失时视为未变化
    pub fn header(&self) -> ArchiveResult<HeaderTransition> {
        match &self.header_record {
            Some(record) => decode_header(&self.path, record),
            None => Ok(HeaderTransition::Unchanged),
        }
    }

    /// 无法解码的条目名，包括保留条目
    pub fn corrupt(&self) -> &BTreeSet<String> {
        &self.corrupt
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn integrity_status(&self) -> IntegrityStatus {
        match self.check() {
            Ok(()) => IntegrityStatus::Valid,
            Err(IntegrityFailure::Missing) => IntegrityStatus::Missing,
            Err(IntegrityFailure::Mismatch { .. }) => IntegrityStatus::Mismatch,
        }
    }

    fn check(&self) -> Result<(), IntegrityFailure> {
        let Some(expected) = &self.expected else {
            return Err(IntegrityFailure::Missing);
        };
        if expected != &self.actual || !self.corrupt.is_empty() {
            return Err(IntegrityFailure::Mismatch {
                expected_crc: expected.crc32,
                actual_crc: self.actual.crc32,
            });
        }
        Ok(())
    }

    /// 校验完整性记录并解析头部数据记录
    ///
    /// 记录缺失或不匹配时返回 [`ArchiveError::CrcMismatch`]；
    /// `ignore_validation` 为真时只记录警告并继续。
    pub fn validate(self, ignore_validation: bool) -> ArchiveResult<ValidatedPatch> {
        if let Err(failure) = self.check() {
            if !ignore_validation {
                return Err(ArchiveError::CrcMismatch(failure));
            }
            warn!(
                "忽略补丁包 {} 的校验失败: {}",
                self.path.display(),
                failure
            );
            for name in &self.corrupt {
                warn!("跳过无法解码的条目: {}", name);
            }
        }
        let header = self.header()?;
        Ok(ValidatedPatch {
            artifact: self,
            header,
        })
    }
}

/// 已通过校验（或明确跳过校验）的补丁包
#[derive(Debug, Clone)]
pub struct ValidatedPatch {
    artifact: PatchArtifact,
    header: HeaderTransition,
}

impl ValidatedPatch {
    pub fn artifact(&self) -> &PatchArtifact {
        &self.artifact
    }

    pub fn header(&self) -> &HeaderTransition {
        &self.header
    }
}
