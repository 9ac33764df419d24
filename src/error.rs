//! 错误类型

use std::io;
use std::path::{Path, PathBuf};

use zip::result::ZipError;

/// 归档与补丁操作中可能出现的错误
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// 输入文件不存在
    #[error("文件不存在: {}", .0.display())]
    NotFound(PathBuf),

    /// 文件不是合法的 zip 归档或补丁包
    #[error("无效的归档格式 {}: {reason}", path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    /// 补丁包的完整性记录缺失或与重新计算的校验值不符
    #[error("CRC 校验失败: {0}")]
    CrcMismatch(IntegrityFailure),

    /// 读写失败
    #[error("读写 {} 失败: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 完整性校验失败的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityFailure {
    #[error("补丁包缺少完整性记录，无法确认其内容")]
    Missing,

    #[error("期望 CRC {expected_crc:08x}，实际 CRC {actual_crc:08x}")]
    Mismatch { expected_crc: u32, actual_crc: u32 },
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

impl ArchiveError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        ArchiveError::InvalidFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// 将 zip 库的错误映射到对应路径上的错误类型
    pub(crate) fn from_zip(path: &Path, err: ZipError) -> Self {
        match err {
            ZipError::Io(source) => ArchiveError::io(path, source),
            other => ArchiveError::invalid(path, other.to_string()),
        }
    }
}
