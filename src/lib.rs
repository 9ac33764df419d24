//! # zipdiff
//!
//! zip 归档增量更新工具库
//!
//! ## 功能
//!
//! - 对比两个 zip 归档，列出新增、删除、替换的条目以及 zip 之前的头部数据变化
//! - 生成补丁包：补丁包本身是 zip，只包含变化的条目和一份完整性记录
//! - 应用补丁包前先校验完整性记录，校验失败时不写入目标文件
//!
//! ## 使用示例
//!
//! ```no_run
//! use zipdiff::{apply_patch, diff, generate_patch};
//! use std::path::Path;
//!
//! let changes = diff(Path::new("v1.zip"), Path::new("v2.zip")).unwrap();
//! println!("{}", changes.summary());
//!
//! // 生成补丁包
//! generate_patch(
//!     Path::new("v1.zip"),
//!     Path::new("v2.zip"),
//!     Path::new("v1-v2.zpatch"),
//! ).unwrap();
//!
//! // 应用补丁包
//! apply_patch(
//!     Path::new("v1.zip"),
//!     Path::new("v1-v2.zpatch"),
//!     Path::new("v2-rebuilt.zip"),
//!     false,
//! ).unwrap();
//! ```

pub mod archive;
pub mod cli;
pub mod error;
pub mod patch;
pub mod utils;

use std::path::Path;

// 重新导出常用类型
pub use archive::{ArchiveHandle, update_archive};
pub use error::{ArchiveError, ArchiveResult, IntegrityFailure};
pub use patch::{ChangeSet, HeaderTransition, PatchArtifact};
pub use patch::{apply_patch, show_patch};

/// 比较两个归档文件
pub fn diff(old_path: &Path, new_path: &Path) -> ArchiveResult<ChangeSet> {
    patch::compare_archives(old_path, new_path)
}

/// 比较两个归档文件并生成补丁包
pub fn generate_patch(old_path: &Path, new_path: &Path, patch_path: &Path) -> ArchiveResult<()> {
    patch::create_patch(old_path, new_path, patch_path).map(|_| ())
}
