use anyhow::{Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};

/// 补丁文件没有扩展名时使用的扩展名
pub const DEFAULT_PATCH_EXTENSION: &str = "zpatch";

/// zip 归档增量更新工具
#[derive(Parser, Debug)]
#[command(name = "zipdiff")]
#[command(about = "对比 zip 归档、生成并应用补丁包", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// 基准归档 (旧版本)
    #[arg(short = 'f', long)]
    pub base_file: Option<PathBuf>,

    /// 要对比的归档 (新版本)
    #[arg(short = 'c', long)]
    pub compare_with: Option<PathBuf>,

    /// 生成补丁包到此路径，没有扩展名时追加 .zpatch
    #[arg(short = 'g', long)]
    pub generate_patch: Option<PathBuf>,

    /// 用此补丁包更新基准归档
    #[arg(short = 'p', long)]
    pub patch_with: Option<PathBuf>,

    /// 更新后的归档路径，默认为基准归档名加 -new
    #[arg(short = 't', long)]
    pub patch_to: Option<PathBuf>,

    /// 显示补丁包内容
    #[arg(short = 's', long)]
    pub show_patch: Option<PathBuf>,

    /// 忽略补丁包的完整性校验
    #[arg(short = 'i', long)]
    pub ignore_validation: bool,

    /// 输出更多信息
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// 解析并校验后的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 列出两个归档的差异
    Diff { base: PathBuf, compare_with: PathBuf },
    /// 生成补丁包
    GeneratePatch {
        base: PathBuf,
        compare_with: PathBuf,
        output: PathBuf,
    },
    /// 应用补丁包
    ApplyPatch {
        base: PathBuf,
        patch: PathBuf,
        target: PathBuf,
        ignore_validation: bool,
    },
    /// 显示补丁包内容
    ShowPatch { patch: PathBuf },
}

impl Cli {
    /// 将参数组合解析为唯一的命令，缺失或矛盾的组合报错
    pub fn action(&self) -> Result<Action> {
        if let Some(patch) = &self.show_patch {
            // 只允许附加 --verbose
            if self.base_file.is_some()
                || self.compare_with.is_some()
                || self.generate_patch.is_some()
                || self.patch_with.is_some()
                || self.patch_to.is_some()
                || self.ignore_validation
            {
                bail!("Cannot combine --show-patch with other options.");
            }
            return Ok(Action::ShowPatch {
                patch: patch.clone(),
            });
        }

        let Some(base) = self.base_file.clone() else {
            bail!("No base-file provided.");
        };
        if self.compare_with.is_none() && self.generate_patch.is_some() {
            bail!("Cannot create patch without a compare-with.");
        }

        match (&self.compare_with, &self.patch_with) {
            (None, None) => bail!("No compare and not patch. Nothing to do."),
            (Some(_), Some(_)) => {
                bail!("Cannot compare when patching. Remove the --compare-with.")
            }
            (None, Some(patch)) => {
                if !patch.exists() {
                    bail!("Cannot patch -- file does not exist: {}", patch.display());
                }
                let target = self
                    .patch_to
                    .clone()
                    .unwrap_or_else(|| default_patch_target(&base));
                Ok(Action::ApplyPatch {
                    base,
                    patch: patch.clone(),
                    target,
                    ignore_validation: self.ignore_validation,
                })
            }
            (Some(compare_with), None) => match &self.generate_patch {
                Some(output) => Ok(Action::GeneratePatch {
                    base,
                    compare_with: compare_with.clone(),
                    output: with_default_extension(output),
                }),
                None => Ok(Action::Diff {
                    base,
                    compare_with: compare_with.clone(),
                }),
            },
        }
    }
}

/// 在文件名和扩展名之间插入 `-new`：`app.zip` -> `app-new.zip`
pub fn default_patch_target(base: &Path) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}-new.{}", stem, ext.to_string_lossy()),
        None => format!("{}-new", stem),
    };
    base.with_file_name(name)
}

/// 没有扩展名时追加 `.zpatch`
pub fn with_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(DEFAULT_PATCH_EXTENSION)
    }
}
