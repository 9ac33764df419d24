use anyhow::{Context, Result};
use clap::Parser;
use std::fs;

use zipdiff::cli::{Action, Cli};
use zipdiff::patch::{DiffReport, PatchReport};
use zipdiff::utils::size_to_string;
use zipdiff::{apply_patch, diff, generate_patch, show_patch};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    match cli.action().context("Command ERROR")? {
        Action::Diff { base, compare_with } => {
            let changes = diff(&base, &compare_with)
                .with_context(|| format!("无法比较 {:?} 与 {:?}", base, compare_with))?;
            let old_name = base.to_string_lossy();
            let new_name = compare_with.to_string_lossy();
            let report = DiffReport {
                old_name: &old_name,
                new_name: &new_name,
                changes: &changes,
                verbose: cli.verbose,
            };
            println!("{}", report);
        }
        Action::GeneratePatch {
            base,
            compare_with,
            output,
        } => {
            generate_patch(&base, &compare_with, &output)
                .with_context(|| format!("无法生成补丁包: {:?}", output))?;
            if cli.verbose {
                let size = fs::metadata(&output)
                    .with_context(|| format!("无法读取补丁包: {:?}", output))?
                    .len();
                println!(
                    "Created patch file \"{}\" of {}",
                    output.display(),
                    size_to_string(size)
                );
            }
        }
        Action::ApplyPatch {
            base,
            patch,
            target,
            ignore_validation,
        } => {
            apply_patch(&base, &patch, &target, ignore_validation)
                .with_context(|| format!("无法应用补丁包: {:?}", patch))?;
            if cli.verbose {
                println!("Patched {} to {}", base.display(), target.display());
            }
        }
        Action::ShowPatch { patch } => {
            let artifact =
                show_patch(&patch).with_context(|| format!("无法读取补丁包: {:?}", patch))?;
            print!("{}", PatchReport(&artifact));
        }
    }

    Ok(())
}
