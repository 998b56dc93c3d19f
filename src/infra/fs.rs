//! # File System Operations Module / 文件系统操作模块
//!
//! Pre-flight path checks, shared scheme installation and output log
//! truncation that run before any subtask command.
//!
//! 在任何子任务命令之前运行的预检路径检查、共享 scheme 安装以及输出日志截断。

use anyhow::{Context, Result, bail};
use fs_extra::file::{CopyOptions, copy};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::Target;
use crate::core::error::{ConfigError, ConfigResult};
use crate::infra::t;

/// Directory, relative to a workspace or project, holding shared schemes.
pub const SHARED_SCHEMES_DIR: &str = "xcshareddata/xcschemes";

/// Expands `~` and environment variables in a configured path.
/// 展开配置路径中的 `~` 和环境变量。
pub fn expand_path(raw: &str) -> ConfigResult<PathBuf> {
    let expanded = shellexpand::full(raw).map_err(|e| {
        ConfigError::invalid_argument(format!("cannot expand path '{raw}': {e}"))
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Fails unless the target container (and the schemes directory, if any)
/// exist on disk.
///
/// 除非目标容器（以及 schemes 目录，如果有）在磁盘上存在，否则失败。
pub fn preflight(target: &Target, schemes_dir: Option<&Path>) -> Result<()> {
    let path = target.path();
    if !path.exists() {
        bail!("{}", t!("preflight.target_missing", path = path.display()));
    }
    if let Some(dir) = schemes_dir {
        if !is_directory(dir) {
            bail!("{}", t!("preflight.schemes_dir_missing", path = dir.display()));
        }
    }
    Ok(())
}

/// The shared schemes directory inside a workspace or project.
pub fn shared_schemes_path(target: &Target) -> PathBuf {
    target.path().join(SHARED_SCHEMES_DIR)
}

/// Copies every `*.xcscheme` file of `schemes_dir` into the target's shared
/// schemes directory, overwriting existing files. Returns the copied paths.
///
/// 将 `schemes_dir` 中的每个 `*.xcscheme` 文件复制到目标的共享 scheme 目录，
/// 覆盖已存在的文件。返回已复制的路径。
pub fn install_schemes(schemes_dir: &Path, target: &Target) -> Result<Vec<PathBuf>> {
    let destination = shared_schemes_path(target);
    fs::create_dir_all(&destination)
        .with_context(|| format!("Failed to create directory: {}", destination.display()))?;

    let mut schemes: Vec<PathBuf> = fs::read_dir(schemes_dir)
        .with_context(|| format!("Failed to read schemes directory: {}", schemes_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "xcscheme"))
        .collect();
    schemes.sort();

    let mut options = CopyOptions::new();
    options.overwrite = true;

    let mut installed = Vec::with_capacity(schemes.len());
    for scheme in schemes {
        let file_name = scheme
            .file_name()
            .with_context(|| format!("Invalid scheme path: {}", scheme.display()))?;
        let dest = destination.join(file_name);
        copy(&scheme, &dest, &options)
            .with_context(|| format!("Failed to copy {} to {}", scheme.display(), dest.display()))?;
        installed.push(dest);
    }
    Ok(installed)
}

/// Empties an output log, creating parent directories when needed.
/// 清空输出日志，必要时创建父目录。
pub fn truncate_log(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::File::create(path)
        .map(|_| ())
        .with_context(|| format!("Failed to truncate output log: {}", path.display()))
}

/// Checks if a path exists and is a directory.
pub fn is_directory(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_leaves_plain_paths() {
        assert_eq!(
            expand_path("LayerKit.xcworkspace").unwrap(),
            PathBuf::from("LayerKit.xcworkspace")
        );
    }

    #[test]
    fn test_expand_path_rejects_unknown_variable() {
        let err = expand_path("$XCMATRIX_SURELY_UNSET_VARIABLE/App.xcworkspace").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgument(_)));
    }
}
