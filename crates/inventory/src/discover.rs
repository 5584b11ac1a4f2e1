//! 스캔 대상 파일 탐색
//!
//! 설정된 폴더에서 대상 확장자의 파일을 찾습니다.
//! `include_subfolders`가 꺼져 있으면 최상위 폴더만 봅니다.

use std::path::{Path, PathBuf};

use tracing::warn;
use versentry_core::config::FolderEntry;
use walkdir::WalkDir;

use crate::error::ScannerError;

/// 폴더에서 대상 파일 경로를 찾습니다.
///
/// 각 디렉토리 안에서는 파일명 순서로 반환합니다. 폴더가 없거나 디렉토리가 아니거나
/// 목록을 읽을 수 없으면 [`ScannerError::FolderUnavailable`]을 반환합니다.
/// 하위 항목 접근 실패는 경고 후 건너뜁니다. 파일을 가리키는 심볼릭 링크도 포함합니다.
pub fn discover_files(
    folder: &FolderEntry,
    extensions: &[String],
) -> Result<Vec<PathBuf>, ScannerError> {
    let root = Path::new(&folder.path);
    if !root.exists() {
        return Err(ScannerError::FolderUnavailable {
            path: folder.path.clone(),
            reason: "folder does not exist".to_owned(),
        });
    }
    if !root.is_dir() {
        return Err(ScannerError::FolderUnavailable {
            path: folder.path.clone(),
            reason: "path is not a directory".to_owned(),
        });
    }

    // 목록을 읽을 수 없는 폴더는 빈 폴더가 아니라 접근 불가
    std::fs::read_dir(root).map_err(|e| ScannerError::FolderUnavailable {
        path: folder.path.clone(),
        reason: e.to_string(),
    })?;

    let max_depth = if folder.include_subfolders { usize::MAX } else { 1 };

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScannerError::FolderUnavailable {
                    path: folder.path.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!(folder = %folder.path, error = %e, "skipping unreadable entry");
                continue;
            }
        };

        // 심볼릭 링크는 대상이 일반 파일이면 포함
        if entry.path().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// 확장자가 목록에 있는지 대소문자 구분 없이 확인합니다.
///
/// `extensions`는 소문자이며 앞의 `.`이 없어야 합니다.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
