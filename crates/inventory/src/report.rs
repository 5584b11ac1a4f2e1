//! 스윕 결과 보고서

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::evaluator::RangeEvaluation;
use crate::types::{BadVersionRange, HostIdentity};

/// 폴더 스캔 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FolderStatus {
    /// 정상 스캔
    Scanned,
    /// 대상 파일이 없어 중단
    Empty,
    /// 폴더에 접근할 수 없어 건너뜀
    Unavailable { reason: String },
}

/// 폴더별 스캔 결과
#[derive(Debug, Clone, Serialize)]
pub struct FolderReport {
    /// 설정 파일 내 1부터 시작하는 폴더 번호
    pub index: usize,
    pub path: String,
    pub status: FolderStatus,
    pub files_found: usize,
    pub files_inventoried: usize,
    pub files_skipped: usize,
    pub unmatched: usize,
    pub records_created: usize,
}

impl FolderReport {
    pub(crate) fn new(index: usize, path: &str) -> Self {
        Self {
            index,
            path: path.to_owned(),
            status: FolderStatus::Scanned,
            files_found: 0,
            files_inventoried: 0,
            files_skipped: 0,
            unmatched: 0,
            records_created: 0,
        }
    }
}

/// 불량 버전 알림
#[derive(Debug, Clone, Serialize)]
pub struct BadVersionAlert {
    pub folder_index: usize,
    pub package_id: i64,
    pub package_name: String,
    pub file_path: String,
    pub file_name: String,
    pub file_version: String,
    pub product_version: String,
    /// 매칭된 범위
    pub range: BadVersionRange,
    /// 범위의 경계별 평가 결과
    pub evaluation: RangeEvaluation,
    /// 인벤토리 레코드 ID
    pub record_id: Option<i64>,
}

/// 한 번의 스윕 결과
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub sweep_id: String,
    pub host: HostIdentity,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub folders: Vec<FolderReport>,
    pub alerts: Vec<BadVersionAlert>,
}

impl SweepReport {
    pub fn files_inventoried(&self) -> usize {
        self.folders.iter().map(|f| f.files_inventoried).sum()
    }

    pub fn files_skipped(&self) -> usize {
        self.folders.iter().map(|f| f.files_skipped).sum()
    }

    pub fn unmatched(&self) -> usize {
        self.folders.iter().map(|f| f.unmatched).sum()
    }

    pub fn records_created(&self) -> usize {
        self.folders.iter().map(|f| f.records_created).sum()
    }

    /// 접근할 수 없었던 폴더 수
    pub fn folders_unavailable(&self) -> usize {
        self.folders
            .iter()
            .filter(|f| matches!(f.status, FolderStatus::Unavailable { .. }))
            .count()
    }

    /// 소요 시간 (초)
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}
