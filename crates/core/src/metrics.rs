//! 메트릭 상수 및 설명 등록
//!
//! 스윕 중 기록하는 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 스캐너는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않았으면 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `versentry_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(versentry_core::metrics::FILES_SCANNED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 건너뛴 사유 레이블 키 (read_error, version_info, too_large)
pub const LABEL_REASON: &str = "reason";

/// 패키지 이름 레이블 키
pub const LABEL_PACKAGE: &str = "package";

// ─── 스윕 메트릭 ───────────────────────────────────────────────────

/// 인벤토리에 반영된 파일 수 (counter)
pub const FILES_SCANNED_TOTAL: &str = "versentry_files_scanned_total";

/// 건너뛴 파일 수 (counter, label: reason)
pub const FILES_SKIPPED_TOTAL: &str = "versentry_files_skipped_total";

/// 새로 생성된 인벤토리 레코드 수 (counter)
pub const RECORDS_CREATED_TOTAL: &str = "versentry_records_created_total";

/// 패키지와 매칭되지 않은 파일 수 (counter)
pub const UNMATCHED_FILES_TOTAL: &str = "versentry_unmatched_files_total";

/// 불량 버전으로 판정된 파일 수 (counter, label: package)
pub const BAD_VERSIONS_TOTAL: &str = "versentry_bad_versions_total";

/// 접근할 수 없었던 폴더 수 (counter)
pub const FOLDERS_UNAVAILABLE_TOTAL: &str = "versentry_folders_unavailable_total";

/// 전체 스윕 소요 시간 (histogram, 초)
pub const SWEEP_DURATION_SECONDS: &str = "versentry_sweep_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더를 설치한 프로세스에서 스윕 시작 전에 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        FILES_SCANNED_TOTAL,
        "Total number of binaries reconciled into the inventory"
    );
    describe_counter!(
        FILES_SKIPPED_TOTAL,
        "Total number of binaries skipped (read error, missing version info, too large)"
    );
    describe_counter!(
        RECORDS_CREATED_TOTAL,
        "Total number of inventory records created on first observation"
    );
    describe_counter!(
        UNMATCHED_FILES_TOTAL,
        "Total number of binaries that matched no known package"
    );
    describe_counter!(
        BAD_VERSIONS_TOTAL,
        "Total number of binaries whose version falls inside a flagged range"
    );
    describe_counter!(
        FOLDERS_UNAVAILABLE_TOTAL,
        "Total number of configured folders that could not be scanned"
    );
    describe_histogram!(
        SWEEP_DURATION_SECONDS,
        "Time to complete one sweep across all configured folders in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        FILES_SCANNED_TOTAL,
        FILES_SKIPPED_TOTAL,
        RECORDS_CREATED_TOTAL,
        UNMATCHED_FILES_TOTAL,
        BAD_VERSIONS_TOTAL,
        FOLDERS_UNAVAILABLE_TOTAL,
        SWEEP_DURATION_SECONDS,
    ];

    #[test]
    fn all_metrics_start_with_versentry_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("versentry_"),
                "Metric '{}' does not start with 'versentry_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in ALL_METRIC_NAMES.iter().filter(|n| !n.ends_with("_seconds")) {
            assert!(name.ends_with("_total"), "Counter '{}' must end with _total", name);
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }
}
