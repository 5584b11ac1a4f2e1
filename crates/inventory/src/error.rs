//! 인벤토리 스캐너 에러 타입
//!
//! [`ScannerError`]는 스윕 중 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<ScannerError> for VersentryError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **치명적 (스윕 중단)**: `Config`, `Store`
//! - **폴더 단위 (해당 폴더 건너뜀)**: `FolderUnavailable`
//! - **파일 단위 (해당 파일 건너뜀)**: `FileRead`, `FileTooBig`, `VersionInfoUnavailable`
//! - **조용히 무시**: `InvalidVersionFormat` (범위 경계 단위), `PatternCompile` (패턴 단위)

use versentry_core::error::{StoreError, VersentryError};

/// 인벤토리 스캐너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// 스캐너 구성 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 인벤토리 저장소 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 폴더를 스캔할 수 없음
    #[error("folder unavailable: {path}: {reason}")]
    FolderUnavailable {
        /// 폴더 경로
        path: String,
        /// 사유
        reason: String,
    },

    /// 파일 읽기 실패
    #[error("file read error: {path}: {reason}")]
    FileRead {
        /// 파일 경로
        path: String,
        /// 사유
        reason: String,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: u64,
        /// 최대 허용 크기 (바이트)
        max: u64,
    },

    /// 바이너리에서 버전 정보를 얻을 수 없음
    #[error("version info unavailable: {path}: {reason}")]
    VersionInfoUnavailable {
        /// 파일 경로
        path: String,
        /// 사유
        reason: String,
    },

    /// 점으로 구분된 버전 문자열 파싱 실패
    #[error("invalid version format: '{version}': {reason}")]
    InvalidVersionFormat {
        /// 파싱 대상 버전 문자열
        version: String,
        /// 파싱 실패 사유
        reason: String,
    },

    /// 파일명 패턴 컴파일 실패
    #[error("invalid pattern for package '{package}': '{pattern}': {reason}")]
    PatternCompile {
        /// 패키지 이름
        package: String,
        /// 원본 패턴
        pattern: String,
        /// 컴파일 실패 사유
        reason: String,
    },
}

impl ScannerError {
    /// 스윕 전체를 중단해야 하는 에러인지 반환합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Store(_))
    }

    /// 메트릭 레이블로 사용할 짧은 사유 문자열을 반환합니다.
    pub fn reason_label(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Store(_) => "store",
            Self::FolderUnavailable { .. } => "folder_unavailable",
            Self::FileRead { .. } => "read_error",
            Self::FileTooBig { .. } => "too_large",
            Self::VersionInfoUnavailable { .. } => "version_info",
            Self::InvalidVersionFormat { .. } => "invalid_version",
            Self::PatternCompile { .. } => "invalid_pattern",
        }
    }
}

impl From<ScannerError> for VersentryError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::Store(store) => VersentryError::Store(store),
            ScannerError::Config { field, reason } => VersentryError::Config(
                versentry_core::error::ConfigError::InvalidValue { field, reason },
            ),
            other => VersentryError::Scan(other.to_string()),
        }
    }
}
