//! 에러 타입 -- 도메인별 에러 정의

/// versentry 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum VersentryError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 인벤토리 저장소 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 스캔 처리 에러
    #[error("scan error: {0}")]
    Scan(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VersentryError {
    /// 스캔을 시작하기 전에 실행을 중단시키는 에러인지 반환합니다.
    ///
    /// 설정 에러와 저장소 연결 실패만 해당합니다.
    pub fn is_fatal_before_scan(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Store(StoreError::Connection(_))
        )
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 필수 섹션 누락
    #[error("the '{section}' group is required")]
    MissingSection { section: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 인벤토리 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 연결 실패 (스캔 시작 전 치명적)
    #[error("connection failed: {0}")]
    Connection(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),

    /// 저장된 행의 형식이 올바르지 않음
    #[error("corrupt row in '{table}': {reason}")]
    CorruptRow { table: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: VersentryError = ConfigError::MissingSection {
            section: "database".to_owned(),
        }
        .into();
        assert!(err.to_string().contains("'database' group is required"));
        assert!(err.is_fatal_before_scan());
    }

    #[test]
    fn store_connection_is_fatal_but_query_is_not() {
        let conn: VersentryError = StoreError::Connection("refused".to_owned()).into();
        let query: VersentryError = StoreError::Query("locked".to_owned()).into();
        assert!(conn.is_fatal_before_scan());
        assert!(!query.is_fatal_before_scan());
    }

    #[test]
    fn corrupt_row_display_names_table() {
        let err = StoreError::CorruptRow {
            table: "inventory_records".to_owned(),
            reason: "negative file size".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("inventory_records"));
        assert!(msg.contains("negative file size"));
    }
}
