//! 설정 관리 -- versentry.toml 파싱 및 런타임 설정
//!
//! [`VersentryConfig`]는 한 번의 스윕(sweep)에 필요한 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`VERSENTRY_DATABASE_HOSTNAME=db01` 형식)
//! 2. 설정 파일 (`versentry.toml`, 확장자가 `.json`이면 레거시 JSON 형식)
//! 3. 기본값 (`Default` 구현, 선택 섹션만 해당)
//!
//! `[database]` 그룹과 하나 이상의 `[[folders]]` 항목은 필수입니다.
//! 둘 중 하나라도 없으면 스캔을 시작하기 전에 실패합니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), versentry_core::error::VersentryError> {
//! use versentry_core::config::VersentryConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드 + 검증
//! let config = VersentryConfig::load("versentry.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = VersentryConfig::parse(
//!     "[database]\ndatabase = \"inventory.db\"\n\n[[folders]]\npath = \"/opt/app\"",
//! )?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, VersentryError};

/// 기본 설정 파일 이름 (현재 작업 디렉토리 기준)
pub const DEFAULT_CONFIG_FILE: &str = "versentry.toml";

/// 스캔 대상 파일 최대 크기 기본값 (256 MB)
const DEFAULT_MAX_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// versentry 통합 설정
#[derive(Debug, Clone, Serialize)]
pub struct VersentryConfig {
    /// 일반 설정 (로그)
    pub general: GeneralConfig,
    /// 인벤토리 저장소 접속 정보 (필수)
    pub database: DatabaseConfig,
    /// 파일 선별 설정
    pub scan: ScanConfig,
    /// 스캔 대상 폴더 목록 (필수, 1개 이상)
    pub folders: Vec<FolderEntry>,
}

/// 역직렬화 전용 구조 -- 필수 그룹 누락을 명시적인 에러로 바꾸기 위해 사용
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default, alias = "General")]
    general: GeneralConfig,
    #[serde(default, alias = "Database")]
    database: Option<DatabaseConfig>,
    #[serde(default, alias = "Scan")]
    scan: ScanConfig,
    #[serde(default, alias = "Folders")]
    folders: Option<Vec<FolderEntry>>,
}

impl TryFrom<RawConfig> for VersentryConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let database = raw.database.ok_or_else(|| ConfigError::MissingSection {
            section: "database".to_owned(),
        })?;
        let folders = raw.folders.ok_or_else(|| ConfigError::MissingSection {
            section: "folders".to_owned(),
        })?;

        Ok(Self {
            general: raw.general,
            database,
            scan: raw.scan,
            folders,
        })
    }
}

impl VersentryConfig {
    /// 설정 파일을 로드하고 환경변수 오버라이드를 적용한 뒤 검증합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, VersentryError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일을 읽어 파싱합니다 (환경변수 오버라이드 및 검증 없음).
    ///
    /// 확장자가 `.json`이면 JSON으로, 그 외에는 TOML로 파싱합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, VersentryError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VersentryError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                VersentryError::Io(e)
            }
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::parse_json(&content)
        } else {
            Self::parse(&content)
        }
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, VersentryError> {
        let raw: RawConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;
        Ok(Self::try_from(raw)?)
    }

    /// 레거시 JSON 형식 문자열에서 설정을 파싱합니다.
    pub fn parse_json(json_str: &str) -> Result<Self, VersentryError> {
        let raw: RawConfig =
            serde_json::from_str(json_str).map_err(|e| ConfigError::ParseFailed {
                reason: e.to_string(),
            })?;
        Ok(Self::try_from(raw)?)
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `VERSENTRY_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "VERSENTRY_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "VERSENTRY_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.log_dir, "VERSENTRY_GENERAL_LOG_DIR");

        // Database
        override_string(&mut self.database.hostname, "VERSENTRY_DATABASE_HOSTNAME");
        override_string(&mut self.database.database, "VERSENTRY_DATABASE_DATABASE");
        override_string(&mut self.database.username, "VERSENTRY_DATABASE_USERNAME");
        override_string(&mut self.database.password, "VERSENTRY_DATABASE_PASSWORD");

        // Scan
        override_csv(&mut self.scan.extensions, "VERSENTRY_SCAN_EXTENSIONS");
        override_u64(&mut self.scan.max_file_size, "VERSENTRY_SCAN_MAX_FILE_SIZE");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), VersentryError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.database.database.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.database".to_owned(),
                reason: "database name must not be empty".to_owned(),
            }
            .into());
        }

        if self.folders.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "folders".to_owned(),
                reason: "the 'folders' group must have at least 1 entry".to_owned(),
            }
            .into());
        }

        for (idx, folder) in self.folders.iter().enumerate() {
            if folder.path.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("folders[{idx}].path"),
                    reason: "folder path must not be empty".to_owned(),
                }
                .into());
            }
        }

        if self.scan.normalized_extensions().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scan.extensions".to_owned(),
                reason: "at least one file extension is required".to_owned(),
            }
            .into());
        }

        if self.scan.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_file_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 콘솔 로그 형식 (pretty, compact, json)
    pub log_format: String,
    /// 실행별 로그 파일을 기록할 디렉토리 (빈 문자열이면 파일 로그 비활성화)
    pub log_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            log_dir: ".".to_owned(),
        }
    }
}

/// 인벤토리 저장소 접속 정보
///
/// 기본 SQLite 백엔드는 `database`를 파일 경로로 사용합니다.
/// `hostname`/`username`/`password`는 서버형 저장소를 위한 값이며 로그에 남기지 않습니다.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 접속할 호스트 또는 IP
    #[serde(alias = "Hostname", alias = "host")]
    pub hostname: String,
    /// 데이터베이스 이름 (SQLite: 파일 경로)
    #[serde(alias = "Database")]
    pub database: String,
    /// 로그인 사용자
    #[serde(alias = "Username")]
    pub username: String,
    /// 비밀번호
    #[serde(alias = "Password")]
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_owned(),
            database: "versentry.db".to_owned(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("hostname", &self.hostname)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// 파일 선별 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 스캔할 파일 확장자 (대소문자 무시, 앞의 `.`은 생략 가능)
    pub extensions: Vec<String>,
    /// 파일 최대 크기 (바이트). 초과하면 건너뜀
    pub max_file_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["dll".to_owned()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ScanConfig {
    /// 소문자로 정규화하고 앞의 `.`을 제거한 확장자 목록을 반환합니다.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

/// 스캔 대상 폴더
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// 폴더 전체 경로
    #[serde(alias = "Path")]
    pub path: String,
    /// 하위 폴더 포함 여부
    #[serde(
        default,
        alias = "includeSubfolders",
        alias = "IncludeSubfolders"
    )]
    pub include_subfolders: bool,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}
