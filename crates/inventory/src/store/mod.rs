//! 인벤토리 저장소
//!
//! [`InventoryStore`]는 카탈로그 로드와 인벤토리 레코드 조회/저장을 담당하는 경계입니다.
//!
//! - [`SqliteStore`]: SQLite 파일 기반 기본 구현
//! - [`MemoryStore`]: 프로세스 메모리 구현 (테스트, 드라이런)

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use tracing::warn;
use versentry_core::error::StoreError;

use crate::types::{BadVersionRange, InventoryRecord, Package, Signature};

/// 인벤토리 저장소 trait
///
/// 모든 메서드는 블로킹 I/O이며, 스윕은 단일 스레드에서 순차적으로 호출합니다.
pub trait InventoryStore: Send {
    /// 모든 패키지를 ID 순서로 로드합니다. 소프트 삭제된 행은 제외합니다.
    fn load_packages(&self) -> Result<Vec<Package>, StoreError>;

    /// 모든 불량 버전 범위를 ID 순서로 로드합니다. 소프트 삭제된 행은 제외합니다.
    fn load_bad_version_ranges(&self) -> Result<Vec<BadVersionRange>, StoreError>;

    /// 서명이 정확히 일치하는 레코드를 조회합니다.
    fn find_record(&self, signature: &Signature) -> Result<Option<InventoryRecord>, StoreError>;

    /// 레코드를 저장합니다.
    ///
    /// `id`가 `None`이면 삽입 후 새 ID를 채우고, 있으면 해당 행을 갱신합니다.
    fn save_record(&mut self, record: &mut InventoryRecord) -> Result<(), StoreError>;
}

/// 저장된 파일명 패턴(JSON 문자열 배열)을 파싱합니다.
///
/// 형식이 잘못되었으면 경고를 남기고 빈 목록을 반환하여, 해당 패키지가 매칭되지 않게 합니다.
pub fn parse_file_patterns(package: &str, raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(patterns) => patterns,
        Err(e) => {
            warn!(package, error = %e, "file patterns are not a JSON string array, ignoring");
            Vec::new()
        }
    }
}
