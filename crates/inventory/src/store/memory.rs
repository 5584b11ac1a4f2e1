//! 메모리 기반 인벤토리 저장소

use versentry_core::error::StoreError;

use super::InventoryStore;
use crate::types::{BadVersionRange, InventoryRecord, Package, Signature};

/// 프로세스 메모리에 카탈로그와 레코드를 보관하는 저장소
///
/// 저장 호출 횟수를 세므로 테스트에서 쓰기 횟수를 검증할 수 있습니다.
#[derive(Debug, Default)]
pub struct MemoryStore {
    packages: Vec<Package>,
    ranges: Vec<BadVersionRange>,
    records: Vec<InventoryRecord>,
    next_id: i64,
    writes: usize,
}

impl MemoryStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 카탈로그가 채워진 저장소를 생성합니다.
    pub fn with_catalog(packages: Vec<Package>, ranges: Vec<BadVersionRange>) -> Self {
        Self {
            packages,
            ranges,
            ..Self::default()
        }
    }

    /// 저장된 레코드를 삽입 순서대로 반환합니다.
    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    /// `save_record` 호출 횟수
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl InventoryStore for MemoryStore {
    fn load_packages(&self) -> Result<Vec<Package>, StoreError> {
        let mut packages: Vec<Package> = self
            .packages
            .iter()
            .filter(|p| !p.is_deleted())
            .cloned()
            .collect();
        packages.sort_by_key(|p| p.id);
        Ok(packages)
    }

    fn load_bad_version_ranges(&self) -> Result<Vec<BadVersionRange>, StoreError> {
        let mut ranges: Vec<BadVersionRange> = self
            .ranges
            .iter()
            .filter(|r| !r.is_deleted())
            .cloned()
            .collect();
        ranges.sort_by_key(|r| r.id);
        Ok(ranges)
    }

    fn find_record(&self, signature: &Signature) -> Result<Option<InventoryRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .find(|r| r.signature() == *signature)
            .cloned())
    }

    fn save_record(&mut self, record: &mut InventoryRecord) -> Result<(), StoreError> {
        self.writes += 1;
        match record.id {
            None => {
                self.next_id += 1;
                record.id = Some(self.next_id);
                self.records.push(record.clone());
            }
            Some(id) => {
                let slot = self
                    .records
                    .iter_mut()
                    .find(|r| r.id == Some(id))
                    .ok_or_else(|| StoreError::Query(format!("inventory record #{id} not found")))?;
                *slot = record.clone();
            }
        }
        Ok(())
    }
}
