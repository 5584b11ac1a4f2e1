//! 인벤토리 조정
//!
//! 발견된 바이너리를 서명으로 조회하여 기존 레코드를 재사용하거나 새로 만들고,
//! `last_scan`과 `package_id`를 갱신한 뒤 한 번 저장합니다.
//! 조회 후 갱신(read-modify-write)이므로 같은 서명으로 여러 번 호출해도 행이 중복되지 않습니다.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::ScannerError;
use crate::store::InventoryStore;
use crate::types::{DiscoveredBinary, InventoryRecord};

/// 조정 결과
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// 저장된 레코드 (ID 포함)
    pub record: InventoryRecord,
    /// 이번 호출에서 새로 만든 레코드인지 여부
    pub created: bool,
}

/// 인벤토리 조정기
///
/// 서명별 레코드 존재 여부 판단은 이 타입만 담당합니다.
pub struct InventoryReconciler<'s, S: InventoryStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: InventoryStore + ?Sized> InventoryReconciler<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// 현재 시각으로 조정합니다.
    pub fn reconcile(
        &mut self,
        binary: &DiscoveredBinary,
        package_id: Option<i64>,
    ) -> Result<ReconcileOutcome, ScannerError> {
        self.reconcile_at(binary, package_id, Utc::now())
    }

    /// 지정한 시각으로 조정합니다.
    ///
    /// `package_id`가 `Some`이면 덮어쓰고, `None`이면 기존 값을 유지합니다.
    pub fn reconcile_at(
        &mut self,
        binary: &DiscoveredBinary,
        package_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, ScannerError> {
        let signature = binary.signature();
        let existing = self.store.find_record(&signature)?;
        let created = existing.is_none();

        let mut record = existing.unwrap_or_else(|| InventoryRecord::first_seen(binary, now));
        record.last_scan = now;
        if package_id.is_some() {
            record.package_id = package_id;
        }

        self.store.save_record(&mut record)?;

        debug!(
            file = %signature.file_name,
            path = %signature.file_path,
            record_id = ?record.id,
            created,
            "inventory record reconciled"
        );

        Ok(ReconcileOutcome { record, created })
    }
}
