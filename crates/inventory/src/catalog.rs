//! 스윕 단위 패키지 카탈로그
//!
//! 패키지와 불량 버전 범위를 스윕 시작 시 한 번 로드하여 불변 객체로 보관합니다.
//! 소프트 삭제된 행은 로드 시 제외되며, 스윕 도중에는 갱신하지 않습니다.

use std::collections::HashMap;

use tracing::info;

use crate::error::ScannerError;
use crate::store::InventoryStore;
use crate::types::{BadVersionRange, Package};

/// 패키지 목록과 패키지별 불량 버전 범위
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// 로드 순서를 유지한 패키지 목록
    packages: Vec<Package>,
    /// 패키지 ID별 범위 목록 (로드 순서 유지)
    ranges: HashMap<i64, Vec<BadVersionRange>>,
}

impl Catalog {
    /// 패키지와 범위 목록으로 카탈로그를 만듭니다.
    ///
    /// 삭제된 패키지와 범위는 버립니다.
    pub fn new(packages: Vec<Package>, ranges: Vec<BadVersionRange>) -> Self {
        let packages: Vec<Package> = packages.into_iter().filter(|p| !p.is_deleted()).collect();

        let mut grouped: HashMap<i64, Vec<BadVersionRange>> = HashMap::new();
        for range in ranges.into_iter().filter(|r| !r.is_deleted()) {
            grouped.entry(range.package_id).or_default().push(range);
        }

        Self {
            packages,
            ranges: grouped,
        }
    }

    /// 저장소에서 카탈로그를 로드합니다.
    pub fn load<S: InventoryStore + ?Sized>(store: &S) -> Result<Self, ScannerError> {
        let packages = store.load_packages()?;
        let ranges = store.load_bad_version_ranges()?;
        let catalog = Self::new(packages, ranges);

        info!(
            packages = catalog.package_count(),
            ranges = catalog.range_count(),
            "package catalog loaded"
        );

        Ok(catalog)
    }

    /// 매칭 대상 패키지를 로드 순서대로 반환합니다.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// 패키지의 불량 버전 범위를 반환합니다. 없으면 빈 슬라이스.
    pub fn ranges_for(&self, package_id: i64) -> &[BadVersionRange] {
        self.ranges
            .get(&package_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn range_count(&self) -> usize {
        self.ranges.values().map(Vec::len).sum()
    }
}
