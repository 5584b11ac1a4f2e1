//! 불량 버전 범위 평가
//!
//! 발견된 바이너리의 파일 버전/제품 버전이 패키지의 불량 버전 범위에
//! 들어가는지 판정합니다. 저장소 상태를 바꾸지 않는 순수 함수들입니다.
//!
//! # 판정 규칙
//!
//! 범위마다 네 경계를 각각 [`BoundStatus`]로 평가합니다.
//!
//! - `from`: 경계가 있고 발견된 버전이 경계보다 **엄격히 큼**이면 충족
//! - `to`: 경계가 있고 발견된 버전이 경계 **이하**이면 충족
//! - 경계가 없거나, 경계 또는 발견된 버전이 파싱되지 않으면 해당 없음
//!
//! 한 쪽(파일 또는 제품)은 다음 중 하나면 매칭입니다.
//!
//! | from | to | 결과 |
//! |------|----|------|
//! | 충족 | 해당 없음 | 매칭 (위쪽 열림) |
//! | 충족 | 충족 | 매칭 (닫힌 구간) |
//! | 해당 없음 | 충족 | 매칭 (아래쪽 열림) |
//!
//! 파일 쪽 또는 제품 쪽 중 하나라도 매칭되면 범위 전체가 매칭이며,
//! 범위 목록은 순서대로 평가하여 첫 매칭에서 멈춥니다.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::types::BadVersionRange;
use crate::version::DottedVersion;

/// 단일 경계의 평가 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundStatus {
    /// 경계가 있고 조건을 만족함
    Satisfied,
    /// 경계가 있지만 조건을 만족하지 않음
    NotSatisfied,
    /// 경계가 없거나 비교할 수 없음
    NotApplicable,
}

impl BoundStatus {
    fn from_comparison(ordering: Option<Ordering>, accept: impl Fn(Ordering) -> bool) -> Self {
        match ordering {
            None => Self::NotApplicable,
            Some(ordering) if accept(ordering) => Self::Satisfied,
            Some(_) => Self::NotSatisfied,
        }
    }
}

/// 한 범위에 대한 네 경계의 평가 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeEvaluation {
    pub file_from: BoundStatus,
    pub file_to: BoundStatus,
    pub product_from: BoundStatus,
    pub product_to: BoundStatus,
}

impl RangeEvaluation {
    /// 파일 버전 쪽이 매칭되는지 반환합니다.
    pub fn file_side_matches(&self) -> bool {
        side_matches(self.file_from, self.file_to)
    }

    /// 제품 버전 쪽이 매칭되는지 반환합니다.
    pub fn product_side_matches(&self) -> bool {
        side_matches(self.product_from, self.product_to)
    }

    /// 두 쪽 중 하나라도 매칭되면 `true`를 반환합니다.
    pub fn is_match(&self) -> bool {
        self.file_side_matches() || self.product_side_matches()
    }
}

/// 한 쪽의 from/to 평가 결과로 매칭 여부를 결정합니다.
pub fn side_matches(from: BoundStatus, to: BoundStatus) -> bool {
    use BoundStatus::{NotApplicable, Satisfied};

    matches!(
        (from, to),
        (Satisfied, NotApplicable) | (Satisfied, Satisfied) | (NotApplicable, Satisfied)
    )
}

/// 매칭된 범위와 그 평가 결과
#[derive(Debug, Clone, Copy)]
pub struct BadVersionMatch<'r> {
    pub range: &'r BadVersionRange,
    pub evaluation: RangeEvaluation,
}

/// 단일 범위의 네 경계를 평가합니다.
pub fn evaluate_range(
    file_version: &str,
    product_version: &str,
    range: &BadVersionRange,
) -> RangeEvaluation {
    let file = DottedVersion::parse(file_version).ok();
    let product = DottedVersion::parse(product_version).ok();

    RangeEvaluation {
        file_from: lower_bound(file.as_ref(), range.file_version_from.as_deref()),
        file_to: upper_bound(file.as_ref(), range.file_version_to.as_deref()),
        product_from: lower_bound(product.as_ref(), range.product_version_from.as_deref()),
        product_to: upper_bound(product.as_ref(), range.product_version_to.as_deref()),
    }
}

fn lower_bound(version: Option<&DottedVersion>, bound: Option<&str>) -> BoundStatus {
    BoundStatus::from_comparison(compare_to_bound(version, bound), |o| {
        o == Ordering::Greater
    })
}

fn upper_bound(version: Option<&DottedVersion>, bound: Option<&str>) -> BoundStatus {
    BoundStatus::from_comparison(compare_to_bound(version, bound), |o| {
        o != Ordering::Greater
    })
}

/// 발견된 버전과 경계를 비교합니다. 어느 한쪽이라도 없거나 파싱에 실패하면 `None`.
fn compare_to_bound(version: Option<&DottedVersion>, bound: Option<&str>) -> Option<Ordering> {
    let bound_str = bound?;
    let version = version?;
    match DottedVersion::parse(bound_str) {
        Ok(bound) => Some(version.cmp(&bound)),
        Err(e) => {
            debug!(bound = bound_str, error = %e, "ignoring malformed range bound");
            None
        }
    }
}

/// 범위 목록에서 첫 번째로 매칭되는 범위를 찾습니다.
pub fn find_bad_version<'r>(
    file_version: &str,
    product_version: &str,
    ranges: &'r [BadVersionRange],
) -> Option<BadVersionMatch<'r>> {
    ranges.iter().find_map(|range| {
        let evaluation = evaluate_range(file_version, product_version, range);
        evaluation
            .is_match()
            .then_some(BadVersionMatch { range, evaluation })
    })
}

/// 버전이 범위 목록 중 하나에 들어가는지 반환합니다. 실패하지 않습니다.
pub fn is_bad_version(file_version: &str, product_version: &str, ranges: &[BadVersionRange]) -> bool {
    find_bad_version(file_version, product_version, ranges).is_some()
}
