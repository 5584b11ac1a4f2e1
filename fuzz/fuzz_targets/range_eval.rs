#![no_main]

use arbitrary::Arbitrary;
use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use versentry_inventory::BadVersionRange;
use versentry_inventory::evaluator::{evaluate_range, find_bad_version};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    file_version: String,
    product_version: String,
    /// 범위 목록 (최대 8개로 제한)
    ranges: Vec<FuzzRange>,
}

#[derive(Arbitrary, Debug)]
struct FuzzRange {
    file_from: Option<String>,
    file_to: Option<String>,
    product_from: Option<String>,
    product_to: Option<String>,
}

fuzz_target!(|input: FuzzInput| {
    let now = Utc::now();
    let ranges: Vec<BadVersionRange> = input
        .ranges
        .into_iter()
        .take(8)
        .enumerate()
        .map(|(idx, r)| BadVersionRange {
            id: idx as i64 + 1,
            package_id: 1,
            file_version_from: r.file_from,
            file_version_to: r.file_to,
            product_version_from: r.product_from,
            product_version_to: r.product_to,
            created: now,
            updated: now,
            deleted: None,
        })
        .collect();

    let found = find_bad_version(&input.file_version, &input.product_version, &ranges);

    // 첫 번째로 매칭되는 범위가 반환되어야 함
    let first = ranges
        .iter()
        .position(|r| evaluate_range(&input.file_version, &input.product_version, r).is_match());
    assert_eq!(found.map(|m| m.range.id), first.map(|idx| idx as i64 + 1));
});
