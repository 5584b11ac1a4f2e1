#![no_main]

use std::cmp::Ordering;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use versentry_inventory::version::{DottedVersion, compare};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    left: String,
    right: String,
}

fuzz_target!(|input: FuzzInput| {
    let forward = compare(&input.left, &input.right);
    let backward = compare(&input.right, &input.left);

    // 한쪽이라도 파싱 실패면 양방향 모두 실패해야 함
    assert_eq!(forward.is_ok(), backward.is_ok());

    if let (Ok(f), Ok(b)) = (forward, backward) {
        assert_eq!(f, b.reverse());
    }

    if let Ok(version) = DottedVersion::parse(&input.left) {
        assert_eq!(version.cmp(&version), Ordering::Equal);
        let reparsed = DottedVersion::parse(&version.to_string());
        assert_eq!(reparsed.map(|v| v.cmp(&version)).ok(), Some(Ordering::Equal));
    }
});
