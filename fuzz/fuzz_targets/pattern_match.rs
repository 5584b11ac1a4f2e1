#![no_main]

use arbitrary::Arbitrary;
use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use versentry_inventory::{Catalog, Package, PackageMatcher, RegexPackageMatcher};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 패키지별 파일 패턴 (최대 4개 패키지, 패키지당 4개 패턴)
    packages: Vec<Vec<String>>,
    file_name: String,
}

fuzz_target!(|input: FuzzInput| {
    let now = Utc::now();
    let packages: Vec<Package> = input
        .packages
        .into_iter()
        .take(4)
        .enumerate()
        .map(|(idx, patterns)| Package {
            id: idx as i64 + 1,
            name: format!("fuzz-{idx}"),
            file_patterns: patterns.into_iter().take(4).collect(),
            created: now,
            updated: now,
            deleted: None,
            nuget_url: None,
            info_url: None,
            repo_url: None,
        })
        .collect();

    let catalog = Catalog::new(packages, Vec::new());
    let mut matcher = RegexPackageMatcher::new();

    // 잘못된 패턴은 거부될 뿐 패닉하지 않아야 함
    matcher.prepare(&catalog);
    let _ = matcher.find_match(&input.file_name.to_lowercase(), &catalog);
});
