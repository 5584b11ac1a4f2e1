//! 파일명 기반 패키지 매칭
//!
//! [`PackageMatcher`]는 파일명을 카탈로그의 패키지와 연결하는 전략입니다.
//! 기본 구현인 [`RegexPackageMatcher`]는 패키지의 파일명 패턴을 정규식으로
//! 미리 컴파일해 두고, 카탈로그 순서대로 검사하여 첫 번째로 매칭된 패키지를 반환합니다.
//!
//! 컴파일에 실패한 패턴은 경고를 남기고 매칭되지 않는 패턴으로 취급합니다.

use std::collections::HashMap;

use regex::Regex;
use tracing::warn;

use crate::catalog::Catalog;
use crate::error::ScannerError;
use crate::types::Package;

/// 파일명 -> 패키지 매칭 전략
pub trait PackageMatcher: Send {
    /// 로그에 표시할 전략 이름
    fn strategy(&self) -> &'static str;

    /// 스윕 시작 시 카탈로그로 한 번 호출됩니다.
    fn prepare(&mut self, catalog: &Catalog);

    /// 소문자 파일명에 매칭되는 첫 번째 패키지를 반환합니다.
    fn find_match<'c>(&self, file_name: &str, catalog: &'c Catalog) -> Option<&'c Package>;
}

/// 정규식 파일명 매처
///
/// 패턴은 앵커 없이 부분 매칭(`is_match`)으로 검사합니다.
pub struct RegexPackageMatcher {
    /// 컴파일된 정규식 캐시: (package_id, pattern_index) -> Regex
    regex_cache: HashMap<(i64, usize), Regex>,
    /// 컴파일에 실패한 패턴 수
    rejected: usize,
}

impl RegexPackageMatcher {
    /// 빈 매처를 생성합니다.
    pub fn new() -> Self {
        Self {
            regex_cache: HashMap::new(),
            rejected: 0,
        }
    }

    /// 카탈로그의 모든 패턴을 컴파일한 매처를 생성합니다.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        let mut matcher = Self::new();
        matcher.prepare(catalog);
        matcher
    }

    /// 패키지의 패턴을 컴파일하여 캐싱합니다.
    ///
    /// 실패한 패턴은 캐시에 넣지 않고 에러 목록으로 반환합니다.
    pub fn compile_package(&mut self, package: &Package) -> Vec<ScannerError> {
        let mut errors = Vec::new();
        for (idx, pattern) in package.file_patterns.iter().enumerate() {
            match Regex::new(pattern) {
                Ok(regex) => {
                    self.regex_cache.insert((package.id, idx), regex);
                }
                Err(e) => {
                    self.rejected += 1;
                    errors.push(ScannerError::PatternCompile {
                        package: package.name.clone(),
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        errors
    }

    /// 컴파일된 패턴 수
    pub fn compiled_patterns(&self) -> usize {
        self.regex_cache.len()
    }

    /// 컴파일에 실패한 패턴 수
    pub fn rejected_patterns(&self) -> usize {
        self.rejected
    }

    fn package_matches(&self, package: &Package, file_name: &str) -> bool {
        (0..package.file_patterns.len()).any(|idx| {
            self.regex_cache
                .get(&(package.id, idx))
                .is_some_and(|regex| regex.is_match(file_name))
        })
    }
}

impl Default for RegexPackageMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageMatcher for RegexPackageMatcher {
    fn strategy(&self) -> &'static str {
        "regex"
    }

    fn prepare(&mut self, catalog: &Catalog) {
        self.regex_cache.clear();
        self.rejected = 0;

        for package in catalog.packages() {
            for err in self.compile_package(package) {
                warn!(error = %err, "pattern treated as non-matching");
            }
        }
    }

    fn find_match<'c>(&self, file_name: &str, catalog: &'c Catalog) -> Option<&'c Package> {
        catalog
            .packages()
            .iter()
            .filter(|package| !package.file_patterns.is_empty())
            .find(|package| self.package_matches(package, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn package(id: i64, name: &str, patterns: &[&str]) -> Package {
        let now = Utc::now();
        Package {
            id,
            name: name.to_owned(),
            file_patterns: patterns.iter().map(|p| (*p).to_owned()).collect(),
            created: now,
            updated: now,
            deleted: None,
            nuget_url: None,
            info_url: None,
            repo_url: None,
        }
    }

    #[test]
    fn first_match_wins() {
        let catalog = Catalog::new(
            vec![
                package(1, "A", &[r"^foo.*\.dll$"]),
                package(2, "B", &[r".*\.dll$"]),
            ],
            vec![],
        );
        let matcher = RegexPackageMatcher::for_catalog(&catalog);

        let found = matcher.find_match("foo.dll", &catalog).expect("should match");
        assert_eq!(found.name, "A");

        let found = matcher.find_match("bar.dll", &catalog).expect("should match");
        assert_eq!(found.name, "B");
    }

    #[test]
    fn catalog_order_decides_not_pattern_specificity() {
        let catalog = Catalog::new(
            vec![
                package(2, "B", &[r".*\.dll$"]),
                package(1, "A", &[r"^foo.*\.dll$"]),
            ],
            vec![],
        );
        let matcher = RegexPackageMatcher::for_catalog(&catalog);

        let found = matcher.find_match("foo.dll", &catalog).expect("should match");
        assert_eq!(found.name, "B");
    }

    #[test]
    fn empty_pattern_list_never_matches() {
        let catalog = Catalog::new(vec![package(1, "Empty", &[])], vec![]);
        let matcher = RegexPackageMatcher::for_catalog(&catalog);

        assert!(matcher.find_match("anything.dll", &catalog).is_none());
        assert!(matcher.find_match("", &catalog).is_none());
    }

    #[test]
    fn malformed_pattern_is_non_matching() {
        let catalog = Catalog::new(
            vec![
                package(1, "Broken", &["([unclosed"]),
                package(2, "Fallback", &[r"\.dll$"]),
            ],
            vec![],
        );
        let matcher = RegexPackageMatcher::for_catalog(&catalog);

        assert_eq!(matcher.rejected_patterns(), 1);
        assert_eq!(matcher.compiled_patterns(), 1);
        let found = matcher.find_match("([unclosed.dll", &catalog).expect("should match");
        assert_eq!(found.name, "Fallback");
    }

    #[test]
    fn malformed_pattern_does_not_hide_valid_sibling() {
        let catalog = Catalog::new(
            vec![package(1, "Mixed", &["*bad", r"^log4net\.dll$"])],
            vec![],
        );
        let matcher = RegexPackageMatcher::for_catalog(&catalog);

        assert_eq!(matcher.rejected_patterns(), 1);
        let found = matcher.find_match("log4net.dll", &catalog).expect("should match");
        assert_eq!(found.id, 1);
    }

    #[test]
    fn compile_package_reports_pattern_errors() {
        let mut matcher = RegexPackageMatcher::new();
        let errors = matcher.compile_package(&package(7, "Bad", &["[z-a]"]));

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ScannerError::PatternCompile { package, pattern, .. }
                if package == "Bad" && pattern == "[z-a]"
        ));
    }

    #[test]
    fn deleted_packages_are_never_matched() {
        let mut deleted = package(1, "Gone", &[r"\.dll$"]);
        deleted.deleted = Some(Utc::now());
        let catalog = Catalog::new(vec![deleted], vec![]);
        let matcher = RegexPackageMatcher::for_catalog(&catalog);

        assert!(matcher.find_match("x.dll", &catalog).is_none());
    }

    #[test]
    fn patterns_are_unanchored() {
        let catalog = Catalog::new(vec![package(1, "Json", &["newtonsoft"])], vec![]);
        let matcher = RegexPackageMatcher::for_catalog(&catalog);

        assert!(matcher.find_match("newtonsoft.json.dll", &catalog).is_some());
        assert!(matcher.find_match("my.newtonsoft.shim.dll", &catalog).is_some());
    }

    #[test]
    fn uncompiled_matcher_matches_nothing() {
        let catalog = Catalog::new(vec![package(1, "A", &[".*"])], vec![]);
        let matcher = RegexPackageMatcher::new();

        assert!(matcher.find_match("a.dll", &catalog).is_none());
    }

    #[test]
    fn prepare_resets_previous_cache() {
        let first = Catalog::new(vec![package(1, "A", &["a", "b"])], vec![]);
        let second = Catalog::new(vec![package(2, "B", &["c"])], vec![]);
        let mut matcher = RegexPackageMatcher::for_catalog(&first);
        assert_eq!(matcher.compiled_patterns(), 2);

        matcher.prepare(&second);
        assert_eq!(matcher.compiled_patterns(), 1);
        assert_eq!(matcher.strategy(), "regex");
    }
}
