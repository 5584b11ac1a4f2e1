//! 점으로 구분된 숫자 버전 비교
//!
//! `"1.2.3.4"` 형식의 버전을 구간별 정수로 비교합니다.
//! 구간 수는 제한이 없으며 부족한 구간은 0으로 간주합니다 (`"1.2"` == `"1.2.0.0"`).
//! 빈 문자열, 빈 구간, 숫자가 아닌 구간은 [`ScannerError::InvalidVersionFormat`]입니다.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ScannerError;

/// 파싱된 점 구분 버전
#[derive(Debug, Clone)]
pub struct DottedVersion {
    segments: Vec<u64>,
}

impl DottedVersion {
    /// 버전 문자열을 파싱합니다. 앞뒤 공백은 무시합니다.
    pub fn parse(input: &str) -> Result<Self, ScannerError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid(input, "version is empty"));
        }

        let segments = trimmed
            .split('.')
            .map(|segment| parse_segment(input, segment))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// 파싱된 구간 값을 반환합니다.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }
}

fn parse_segment(input: &str, segment: &str) -> Result<u64, ScannerError> {
    if segment.is_empty() {
        return Err(invalid(input, "empty segment"));
    }
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(
            input,
            &format!("segment '{segment}' is not a non-negative integer"),
        ));
    }
    segment
        .parse::<u64>()
        .map_err(|e| invalid(input, &format!("segment '{segment}': {e}")))
}

fn invalid(input: &str, reason: &str) -> ScannerError {
    ScannerError::InvalidVersionFormat {
        version: input.to_owned(),
        reason: reason.to_owned(),
    }
}

impl FromStr for DottedVersion {
    type Err = ScannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// 뒤쪽 0 구간을 무시하므로 derive 대신 cmp 기준으로 비교
impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DottedVersion {}

/// 두 버전 문자열을 비교합니다.
///
/// 둘 중 하나라도 파싱에 실패하면 에러를 반환합니다.
pub fn compare(a: &str, b: &str) -> Result<Ordering, ScannerError> {
    let a = DottedVersion::parse(a)?;
    let b = DottedVersion::parse(b)?;
    Ok(a.cmp(&b))
}
