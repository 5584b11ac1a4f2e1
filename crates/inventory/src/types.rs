//! 인벤토리 도메인 타입
//!
//! 패키지 카탈로그, 불량 버전 범위, 발견된 바이너리, 인벤토리 레코드를 정의합니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 4개 구간으로 이루어진 바이너리 버전 (major.minor.build.private)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionQuad {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub private: u16,
}

impl VersionQuad {
    /// 구간 값으로 버전을 생성합니다.
    pub const fn new(major: u16, minor: u16, build: u16, private: u16) -> Self {
        Self {
            major,
            minor,
            build,
            private,
        }
    }

    /// 상위/하위 32비트 워드 쌍에서 버전을 생성합니다.
    ///
    /// 각 워드의 상위 16비트가 앞 구간, 하위 16비트가 뒤 구간입니다.
    pub const fn from_words(ms: u32, ls: u32) -> Self {
        Self {
            major: (ms >> 16) as u16,
            minor: (ms & 0xFFFF) as u16,
            build: (ls >> 16) as u16,
            private: (ls & 0xFFFF) as u16,
        }
    }
}

impl fmt::Display for VersionQuad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.private
        )
    }
}

/// 스캔을 실행하는 호스트 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    /// 머신 이름
    pub name: String,
    /// 중복 제거 후 정렬하여 `", "`로 연결한 IP 주소 목록
    pub ips: String,
}

/// 알려진 서드파티 패키지
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: i64,
    pub name: String,
    /// 소문자 파일명에 대해 검사하는 정규식 패턴 목록
    pub file_patterns: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted: Option<DateTime<Utc>>,
    pub nuget_url: Option<String>,
    pub info_url: Option<String>,
    pub repo_url: Option<String>,
}

impl Package {
    /// 소프트 삭제된 패키지인지 반환합니다.
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

/// 특정 패키지의 알려진 불량 버전 범위
///
/// 네 경계는 모두 선택 사항입니다. `from`은 초과(배타), `to`는 이하(포함)로 비교합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadVersionRange {
    pub id: i64,
    pub package_id: i64,
    pub file_version_from: Option<String>,
    pub file_version_to: Option<String>,
    pub product_version_from: Option<String>,
    pub product_version_to: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted: Option<DateTime<Utc>>,
}

impl BadVersionRange {
    /// 소프트 삭제된 범위인지 반환합니다.
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

impl fmt::Display for BadVersionRange {
    /// 없는 경계는 `*`로 표시합니다.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bound(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("*")
        }
        write!(
            f,
            "FileVersion: from:{} - to:{} - ProductVersion: from:{} - to:{}",
            bound(&self.file_version_from),
            bound(&self.file_version_to),
            bound(&self.product_version_from),
            bound(&self.product_version_to),
        )
    }
}

/// 인벤토리 레코드 식별 키
///
/// 버전이 바뀐 바이너리는 다른 서명을 가지므로 새 레코드가 됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub server_name: String,
    pub file_path: String,
    pub file_name: String,
    pub file_version: String,
    pub product_version: String,
}

/// 이번 스윕에서 발견한 바이너리
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredBinary {
    pub host: HostIdentity,
    /// 소문자로 정규화된 디렉토리 경로
    pub directory: String,
    /// 소문자로 정규화된 파일명
    pub file_name: String,
    pub file_size: u64,
    pub file_version: VersionQuad,
    pub product_version: VersionQuad,
}

impl DiscoveredBinary {
    /// 인벤토리 조회에 사용할 서명을 만듭니다.
    pub fn signature(&self) -> Signature {
        Signature {
            server_name: self.host.name.clone(),
            file_path: self.directory.clone(),
            file_name: self.file_name.clone(),
            file_version: self.file_version.to_string(),
            product_version: self.product_version.to_string(),
        }
    }
}

/// 인벤토리 저장소의 한 행
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// 저장 전에는 `None`
    pub id: Option<i64>,
    pub created: DateTime<Utc>,
    pub last_scan: DateTime<Utc>,
    pub package_id: Option<i64>,
    pub server_name: String,
    pub server_ips: String,
    pub file_path: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_version: VersionQuad,
    pub product_version: VersionQuad,
}

impl InventoryRecord {
    /// 처음 관측된 바이너리로 새 레코드를 만듭니다.
    pub fn first_seen(binary: &DiscoveredBinary, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            created: now,
            last_scan: now,
            package_id: None,
            server_name: binary.host.name.clone(),
            server_ips: binary.host.ips.clone(),
            file_path: binary.directory.clone(),
            file_name: binary.file_name.clone(),
            file_size: binary.file_size,
            file_version: binary.file_version,
            product_version: binary.product_version,
        }
    }

    /// 레코드의 서명을 반환합니다.
    pub fn signature(&self) -> Signature {
        Signature {
            server_name: self.server_name.clone(),
            file_path: self.file_path.clone(),
            file_name: self.file_name.clone(),
            file_version: self.file_version.to_string(),
            product_version: self.product_version.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_binary() -> DiscoveredBinary {
        DiscoveredBinary {
            host: HostIdentity {
                name: "web01".to_owned(),
                ips: "10.0.0.5, 192.168.1.20".to_owned(),
            },
            directory: "c:\\program files\\myapp".to_owned(),
            file_name: "newtonsoft.json.dll".to_owned(),
            file_size: 4096,
            file_version: VersionQuad::new(12, 0, 1, 0),
            product_version: VersionQuad::new(12, 0, 0, 0),
        }
    }

    #[test]
    fn version_quad_display() {
        assert_eq!(VersionQuad::new(4, 7, 3062, 0).to_string(), "4.7.3062.0");
    }

    #[test]
    fn version_quad_from_words() {
        let v = VersionQuad::from_words(0x0004_0007, 0x0BF6_0001);
        assert_eq!(v, VersionQuad::new(4, 7, 3062, 1));
    }

    #[test]
    fn range_display_uses_star_for_missing_bounds() {
        let now = Utc::now();
        let range = BadVersionRange {
            id: 1,
            package_id: 7,
            file_version_from: Some("1.0".to_owned()),
            file_version_to: None,
            product_version_from: None,
            product_version_to: Some("2.0".to_owned()),
            created: now,
            updated: now,
            deleted: None,
        };
        assert_eq!(
            range.to_string(),
            "FileVersion: from:1.0 - to:* - ProductVersion: from:* - to:2.0"
        );
    }

    #[test]
    fn binary_signature_uses_composed_versions() {
        let sig = sample_binary().signature();
        assert_eq!(sig.server_name, "web01");
        assert_eq!(sig.file_version, "12.0.1.0");
        assert_eq!(sig.product_version, "12.0.0.0");
    }

    #[test]
    fn first_seen_record_matches_binary_signature() {
        let binary = sample_binary();
        let now = Utc::now();
        let record = InventoryRecord::first_seen(&binary, now);

        assert!(record.id.is_none());
        assert!(record.package_id.is_none());
        assert_eq!(record.created, now);
        assert_eq!(record.last_scan, now);
        assert_eq!(record.server_ips, "10.0.0.5, 192.168.1.20");
        assert_eq!(record.signature(), binary.signature());
    }
}
