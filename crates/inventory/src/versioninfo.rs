//! 바이너리 버전 정보 추출
//!
//! [`VersionInfoReader`]는 파일에서 파일 버전과 제품 버전을 읽는 경계입니다.
//! 기본 구현인 [`PeVersionReader`]는 PE 이미지의 버전 리소스에 포함된
//! `VS_FIXEDFILEINFO` 구조체를 찾아 값을 읽습니다.
//!
//! # 탐색 방식
//!
//! 1. `MZ` 헤더와 `PE\0\0` 시그니처를 확인
//! 2. UTF-16LE `"VS_VERSION_INFO"` 키를 검색
//! 3. 키 직후 정렬 패딩 범위에서 `0xFEEF04BD` 시그니처를 검색
//! 4. 시그니처 뒤의 `dwFileVersionMS/LS`, `dwProductVersionMS/LS`를 읽음

use std::path::Path;

use crate::error::ScannerError;
use crate::types::VersionQuad;

/// `VS_FIXEDFILEINFO.dwSignature`
const FIXED_FILE_INFO_SIGNATURE: u32 = 0xFEEF_04BD;

/// `e_lfanew` 필드 오프셋
const PE_HEADER_OFFSET_FIELD: usize = 0x3C;

/// UTF-16LE 키 + 널 종료 문자 이후 시그니처를 찾을 범위 (바이트)
const SIGNATURE_SEARCH_WINDOW: usize = 8;

/// 바이너리에서 읽은 버전 쌍
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryVersionInfo {
    pub file_version: VersionQuad,
    pub product_version: VersionQuad,
}

/// 파일 버전 정보 리더
pub trait VersionInfoReader: Send {
    /// 파일에서 버전 정보를 읽습니다.
    ///
    /// 버전 리소스가 없으면 [`ScannerError::VersionInfoUnavailable`],
    /// 파일을 읽지 못하면 [`ScannerError::FileRead`]를 반환합니다.
    fn read_version_info(&self, path: &Path) -> Result<BinaryVersionInfo, ScannerError>;
}

/// PE 이미지 버전 리소스 리더
#[derive(Debug, Clone, Default)]
pub struct PeVersionReader;

impl PeVersionReader {
    pub fn new() -> Self {
        Self
    }

    /// 메모리에 올린 PE 이미지에서 버전 정보를 찾습니다.
    pub fn parse(bytes: &[u8]) -> Result<BinaryVersionInfo, &'static str> {
        if bytes.len() < PE_HEADER_OFFSET_FIELD + 4 || &bytes[..2] != b"MZ" {
            return Err("not a PE image");
        }

        let pe_offset = read_u32(bytes, PE_HEADER_OFFSET_FIELD).ok_or("truncated DOS header")? as usize;
        match bytes.get(pe_offset..pe_offset.saturating_add(4)) {
            Some(sig) if sig == b"PE\0\0" => {}
            _ => return Err("missing PE signature"),
        }

        let key = version_info_key();
        let mut search_from = 0;
        while let Some(found) = find(&bytes[search_from..], &key) {
            let key_end = search_from + found + key.len();
            if let Some(info) = fixed_file_info_after(bytes, key_end) {
                return Ok(info);
            }
            search_from = key_end;
        }

        Err("no version resource")
    }
}

impl VersionInfoReader for PeVersionReader {
    fn read_version_info(&self, path: &Path) -> Result<BinaryVersionInfo, ScannerError> {
        let bytes = std::fs::read(path).map_err(|e| ScannerError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::parse(&bytes).map_err(|reason| ScannerError::VersionInfoUnavailable {
            path: path.display().to_string(),
            reason: reason.to_owned(),
        })
    }
}

/// UTF-16LE `"VS_VERSION_INFO\0"`
fn version_info_key() -> Vec<u8> {
    "VS_VERSION_INFO\0"
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect()
}

fn fixed_file_info_after(bytes: &[u8], key_end: usize) -> Option<BinaryVersionInfo> {
    (key_end..key_end + SIGNATURE_SEARCH_WINDOW).find_map(|offset| {
        if read_u32(bytes, offset)? != FIXED_FILE_INFO_SIGNATURE {
            return None;
        }
        // dwSignature, dwStrucVersion 다음이 버전 필드
        let file_ms = read_u32(bytes, offset + 8)?;
        let file_ls = read_u32(bytes, offset + 12)?;
        let product_ms = read_u32(bytes, offset + 16)?;
        let product_ls = read_u32(bytes, offset + 20)?;
        Some(BinaryVersionInfo {
            file_version: VersionQuad::from_words(file_ms, file_ls),
            product_version: VersionQuad::from_words(product_ms, product_ls),
        })
    })
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 버전 리소스를 포함한 최소 PE 이미지를 만듭니다.
    pub(crate) fn synthetic_pe(file: VersionQuad, product: VersionQuad) -> Vec<u8> {
        let mut image = vec![0u8; 0x100];
        image[0..2].copy_from_slice(b"MZ");
        image[PE_HEADER_OFFSET_FIELD..PE_HEADER_OFFSET_FIELD + 4]
            .copy_from_slice(&0x40u32.to_le_bytes());
        image[0x40..0x44].copy_from_slice(b"PE\0\0");

        // VS_VERSIONINFO: wLength, wValueLength, wType
        image.extend_from_slice(&0x0200u16.to_le_bytes());
        image.extend_from_slice(&52u16.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&version_info_key());
        image.extend_from_slice(&[0, 0]); // 4바이트 정렬 패딩

        let word = |hi: u16, lo: u16| ((hi as u32) << 16) | lo as u32;
        image.extend_from_slice(&FIXED_FILE_INFO_SIGNATURE.to_le_bytes());
        image.extend_from_slice(&0x0001_0000u32.to_le_bytes());
        image.extend_from_slice(&word(file.major, file.minor).to_le_bytes());
        image.extend_from_slice(&word(file.build, file.private).to_le_bytes());
        image.extend_from_slice(&word(product.major, product.minor).to_le_bytes());
        image.extend_from_slice(&word(product.build, product.private).to_le_bytes());
        image.extend_from_slice(&[0u8; 28]);
        image
    }

    #[test]
    fn parses_fixed_file_info() {
        let image = synthetic_pe(VersionQuad::new(4, 7, 3062, 0), VersionQuad::new(4, 7, 0, 0));
        let info = PeVersionReader::parse(&image).expect("should parse");

        assert_eq!(info.file_version, VersionQuad::new(4, 7, 3062, 0));
        assert_eq!(info.product_version, VersionQuad::new(4, 7, 0, 0));
    }

    #[test]
    fn rejects_non_pe() {
        assert_eq!(PeVersionReader::parse(b"hello world"), Err("not a PE image"));
        assert_eq!(PeVersionReader::parse(&[0u8; 512]), Err("not a PE image"));
    }

    #[test]
    fn rejects_missing_pe_signature() {
        let mut image = synthetic_pe(VersionQuad::default(), VersionQuad::default());
        image[0x40..0x44].copy_from_slice(b"XX\0\0");
        assert_eq!(PeVersionReader::parse(&image), Err("missing PE signature"));
    }

    #[test]
    fn rejects_image_without_version_resource() {
        let mut image = vec![0u8; 0x80];
        image[0..2].copy_from_slice(b"MZ");
        image[PE_HEADER_OFFSET_FIELD..PE_HEADER_OFFSET_FIELD + 4]
            .copy_from_slice(&0x40u32.to_le_bytes());
        image[0x40..0x44].copy_from_slice(b"PE\0\0");

        assert_eq!(PeVersionReader::parse(&image), Err("no version resource"));
    }

    #[test]
    fn truncated_fixed_info_is_unavailable() {
        let image = synthetic_pe(VersionQuad::new(1, 2, 3, 4), VersionQuad::new(1, 2, 3, 4));
        let key_at = find(&image, &version_info_key()).expect("key present");
        let truncated = &image[..key_at + version_info_key().len() + 10];

        assert_eq!(PeVersionReader::parse(truncated), Err("no version resource"));
    }

    #[test]
    fn read_version_info_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.dll");
        std::fs::write(
            &path,
            synthetic_pe(VersionQuad::new(13, 0, 1, 25517), VersionQuad::new(13, 0, 1, 0)),
        )
        .unwrap();

        let info = PeVersionReader::new().read_version_info(&path).unwrap();
        assert_eq!(info.file_version.to_string(), "13.0.1.25517");
        assert_eq!(info.product_version.to_string(), "13.0.1.0");
    }

    #[test]
    fn text_file_is_version_info_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readme.dll");
        std::fs::write(&path, "not a binary").unwrap();

        let err = PeVersionReader::new().read_version_info(&path).unwrap_err();
        assert!(matches!(err, ScannerError::VersionInfoUnavailable { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PeVersionReader::new()
            .read_version_info(&dir.path().join("missing.dll"))
            .unwrap_err();
        assert!(matches!(err, ScannerError::FileRead { .. }));
    }
}
