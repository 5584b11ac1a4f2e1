//! SQLite 저장소를 사용한 스윕 테스트

use std::fs;
use std::path::Path;

use chrono::Utc;
use versentry_core::config::FolderEntry;
use versentry_inventory::{
    BadVersionRange, BinaryVersionInfo, HostIdentity, InventoryScannerBuilder, Package,
    ScannerError, SqliteStore, VersionInfoReader, VersionQuad,
};

/// 모든 파일에 같은 버전을 돌려주는 리더
struct FixedVersionReader(VersionQuad);

impl VersionInfoReader for FixedVersionReader {
    fn read_version_info(&self, _path: &Path) -> Result<BinaryVersionInfo, ScannerError> {
        Ok(BinaryVersionInfo {
            file_version: self.0,
            product_version: self.0,
        })
    }
}

fn host() -> HostIdentity {
    HostIdentity {
        name: "db-host".to_owned(),
        ips: "192.168.0.10".to_owned(),
    }
}

fn package(name: &str, patterns: &[&str], deleted: bool) -> Package {
    let now = Utc::now();
    Package {
        id: 0,
        name: name.to_owned(),
        file_patterns: patterns.iter().map(|p| (*p).to_owned()).collect(),
        created: now,
        updated: now,
        deleted: deleted.then_some(now),
        nuget_url: None,
        info_url: None,
        repo_url: None,
    }
}

fn product_range(package_id: i64, from: &str) -> BadVersionRange {
    let now = Utc::now();
    BadVersionRange {
        id: 0,
        package_id,
        file_version_from: None,
        file_version_to: None,
        product_version_from: Some(from.to_owned()),
        product_version_to: None,
        created: now,
        updated: now,
        deleted: None,
    }
}

#[test]
fn sweep_persists_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("inventory.db");
    let scan_dir = dir.path().join("bin");
    fs::create_dir(&scan_dir).unwrap();
    fs::write(scan_dir.join("System.Text.Json.dll"), b"x").unwrap();
    fs::write(scan_dir.join("Unknown.dll"), b"x").unwrap();

    let package_id = {
        let store = SqliteStore::open(&db_path).unwrap();
        let id = store
            .insert_package(&package("System.Text.Json", &[r"^system\.text\.json\.dll$"], false))
            .unwrap();
        store.insert_bad_version_range(&product_range(id, "8.0.0.0")).unwrap();
        id
    };

    let folders = vec![FolderEntry {
        path: scan_dir.display().to_string(),
        include_subfolders: false,
    }];

    for _ in 0..2 {
        let store = SqliteStore::open(&db_path).unwrap();
        let mut scanner = InventoryScannerBuilder::new(store)
            .host(host())
            .folders(folders.clone())
            .version_reader(Box::new(FixedVersionReader(VersionQuad::new(8, 0, 4, 0))))
            .build()
            .unwrap();

        let report = scanner.run().unwrap();
        assert_eq!(report.files_inventoried(), 2);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].package_id, package_id);
    }

    let store = SqliteStore::open(&db_path).unwrap();
    let records = store.records().unwrap();
    assert_eq!(records.len(), 2);

    let json = records
        .iter()
        .find(|r| r.file_name == "system.text.json.dll")
        .unwrap();
    assert_eq!(json.package_id, Some(package_id));
    assert_eq!(json.file_version.to_string(), "8.0.4.0");
    assert!(json.last_scan >= json.created);

    let unknown = records.iter().find(|r| r.file_name == "unknown.dll").unwrap();
    assert_eq!(unknown.package_id, None);
}

#[test]
fn soft_deleted_package_is_not_matched() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("legacy.dll"), b"x").unwrap();

    let store = SqliteStore::open_in_memory().unwrap();
    let id = store
        .insert_package(&package("Legacy", &[r"^legacy\.dll$"], true))
        .unwrap();
    store.insert_bad_version_range(&product_range(id, "0.1")).unwrap();

    let mut scanner = InventoryScannerBuilder::new(store)
        .host(host())
        .folders(vec![FolderEntry {
            path: dir.path().display().to_string(),
            include_subfolders: false,
        }])
        .version_reader(Box::new(FixedVersionReader(VersionQuad::new(1, 0, 0, 0))))
        .build()
        .unwrap();

    assert_eq!(scanner.catalog().package_count(), 0);
    let report = scanner.run().unwrap();
    assert_eq!(report.unmatched(), 1);
    assert!(report.alerts.is_empty());
}

#[test]
fn malformed_stored_pattern_does_not_stop_sweep() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.dll"), b"x").unwrap();

    let store = SqliteStore::open_in_memory().unwrap();
    store
        .insert_package(&package("Broken", &["(unclosed"], false))
        .unwrap();
    store
        .insert_package(&package("Catchall", &[r"\.dll$"], false))
        .unwrap();

    let mut scanner = InventoryScannerBuilder::new(store)
        .host(host())
        .folders(vec![FolderEntry {
            path: dir.path().display().to_string(),
            include_subfolders: false,
        }])
        .version_reader(Box::new(FixedVersionReader(VersionQuad::new(1, 0, 0, 0))))
        .build()
        .unwrap();

    let report = scanner.run().unwrap();
    assert_eq!(report.unmatched(), 0);

    let records = scanner.store().records().unwrap();
    assert_eq!(records[0].package_id, Some(2));
}
