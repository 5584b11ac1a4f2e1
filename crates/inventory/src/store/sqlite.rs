//! SQLite 인벤토리 저장소
//!
//! 세 개의 테이블(`packages`, `bad_version_ranges`, `inventory_records`)을 사용합니다.
//! 테이블이 없으면 연결 시 생성합니다. 타임스탬프는 RFC 3339 문자열로 저장합니다.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;
use versentry_core::config::DatabaseConfig;
use versentry_core::error::StoreError;

use super::{InventoryStore, parse_file_patterns};
use crate::types::{BadVersionRange, InventoryRecord, Package, Signature, VersionQuad};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS packages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created TEXT NOT NULL,
    updated TEXT NOT NULL,
    deleted TEXT,
    name TEXT NOT NULL,
    file_patterns TEXT NOT NULL DEFAULT '[]',
    nuget_url TEXT,
    info_url TEXT,
    repo_url TEXT
);

CREATE TABLE IF NOT EXISTS bad_version_ranges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created TEXT NOT NULL,
    updated TEXT NOT NULL,
    deleted TEXT,
    package_id INTEGER NOT NULL REFERENCES packages(id),
    file_version_from TEXT,
    file_version_to TEXT,
    product_version_from TEXT,
    product_version_to TEXT
);

CREATE TABLE IF NOT EXISTS inventory_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created TEXT NOT NULL,
    last_scan TEXT NOT NULL,
    package_id INTEGER REFERENCES packages(id),
    server_name TEXT NOT NULL,
    server_ips TEXT NOT NULL,
    file_path TEXT NOT NULL,
    file_name TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    file_version TEXT NOT NULL,
    file_version_major INTEGER NOT NULL,
    file_version_minor INTEGER NOT NULL,
    file_version_build INTEGER NOT NULL,
    file_version_private INTEGER NOT NULL,
    product_version TEXT NOT NULL,
    product_version_major INTEGER NOT NULL,
    product_version_minor INTEGER NOT NULL,
    product_version_build INTEGER NOT NULL,
    product_version_private INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_inventory_signature
    ON inventory_records(server_name, file_path, file_name, file_version, product_version);

CREATE INDEX IF NOT EXISTS idx_ranges_package
    ON bad_version_ranges(package_id);
"#;

const RECORD_COLUMNS: &str = "id, created, last_scan, package_id, server_name, server_ips, \
     file_path, file_name, file_size, \
     file_version_major, file_version_minor, file_version_build, file_version_private, \
     product_version_major, product_version_minor, product_version_build, product_version_private";

/// SQLite 파일 기반 저장소
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// 데이터베이스 파일을 열고 스키마를 준비합니다. 파일이 없으면 생성합니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Connection(format!("{}: {e}", path.display())))?;
        let store = Self { conn };
        store.init_schema()?;
        debug!(path = %path.display(), "inventory store opened");
        Ok(store)
    }

    /// 메모리 데이터베이스를 엽니다.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Connection(e.to_string()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// 설정의 `database` 값을 파일 경로로 사용하여 저장소를 엽니다.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, StoreError> {
        if config.database.trim().is_empty() {
            return Err(StoreError::Connection(
                "database path must not be empty".to_owned(),
            ));
        }
        Self::open(&config.database)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(|e| StoreError::Connection(format!("schema bootstrap failed: {e}")))
    }

    /// 패키지를 삽입하고 새 ID를 반환합니다. `package.id`는 무시합니다.
    pub fn insert_package(&self, package: &Package) -> Result<i64, StoreError> {
        let patterns = serde_json::to_string(&package.file_patterns)
            .map_err(|e| StoreError::Query(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO packages (created, updated, deleted, name, file_patterns, nuget_url, info_url, repo_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    package.created.to_rfc3339(),
                    package.updated.to_rfc3339(),
                    package.deleted.map(|d| d.to_rfc3339()),
                    package.name,
                    patterns,
                    package.nuget_url,
                    package.info_url,
                    package.repo_url,
                ],
            )
            .map_err(query_failed)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 불량 버전 범위를 삽입하고 새 ID를 반환합니다. `range.id`는 무시합니다.
    pub fn insert_bad_version_range(&self, range: &BadVersionRange) -> Result<i64, StoreError> {
        self.conn
            .execute(
                "INSERT INTO bad_version_ranges
                 (created, updated, deleted, package_id, file_version_from, file_version_to, product_version_from, product_version_to)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    range.created.to_rfc3339(),
                    range.updated.to_rfc3339(),
                    range.deleted.map(|d| d.to_rfc3339()),
                    range.package_id,
                    range.file_version_from,
                    range.file_version_to,
                    range.product_version_from,
                    range.product_version_to,
                ],
            )
            .map_err(query_failed)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 모든 인벤토리 레코드를 ID 순서로 반환합니다.
    pub fn records(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM inventory_records ORDER BY id");
        let mut stmt = self.conn.prepare(&sql).map_err(query_failed)?;
        let rows = stmt
            .query_map([], RecordRow::from_row)
            .map_err(query_failed)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_failed)?;
        rows.into_iter().map(RecordRow::into_record).collect()
    }
}

impl InventoryStore for SqliteStore {
    fn load_packages(&self) -> Result<Vec<Package>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, created, updated, deleted, name, file_patterns, nuget_url, info_url, repo_url
                 FROM packages WHERE deleted IS NULL ORDER BY id",
            )
            .map_err(query_failed)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(PackageRow {
                    id: row.get(0)?,
                    created: row.get(1)?,
                    updated: row.get(2)?,
                    deleted: row.get(3)?,
                    name: row.get(4)?,
                    file_patterns: row.get(5)?,
                    nuget_url: row.get(6)?,
                    info_url: row.get(7)?,
                    repo_url: row.get(8)?,
                })
            })
            .map_err(query_failed)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_failed)?;

        rows.into_iter().map(PackageRow::into_package).collect()
    }

    fn load_bad_version_ranges(&self) -> Result<Vec<BadVersionRange>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, created, updated, deleted, package_id,
                        file_version_from, file_version_to, product_version_from, product_version_to
                 FROM bad_version_ranges WHERE deleted IS NULL ORDER BY id",
            )
            .map_err(query_failed)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RangeRow {
                    id: row.get(0)?,
                    created: row.get(1)?,
                    updated: row.get(2)?,
                    deleted: row.get(3)?,
                    package_id: row.get(4)?,
                    file_version_from: row.get(5)?,
                    file_version_to: row.get(6)?,
                    product_version_from: row.get(7)?,
                    product_version_to: row.get(8)?,
                })
            })
            .map_err(query_failed)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_failed)?;

        rows.into_iter().map(RangeRow::into_range).collect()
    }

    fn find_record(&self, signature: &Signature) -> Result<Option<InventoryRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM inventory_records
             WHERE server_name = ?1 AND file_path = ?2 AND file_name = ?3
               AND file_version = ?4 AND product_version = ?5
             ORDER BY id LIMIT 1"
        );
        let row = self
            .conn
            .query_row(
                &sql,
                params![
                    signature.server_name,
                    signature.file_path,
                    signature.file_name,
                    signature.file_version,
                    signature.product_version,
                ],
                RecordRow::from_row,
            )
            .optional()
            .map_err(query_failed)?;

        row.map(RecordRow::into_record).transpose()
    }

    fn save_record(&mut self, record: &mut InventoryRecord) -> Result<(), StoreError> {
        match record.id {
            Some(id) => {
                let updated = self
                    .conn
                    .execute(
                        "UPDATE inventory_records SET last_scan = ?1, package_id = ?2 WHERE id = ?3",
                        params![record.last_scan.to_rfc3339(), record.package_id, id],
                    )
                    .map_err(query_failed)?;
                if updated == 0 {
                    return Err(StoreError::Query(format!(
                        "inventory record #{id} not found"
                    )));
                }
            }
            None => {
                let file_size = i64::try_from(record.file_size).map_err(|_| {
                    StoreError::Query(format!("file size {} out of range", record.file_size))
                })?;
                let fv = record.file_version;
                let pv = record.product_version;
                self.conn
                    .execute(
                        "INSERT INTO inventory_records
                         (created, last_scan, package_id, server_name, server_ips, file_path, file_name, file_size,
                          file_version, file_version_major, file_version_minor, file_version_build, file_version_private,
                          product_version, product_version_major, product_version_minor, product_version_build, product_version_private)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                        params![
                            record.created.to_rfc3339(),
                            record.last_scan.to_rfc3339(),
                            record.package_id,
                            record.server_name,
                            record.server_ips,
                            record.file_path,
                            record.file_name,
                            file_size,
                            fv.to_string(),
                            fv.major,
                            fv.minor,
                            fv.build,
                            fv.private,
                            pv.to_string(),
                            pv.major,
                            pv.minor,
                            pv.build,
                            pv.private,
                        ],
                    )
                    .map_err(query_failed)?;
                record.id = Some(self.conn.last_insert_rowid());
            }
        }
        Ok(())
    }
}

fn query_failed(e: rusqlite::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

fn parse_timestamp(table: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRow {
            table: table.to_owned(),
            reason: format!("invalid timestamp '{raw}': {e}"),
        })
}

fn parse_optional_timestamp(
    table: &str,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    raw.map(|raw| parse_timestamp(table, &raw)).transpose()
}

struct PackageRow {
    id: i64,
    created: String,
    updated: String,
    deleted: Option<String>,
    name: String,
    file_patterns: Option<String>,
    nuget_url: Option<String>,
    info_url: Option<String>,
    repo_url: Option<String>,
}

impl PackageRow {
    fn into_package(self) -> Result<Package, StoreError> {
        let file_patterns =
            parse_file_patterns(&self.name, self.file_patterns.as_deref().unwrap_or_default());
        Ok(Package {
            id: self.id,
            file_patterns,
            created: parse_timestamp("packages", &self.created)?,
            updated: parse_timestamp("packages", &self.updated)?,
            deleted: parse_optional_timestamp("packages", self.deleted)?,
            name: self.name,
            nuget_url: self.nuget_url,
            info_url: self.info_url,
            repo_url: self.repo_url,
        })
    }
}

struct RangeRow {
    id: i64,
    created: String,
    updated: String,
    deleted: Option<String>,
    package_id: i64,
    file_version_from: Option<String>,
    file_version_to: Option<String>,
    product_version_from: Option<String>,
    product_version_to: Option<String>,
}

impl RangeRow {
    fn into_range(self) -> Result<BadVersionRange, StoreError> {
        Ok(BadVersionRange {
            id: self.id,
            package_id: self.package_id,
            file_version_from: self.file_version_from,
            file_version_to: self.file_version_to,
            product_version_from: self.product_version_from,
            product_version_to: self.product_version_to,
            created: parse_timestamp("bad_version_ranges", &self.created)?,
            updated: parse_timestamp("bad_version_ranges", &self.updated)?,
            deleted: parse_optional_timestamp("bad_version_ranges", self.deleted)?,
        })
    }
}

struct RecordRow {
    id: i64,
    created: String,
    last_scan: String,
    package_id: Option<i64>,
    server_name: String,
    server_ips: String,
    file_path: String,
    file_name: String,
    file_size: i64,
    file_version: [i64; 4],
    product_version: [i64; 4],
}

impl RecordRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            created: row.get(1)?,
            last_scan: row.get(2)?,
            package_id: row.get(3)?,
            server_name: row.get(4)?,
            server_ips: row.get(5)?,
            file_path: row.get(6)?,
            file_name: row.get(7)?,
            file_size: row.get(8)?,
            file_version: [row.get(9)?, row.get(10)?, row.get(11)?, row.get(12)?],
            product_version: [row.get(13)?, row.get(14)?, row.get(15)?, row.get(16)?],
        })
    }

    fn into_record(self) -> Result<InventoryRecord, StoreError> {
        let file_size = u64::try_from(self.file_size).map_err(|_| StoreError::CorruptRow {
            table: "inventory_records".to_owned(),
            reason: format!("negative file size {}", self.file_size),
        })?;
        Ok(InventoryRecord {
            id: Some(self.id),
            created: parse_timestamp("inventory_records", &self.created)?,
            last_scan: parse_timestamp("inventory_records", &self.last_scan)?,
            package_id: self.package_id,
            server_name: self.server_name,
            server_ips: self.server_ips,
            file_path: self.file_path,
            file_name: self.file_name,
            file_size,
            file_version: quad_from_parts(self.file_version)?,
            product_version: quad_from_parts(self.product_version)?,
        })
    }
}

fn quad_from_parts(parts: [i64; 4]) -> Result<VersionQuad, StoreError> {
    let part = |value: i64| {
        u16::try_from(value).map_err(|_| StoreError::CorruptRow {
            table: "inventory_records".to_owned(),
            reason: format!("version part {value} out of range"),
        })
    };
    Ok(VersionQuad::new(
        part(parts[0])?,
        part(parts[1])?,
        part(parts[2])?,
        part(parts[3])?,
    ))
}
