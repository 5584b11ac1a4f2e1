//! 스윕 오케스트레이터
//!
//! [`InventoryScanner`]는 설정된 폴더를 순서대로 하나씩, 폴더 안의 파일을 하나씩 처리합니다.
//!
//! # 파일 처리 흐름
//!
//! ```text
//! discovered -> package-matched | package-unmatched
//!            -> version-evaluated (매칭된 경우만)
//!            -> reconciled
//! ```
//!
//! 패키지가 매칭되지 않아도 인벤토리에는 기록됩니다.
//! 저장소 에러만 스윕 전체를 중단하며, 나머지 에러는 폴더 또는 파일 단위로 건너뜁니다.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, histogram};
use tracing::{error, info, warn};
use uuid::Uuid;
use versentry_core::config::{FolderEntry, ScanConfig, VersentryConfig};
use versentry_core::metrics as m;

use crate::catalog::Catalog;
use crate::discover::discover_files;
use crate::error::ScannerError;
use crate::evaluator::find_bad_version;
use crate::matcher::{PackageMatcher, RegexPackageMatcher};
use crate::reconciler::InventoryReconciler;
use crate::report::{BadVersionAlert, FolderReport, FolderStatus, SweepReport};
use crate::store::InventoryStore;
use crate::types::{DiscoveredBinary, HostIdentity};
use crate::versioninfo::{PeVersionReader, VersionInfoReader};

/// 파일 하나의 처리 결과
struct FileOutcome {
    created: bool,
    matched: bool,
    alert: Option<BadVersionAlert>,
}

/// 인벤토리 스캐너
///
/// [`InventoryScannerBuilder`]로 생성합니다. 카탈로그는 빌드 시 한 번 로드되어
/// 스캐너가 살아있는 동안 바뀌지 않습니다.
pub struct InventoryScanner<S: InventoryStore> {
    folders: Vec<FolderEntry>,
    extensions: Vec<String>,
    max_file_size: u64,
    host: HostIdentity,
    catalog: Catalog,
    matcher: Box<dyn PackageMatcher>,
    version_reader: Box<dyn VersionInfoReader>,
    store: S,
}

impl<S: InventoryStore> InventoryScanner<S> {
    pub fn host(&self) -> &HostIdentity {
        &self.host
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 스캐너를 해체하고 저장소를 돌려받습니다.
    pub fn into_store(self) -> S {
        self.store
    }

    /// 모든 폴더를 한 번 스캔합니다.
    ///
    /// 저장소 에러가 나면 즉시 중단하고 에러를 반환합니다.
    pub fn run(&mut self) -> Result<SweepReport, ScannerError> {
        let sweep_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let timer = Instant::now();

        info!(
            sweep_id = %sweep_id,
            host = %self.host.name,
            ips = %self.host.ips,
            folders = self.folders.len(),
            matcher = self.matcher.strategy(),
            "sweep started"
        );

        let folders = self.folders.clone();
        let mut folder_reports = Vec::with_capacity(folders.len());
        let mut alerts = Vec::new();

        for (i, folder) in folders.iter().enumerate() {
            let report = self.scan_folder(i + 1, folder, &mut alerts)?;
            folder_reports.push(report);
        }

        histogram!(m::SWEEP_DURATION_SECONDS).record(timer.elapsed().as_secs_f64());

        let report = SweepReport {
            sweep_id,
            host: self.host.clone(),
            started_at,
            finished_at: Utc::now(),
            folders: folder_reports,
            alerts,
        };

        info!(
            sweep_id = %report.sweep_id,
            inventoried = report.files_inventoried(),
            skipped = report.files_skipped(),
            unmatched = report.unmatched(),
            bad_versions = report.alerts.len(),
            "sweep finished"
        );

        Ok(report)
    }

    fn scan_folder(
        &mut self,
        index: usize,
        folder: &FolderEntry,
        alerts: &mut Vec<BadVersionAlert>,
    ) -> Result<FolderReport, ScannerError> {
        let mut report = FolderReport::new(index, &folder.path);
        info!(
            folder = index,
            path = %folder.path,
            include_subfolders = folder.include_subfolders,
            "scanning path"
        );

        let files = match discover_files(folder, &self.extensions) {
            Ok(files) => files,
            Err(e) => {
                error!(folder = index, error = %e, "folder unavailable, skipping");
                counter!(m::FOLDERS_UNAVAILABLE_TOTAL).increment(1);
                report.status = FolderStatus::Unavailable {
                    reason: e.to_string(),
                };
                return Ok(report);
            }
        };

        report.files_found = files.len();
        if files.is_empty() {
            warn!(folder = index, "Files: 0 - aborting folder");
            report.status = FolderStatus::Empty;
            return Ok(report);
        }

        info!(folder = index, files = files.len(), "processing files");

        for path in &files {
            match self.scan_file(index, path) {
                Ok(outcome) => {
                    report.files_inventoried += 1;
                    counter!(m::FILES_SCANNED_TOTAL).increment(1);
                    if outcome.created {
                        report.records_created += 1;
                        counter!(m::RECORDS_CREATED_TOTAL).increment(1);
                    }
                    if !outcome.matched {
                        report.unmatched += 1;
                        counter!(m::UNMATCHED_FILES_TOTAL).increment(1);
                    }
                    alerts.extend(outcome.alert);
                }
                Err(e) if e.is_fatal() => {
                    error!(
                        folder = index,
                        path = %path.display(),
                        error = %e,
                        "inventory store failure, aborting sweep"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(folder = index, path = %path.display(), error = %e, "skipping file");
                    counter!(m::FILES_SKIPPED_TOTAL, m::LABEL_REASON => e.reason_label())
                        .increment(1);
                    report.files_skipped += 1;
                }
            }
        }

        info!(
            folder = index,
            inventoried = report.files_inventoried,
            skipped = report.files_skipped,
            created = report.records_created,
            "folder done"
        );

        Ok(report)
    }

    fn scan_file(&mut self, index: usize, path: &Path) -> Result<FileOutcome, ScannerError> {
        let binary = self.describe(path)?;
        let file_version = binary.file_version.to_string();
        let product_version = binary.product_version.to_string();

        let package = self.matcher.find_match(&binary.file_name, &self.catalog);
        if package.is_none() {
            warn!(folder = index, file = %binary.file_name, "no package found for {}", binary.file_name);
        }

        // 평가는 조정 전에, 알림은 조정 후에
        let verdict = package.and_then(|p| {
            find_bad_version(&file_version, &product_version, self.catalog.ranges_for(p.id))
                .map(|found| (p, found))
        });

        let outcome =
            InventoryReconciler::new(&mut self.store).reconcile(&binary, package.map(|p| p.id))?;

        let alert = verdict.map(|(package, found)| {
            error!(
                folder = index,
                package = %package.name,
                "BAD PACKAGE {} - {}",
                package.name,
                found.range
            );
            error!(
                folder = index,
                "BAD VERSION {} - FileVersion: {} - ProductVersion: {} - Path: {}",
                binary.file_name,
                file_version,
                product_version,
                binary.directory
            );
            counter!(m::BAD_VERSIONS_TOTAL, m::LABEL_PACKAGE => package.name.clone()).increment(1);

            BadVersionAlert {
                folder_index: index,
                package_id: package.id,
                package_name: package.name.clone(),
                file_path: binary.directory.clone(),
                file_name: binary.file_name.clone(),
                file_version: file_version.clone(),
                product_version: product_version.clone(),
                range: found.range.clone(),
                evaluation: found.evaluation,
                record_id: outcome.record.id,
            }
        });

        Ok(FileOutcome {
            created: outcome.created,
            matched: package.is_some(),
            alert,
        })
    }

    /// 파일 메타데이터와 버전 정보를 읽어 [`DiscoveredBinary`]를 만듭니다.
    fn describe(&self, path: &Path) -> Result<DiscoveredBinary, ScannerError> {
        let read_error = |reason: String| ScannerError::FileRead {
            path: path.display().to_string(),
            reason,
        };

        let metadata = std::fs::metadata(path).map_err(|e| read_error(e.to_string()))?;
        let file_size = metadata.len();
        if file_size > self.max_file_size {
            return Err(ScannerError::FileTooBig {
                path: path.display().to_string(),
                size: file_size,
                max: self.max_file_size,
            });
        }

        let absolute = std::path::absolute(path).map_err(|e| read_error(e.to_string()))?;
        let directory = absolute
            .parent()
            .map(|dir| dir.to_string_lossy().to_lowercase())
            .filter(|dir| !dir.is_empty())
            .ok_or_else(|| read_error("unable to determine directory".to_owned()))?;
        let file_name = absolute
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .ok_or_else(|| read_error("unable to determine file name".to_owned()))?;

        let info = self.version_reader.read_version_info(path)?;

        Ok(DiscoveredBinary {
            host: self.host.clone(),
            directory,
            file_name,
            file_size,
            file_version: info.file_version,
            product_version: info.product_version,
        })
    }
}

/// 인벤토리 스캐너 빌더
pub struct InventoryScannerBuilder<S: InventoryStore> {
    store: S,
    folders: Vec<FolderEntry>,
    scan: ScanConfig,
    host: Option<HostIdentity>,
    matcher: Option<Box<dyn PackageMatcher>>,
    version_reader: Option<Box<dyn VersionInfoReader>>,
}

impl<S: InventoryStore> InventoryScannerBuilder<S> {
    /// 저장소로 새 빌더를 생성합니다.
    pub fn new(store: S) -> Self {
        Self {
            store,
            folders: Vec::new(),
            scan: ScanConfig::default(),
            host: None,
            matcher: None,
            version_reader: None,
        }
    }

    /// 설정 파일의 폴더 목록과 스캔 설정을 사용합니다.
    pub fn config(mut self, config: &VersentryConfig) -> Self {
        self.folders = config.folders.clone();
        self.scan = config.scan.clone();
        self
    }

    pub fn folders(mut self, folders: Vec<FolderEntry>) -> Self {
        self.folders = folders;
        self
    }

    pub fn scan_config(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    /// 호스트 정보를 지정합니다. 지정하지 않으면 빌드 시 감지합니다.
    pub fn host(mut self, host: HostIdentity) -> Self {
        self.host = Some(host);
        self
    }

    /// 매칭 전략을 지정합니다. 기본값은 [`RegexPackageMatcher`].
    pub fn matcher(mut self, matcher: Box<dyn PackageMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// 버전 정보 리더를 지정합니다. 기본값은 [`PeVersionReader`].
    pub fn version_reader(mut self, reader: Box<dyn VersionInfoReader>) -> Self {
        self.version_reader = Some(reader);
        self
    }

    /// 카탈로그를 로드하고 스캐너를 빌드합니다.
    pub fn build(self) -> Result<InventoryScanner<S>, ScannerError> {
        if self.folders.is_empty() {
            return Err(ScannerError::Config {
                field: "folders".to_owned(),
                reason: "at least one folder is required".to_owned(),
            });
        }

        let extensions = self.scan.normalized_extensions();
        if extensions.is_empty() {
            return Err(ScannerError::Config {
                field: "scan.extensions".to_owned(),
                reason: "at least one extension is required".to_owned(),
            });
        }
        if self.scan.max_file_size == 0 {
            return Err(ScannerError::Config {
                field: "scan.max_file_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        let catalog = Catalog::load(&self.store)?;

        let mut matcher = self
            .matcher
            .unwrap_or_else(|| Box::new(RegexPackageMatcher::new()));
        matcher.prepare(&catalog);

        let version_reader = self
            .version_reader
            .unwrap_or_else(|| Box::new(PeVersionReader::new()));
        let host = self.host.unwrap_or_else(HostIdentity::detect);

        Ok(InventoryScanner {
            folders: self.folders,
            extensions,
            max_file_size: self.scan.max_file_size,
            host,
            catalog,
            matcher,
            version_reader,
            store: self.store,
        })
    }
}
