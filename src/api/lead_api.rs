// ==========================================
// 线索工具 - 线索处理 API
// ==========================================
// 职责: 串联导入 → 合并去重 → CRM 导出 → 运行历史
// 说明: 每次运行新建 LeadImporterImpl，统计互不影响
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db;
use crate::domain::history::ProcessingRun;
use crate::domain::lead::ProcessingStats;
use crate::domain::table::Table;
use crate::domain::types::RunStatus;
use crate::exporter::CrmExporter;
use crate::importer::{LeadImporter, LeadImporterImpl};
use crate::repository::{HistoryRepository, ManagerRepository};
use crate::scraping::{robot_alias, ScrapingClient, TaskProgress};
use rusqlite::Connection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// 一次处理运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingReport {
    pub run_id: String,
    pub status: RunStatus,
    pub stats: ProcessingStats,
    /// 导出文件；无数据时为空
    pub output_file: Option<String>,
    pub exported_rows: usize,
    pub duration_ms: i64,
}

/// 线索处理 API
pub struct LeadApi {
    config: ConfigManager,
    history: HistoryRepository,
    managers: ManagerRepository,
    exporter: CrmExporter,
    // 最近一次合并结果（预览用）
    last_merged: Option<Table>,
}

impl LeadApi {
    pub fn new(config: ConfigManager, conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            config,
            history: HistoryRepository::new(conn.clone()),
            managers: ManagerRepository::new(conn),
            exporter: CrmExporter::new(),
            last_merged: None,
        }
    }

    /// 按配置中的数据库路径打开
    pub fn open(config: ConfigManager) -> ApiResult<Self> {
        let db_path = config.config().paths.database.clone();
        let conn = db::open_shared(Path::new(&db_path))
            .map_err(|e| ApiError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        Ok(Self::new(config, conn))
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    /// 处理源文件并导出 CRM 导入文件
    ///
    /// # 返回
    /// - Ok(report): status 为 Success 或 NoData
    /// - Err: 导出写入失败（已记录 Failed 历史）
    #[instrument(skip(self, files), fields(files = files.len(), output = %output_path.display()))]
    pub fn process_files(
        &mut self,
        files: &[PathBuf],
        output_path: &Path,
    ) -> ApiResult<ProcessingReport> {
        if files.is_empty() {
            return Err(ApiError::InvalidInput("未选择源文件".to_string()));
        }

        let started = Instant::now();
        let mut importer = LeadImporterImpl::with_validator(self.config.config().phone_validator());
        let merged = importer.merge_files(files);

        let inputs = files.iter().map(|p| p.display().to_string()).collect();
        self.finish_run(merged, importer.statistics(), inputs, output_path, started)
    }

    /// 采集任务全流程: 创建 → 启动 → 等待 → 下载 → 导入 → 导出
    ///
    /// # 返回
    /// - Ok(None): 任务未在限定时间内完成
    pub async fn scrape_and_process(
        &mut self,
        client: &dyn ScrapingClient,
        robot: &str,
        urls: &[String],
        output_path: &Path,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> ApiResult<Option<ProcessingReport>> {
        if urls.is_empty() {
            return Err(ApiError::InvalidInput("未提供采集链接".to_string()));
        }

        let task = client.create_task(robot_alias(robot), urls, None).await?;
        client.start_task(task.id).await?;

        let on_progress = |p: &TaskProgress| {
            info!(task_id = task.id, total = p.total, processed = p.processed, success = p.success, "采集进度");
        };
        let completed = client
            .wait_for_completion(task.id, poll_interval, max_wait, &on_progress)
            .await?;

        if !completed {
            warn!(task_id = task.id, "采集任务未完成，已停止");
            if let Err(e) = client.stop_task(task.id).await {
                warn!(task_id = task.id, error = %e, "停止采集任务失败");
            }
            return Ok(None);
        }

        self.import_scraped(client, task.id, output_path).await.map(Some)
    }

    /// 下载已完成采集任务的结果并走导入管道
    pub async fn import_scraped(
        &mut self,
        client: &dyn ScrapingClient,
        task_id: i64,
        output_path: &Path,
    ) -> ApiResult<ProcessingReport> {
        let started = Instant::now();
        let label = format!("webbee_task_{}.csv", task_id);
        let mut importer = LeadImporterImpl::with_validator(self.config.config().phone_validator());

        let merged = match client.download_results_csv(task_id).await? {
            Some(text) => {
                let table = importer.ingest_content(&text, &label)?;
                importer.merge_tables(vec![table])
            }
            None => None,
        };

        self.finish_run(merged, importer.statistics(), vec![label], output_path, started)
    }

    /// 预览最近一次合并结果的前 n 行（默认取配置 preview_rows）
    pub fn preview(&self, n: Option<usize>) -> Option<Table> {
        let n = n.unwrap_or(self.config.config().settings.preview_rows);
        self.last_merged.as_ref().map(|t| t.head(n))
    }

    pub fn managers(&self) -> &[String] {
        self.config.managers()
    }

    /// 更新负责人名册（配置文件 + 数据库）
    pub fn set_managers(&mut self, names: Vec<String>) -> ApiResult<usize> {
        self.config.set_managers(names)?;
        let saved = self.managers.save_roster(self.config.managers())?;
        Ok(saved)
    }

    pub fn history(&self, limit: usize) -> ApiResult<Vec<ProcessingRun>> {
        Ok(self.history.list_recent(limit)?)
    }

    // ==========================================
    // 内部: 导出并记录历史
    // ==========================================
    fn finish_run(
        &mut self,
        merged: Option<Table>,
        stats: ProcessingStats,
        input_files: Vec<String>,
        output_path: &Path,
        started: Instant,
    ) -> ApiResult<ProcessingReport> {
        // 合并结果为空表同样视为无数据
        let Some(table) = merged.filter(|t| !t.is_empty()) else {
            warn!("没有可导出的数据");
            let run = self.build_run(input_files, None, stats, started, RunStatus::NoData);
            let run_id = self.history.insert(&run)?;
            self.last_merged = None;
            return Ok(ProcessingReport {
                run_id,
                status: RunStatus::NoData,
                stats,
                output_file: None,
                exported_rows: 0,
                duration_ms: run.duration_ms,
            });
        };

        let output = output_path.display().to_string();
        let owners = self.config.managers().to_vec();

        match self.exporter.export_for_crm(&table, &owners, output_path) {
            Ok(exported_rows) => {
                let run = self.build_run(
                    input_files,
                    Some(output.clone()),
                    stats,
                    started,
                    RunStatus::Success,
                );
                let run_id = self.history.insert(&run)?;
                info!(
                    run_id = %run_id,
                    total_rows = stats.total_rows,
                    valid_rows = stats.valid_rows,
                    duplicates_removed = stats.duplicates_removed,
                    invalid_phones = stats.invalid_phones,
                    files_processed = stats.files_processed,
                    "处理完成"
                );
                self.last_merged = Some(table);
                Ok(ProcessingReport {
                    run_id,
                    status: RunStatus::Success,
                    stats,
                    output_file: Some(output),
                    exported_rows,
                    duration_ms: run.duration_ms,
                })
            }
            Err(e) => {
                error!(error = %e, "导出失败");
                let run = self.build_run(input_files, Some(output), stats, started, RunStatus::Failed);
                if let Err(history_err) = self.history.insert(&run) {
                    warn!(error = %history_err, "运行历史写入失败");
                }
                self.last_merged = Some(table);
                Err(e.into())
            }
        }
    }

    fn build_run(
        &self,
        input_files: Vec<String>,
        output_file: Option<String>,
        stats: ProcessingStats,
        started: Instant,
        status: RunStatus,
    ) -> ProcessingRun {
        ProcessingRun {
            run_id: uuid::Uuid::new_v4().to_string(),
            input_files,
            output_file,
            stats,
            duration_ms: started.elapsed().as_millis() as i64,
            status,
            processed_at: chrono::Local::now().naive_local(),
        }
    }
}
