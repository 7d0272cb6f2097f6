// ==========================================
// 线索工具 - 转化分析 API
// ==========================================
// 职责: 加载 CRM 导出 → 过滤本工具线索 → 指标与文本报告
// ==========================================

use crate::analytics::{CrmAnalytics, CrmMetrics};
use crate::api::error::{ApiError, ApiResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub metrics: CrmMetrics,
    pub summary: String,
}

pub struct AnalyticsApi {
    reports_dir: PathBuf,
}

impl AnalyticsApi {
    /// # 参数
    /// - reports_dir: 报告输出目录（配置 paths.reports）
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    /// 分析一对 CRM 导出文件；文件读取失败按空表处理
    pub fn analyze(&self, leads_path: &Path, deals_path: &Path) -> AnalyticsReport {
        let mut analytics = CrmAnalytics::load_exports(leads_path, deals_path);
        analytics.filter_own_leads();
        let metrics = analytics.calculate_metrics().clone();

        AnalyticsReport {
            summary: analytics.report_summary(),
            metrics,
        }
    }

    /// 保存报告（文本 + JSON 指标），返回文本报告路径
    pub fn save_report(&self, report: &AnalyticsReport) -> ApiResult<PathBuf> {
        std::fs::create_dir_all(&self.reports_dir).map_err(|e| {
            ApiError::ExportError(format!("{}: {}", self.reports_dir.display(), e))
        })?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let text_path = self.reports_dir.join(format!("report_{}.txt", stamp));
        let json_path = self.reports_dir.join(format!("report_{}.json", stamp));

        let json = serde_json::to_string_pretty(&report.metrics)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        for (path, content) in [(&text_path, report.summary.as_str()), (&json_path, json.as_str())] {
            std::fs::write(path, content)
                .map_err(|e| ApiError::ExportError(format!("{}: {}", path.display(), e)))?;
        }

        info!(path = %text_path.display(), "分析报告已保存");
        Ok(text_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_analyze_and_save() {
        let dir = TempDir::new().unwrap();
        let leads = dir.path().join("leads.csv");
        let deals = dir.path().join("deals.csv");
        std::fs::write(
            &leads,
            "ID,Название,Стадия,Причина отказа,Источник телефона,Комментарий\n\
             1,A,Отказ,Дорого,a.csv,-\n\
             2,B,Отказ,Нет связи,other,-\n",
        )
        .unwrap();
        std::fs::write(
            &deals,
            "ID,Название,Стадия сделки,Ответственный,Сумма,Источник телефона\n\
             1,C,Успешно реализовано,Иван,100,b.csv\n\
             2,D,В работе,Иван,200,b.csv\n",
        )
        .unwrap();

        let api = AnalyticsApi::new(dir.path().join("reports"));
        let report = api.analyze(&leads, &deals);

        assert_eq!(report.metrics.total_leads, 3);
        assert_eq!(report.metrics.total_deals, 2);
        // "Успешно реализовано" 命中两个关键词
        assert_eq!(report.metrics.successful_deals, 2);
        assert_eq!(report.metrics.top_managers, vec![("Иван".to_string(), 2)]);
        assert!(report.summary.contains("ОТЧЁТ"));

        let saved = api.save_report(&report).unwrap();
        assert!(saved.exists());
        assert!(saved.with_extension("json").exists());
    }

    #[test]
    fn test_analyze_missing_files_gives_empty_metrics() {
        let dir = TempDir::new().unwrap();
        let api = AnalyticsApi::new(dir.path());
        let report = api.analyze(&dir.path().join("none1.csv"), &dir.path().join("none2.csv"));
        assert_eq!(report.metrics, CrmMetrics::default());
    }
}
