// ==========================================
// 线索工具 - CRM 导出文件写入
// ==========================================
// 格式: UTF-8 + BOM，分号分隔，所有值加引号，固定 15 列
// 写入策略: 先写临时文件，成功后重命名为目标文件
// ==========================================

use crate::domain::lead::{CrmRecord, CRM_COLUMNS};
use crate::importer::error::{ImportError, ImportResult};
use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Default, Clone, Copy)]
pub struct CrmCsvWriter;

impl CrmCsvWriter {
    /// 写出 CRM 导入文件
    ///
    /// # 返回
    /// - Ok(行数)
    /// - Err(ExportWriteError): 目标不可写；不会留下目标文件
    pub fn write(&self, records: &[CrmRecord], output_path: &Path) -> ImportResult<usize> {
        let staging = staging_path(output_path);

        let result = write_records(records, &staging)
            .and_then(|_| std::fs::rename(&staging, output_path).map_err(csv::Error::from));

        match result {
            Ok(()) => {
                info!(path = %output_path.display(), rows = records.len(), "CRM 文件已保存");
                Ok(records.len())
            }
            Err(e) => {
                let _ = std::fs::remove_file(&staging);
                error!(path = %output_path.display(), error = %e, "CRM 文件写入失败");
                Err(ImportError::ExportWriteError {
                    path: output_path.display().to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

fn staging_path(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    output_path.with_file_name(name)
}

fn write_records(records: &[CrmRecord], path: &Path) -> Result<(), csv::Error> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::Always)
        .from_writer(file);

    writer.write_record(CRM_COLUMNS)?;
    for record in records {
        writer.write_record(record.values())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::UNASSIGNED_OWNER;
    use tempfile::TempDir;

    fn record(title: &str) -> CrmRecord {
        CrmRecord {
            lead_title: title.to_string(),
            address: None,
            work_phone: Some("79991234567".to_string()),
            mobile_phone: None,
            website: None,
            telegram: None,
            vkontakte: None,
            viber: None,
            company_name: None,
            comment: String::new(),
            stage: "Новая заявка".to_string(),
            source: "Холодный звонок".to_string(),
            owner: UNASSIGNED_OWNER.to_string(),
            service_type: "ГЦК".to_string(),
            phone_source: "a.csv".to_string(),
        }
    }

    #[test]
    fn test_write_bom_semicolon_quoted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let written = CrmCsvWriter.write(&[record("Кафе - A; B")], &path).unwrap();
        assert_eq!(written, 1);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("\"Название лида\";\"Адрес\";"));
        let data = lines.next().unwrap();
        assert!(data.starts_with("\"Кафе - A; B\";\"\";\"79991234567\";"));
        assert!(data.ends_with("\"a.csv\""));
        assert!(!dir.path().join("out.csv.part").exists());
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_such_dir").join("out.csv");
        let result = CrmCsvWriter.write(&[record("x")], &path);
        assert!(matches!(result, Err(ImportError::ExportWriteError { .. })));
        assert!(!path.exists());
    }
}
