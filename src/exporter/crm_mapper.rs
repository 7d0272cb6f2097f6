// ==========================================
// 线索工具 - CRM 字段映射器
// ==========================================
// 职责: 单个来源文件的合并行 → 固定 15 字段 CRM 记录
// 红线: 每行独立计算（输入行 + 行下标），不依赖可变累加器
// ==========================================

use crate::domain::lead::{
    columns, CrmRecord, DEFAULT_CATEGORY, DEFAULT_NAME, SERVICE_TYPE, SOURCE_COLD_CALL,
    STAGE_NEW, UNASSIGNED_OWNER,
};
use crate::domain::table::{Row, Table};
use crate::domain::types::SocialPlatform;
use crate::importer::data_cleaner::DataCleaner;
use tracing::debug;

#[derive(Default)]
pub struct CrmMapper {
    cleaner: DataCleaner,
}

/// 列级回退: 主列整体缺失时使用备用列
fn pick_column<'a>(table: &Table, primary: &'a str, fallback: &'a str) -> &'a str {
    if table.column_is_blank(primary) {
        fallback
    } else {
        primary
    }
}

impl CrmMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// 映射为 CRM 记录
    ///
    /// # 参数
    /// - table: 同一来源文件的行
    /// - owners: 负责人列表（按行号轮询）
    /// - source_label: 来源文件名，写入 "Источник телефона"
    pub fn map_to_schema(
        &self,
        table: &Table,
        owners: &[String],
        source_label: &str,
    ) -> Vec<CrmRecord> {
        let address_column = pick_column(table, columns::ADDRESS, columns::ADDRESS_ALIAS);
        let messenger_column = pick_column(table, columns::VIBER, columns::WHATSAPP);
        let company_column = pick_column(table, columns::NAME, columns::TITLE_ALIAS);

        debug!(
            rows = table.len(),
            address = address_column,
            messenger = messenger_column,
            "CRM 字段映射"
        );

        table
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| CrmRecord {
                lead_title: lead_title(row),
                address: row.get(address_column).map(str::to_string),
                work_phone: row.get(columns::PHONE_1).map(str::to_string),
                mobile_phone: row.get(columns::PHONE_2).map(str::to_string),
                website: self.cleaner.clean_url(row.get(columns::WEBSITE)),
                telegram: self
                    .cleaner
                    .extract_social_username(row.get(columns::TELEGRAM), SocialPlatform::Telegram),
                vkontakte: self
                    .cleaner
                    .extract_social_username(row.get(columns::VKONTAKTE), SocialPlatform::Vkontakte),
                viber: row.get(messenger_column).map(str::to_string),
                company_name: row.get(company_column).map(str::to_string),
                comment: String::new(),
                stage: STAGE_NEW.to_string(),
                source: SOURCE_COLD_CALL.to_string(),
                owner: assign_owner(owners, idx).to_string(),
                service_type: SERVICE_TYPE.to_string(),
                phone_source: source_label.to_string(),
            })
            .collect()
    }
}

/// "<类别> - <名称>"
fn lead_title(row: &Row) -> String {
    let category = row.get(columns::CATEGORY).unwrap_or(DEFAULT_CATEGORY);
    let name = row
        .get(columns::NAME)
        .or_else(|| row.get(columns::TITLE_ALIAS))
        .unwrap_or(DEFAULT_NAME);
    format!("{} - {}", category, name)
}

/// 按行号轮询负责人；列表为空时返回占位值
pub fn assign_owner(owners: &[String], index: usize) -> &str {
    if owners.is_empty() {
        UNASSIGNED_OWNER
    } else {
        &owners[index % owners.len()]
    }
}
