// ==========================================
// 线索工具 - 线索领域模型
// ==========================================
// 职责: 已知列名、处理统计、CRM 导入记录
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// 列名常量
// ==========================================
pub mod columns {
    /// 计算出的主电话槽位（去重键）
    pub const PHONE_1: &str = "phone_1";
    /// 计算出的次电话槽位
    pub const PHONE_2: &str = "phone_2";
    /// 来源文件标记
    pub const SOURCE_FILE: &str = "source_file";

    pub const NAME: &str = "Название";
    pub const ADDRESS: &str = "Адрес";
    pub const TITLE_ALIAS: &str = "title";
    pub const ADDRESS_ALIAS: &str = "address";
    pub const CATEGORY: &str = "Category 0";
    pub const WEBSITE: &str = "companyUrl";
    pub const TELEGRAM: &str = "telegram";
    pub const VKONTAKTE: &str = "vkontakte";
    pub const WHATSAPP: &str = "whatsapp";
    pub const VIBER: &str = "viber";
    pub const RATING: &str = "rating";
    pub const RATING_COUNT: &str = "ratingCount";

    /// 源别名 → 标准列名
    pub const RENAMES: [(&str, &str); 2] = [(TITLE_ALIAS, NAME), (ADDRESS_ALIAS, ADDRESS)];

    /// 导入后保留的业务列（顺序即输出顺序）
    pub const KEEP: [&str; 12] = [
        NAME,
        ADDRESS,
        PHONE_1,
        PHONE_2,
        CATEGORY,
        WEBSITE,
        TELEGRAM,
        VKONTAKTE,
        WHATSAPP,
        VIBER,
        RATING,
        RATING_COUNT,
    ];
}

// ==========================================
// ProcessingStats - 处理统计
// ==========================================
// 单次运行内单调累加；新建运行上下文即重置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub duplicates_removed: usize,
    pub invalid_phones: usize,
    pub files_processed: usize,
}

// ==========================================
// CrmRecord - CRM 导入记录（固定 15 字段）
// ==========================================
pub const CRM_COLUMNS: [&str; 15] = [
    "Название лида",
    "Адрес",
    "Рабочий телефон",
    "Мобильный телефон",
    "Корпоративный сайт",
    "Контакт Telegram",
    "Контакт ВКонтакте",
    "Контакт Viber",
    "Название компании",
    "Комментарий",
    "Стадия",
    "Источник",
    "Ответственный",
    "Тип услуги",
    "Источник телефона",
];

pub const STAGE_NEW: &str = "Новая заявка";
pub const SOURCE_COLD_CALL: &str = "Холодный звонок";
pub const SERVICE_TYPE: &str = "ГЦК";
pub const UNASSIGNED_OWNER: &str = "Не назначен";
pub const DEFAULT_CATEGORY: &str = "Компания";
pub const DEFAULT_NAME: &str = "Без названия";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmRecord {
    pub lead_title: String,
    pub address: Option<String>,
    pub work_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub website: Option<String>,
    pub telegram: Option<String>,
    pub vkontakte: Option<String>,
    pub viber: Option<String>,
    pub company_name: Option<String>,
    pub comment: String,
    pub stage: String,
    pub source: String,
    pub owner: String,
    pub service_type: String,
    pub phone_source: String,
}

impl CrmRecord {
    /// 按 CRM_COLUMNS 顺序输出字段值（缺失 → 空串）
    pub fn values(&self) -> [&str; 15] {
        fn opt(v: &Option<String>) -> &str {
            v.as_deref().unwrap_or("")
        }
        [
            &self.lead_title,
            opt(&self.address),
            opt(&self.work_phone),
            opt(&self.mobile_phone),
            opt(&self.website),
            opt(&self.telegram),
            opt(&self.vkontakte),
            opt(&self.viber),
            opt(&self.company_name),
            &self.comment,
            &self.stage,
            &self.source,
            &self.owner,
            &self.service_type,
            &self.phone_source,
        ]
    }
}
