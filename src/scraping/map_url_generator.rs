// ==========================================
// 线索工具 - 地图搜索 URL 生成器
// ==========================================
// 职责: 按 "细分 城市 [区]" 生成 Yandex 地图搜索链接
// 规则: 大城市（莫斯科、圣彼得堡）可按区拆分
// ==========================================

use serde::Serialize;
use tracing::debug;

pub const BASE_URL: &str = "https://yandex.ru/maps/?text=";

const MOSCOW: &str = "Москва";
const SAINT_PETERSBURG: &str = "Санкт-Петербург";

const MOSCOW_DISTRICTS: [&str; 20] = [
    "ЦАО",
    "САО",
    "СВАО",
    "ВАО",
    "ЮВАО",
    "ЮАО",
    "ЮЗАО",
    "ЗАО",
    "СЗАО",
    "ЗелАО",
    "ТАО",
    "НАО",
    "Химки",
    "Балашиха",
    "Подольск",
    "Королёв",
    "Мытищи",
    "Люберцы",
    "Красногорск",
    "Одинцово",
];

const SPB_DISTRICTS: [&str; 18] = [
    "Адмиралтейский район",
    "Василеостровский район",
    "Выборгский район",
    "Калининский район",
    "Кировский район",
    "Колпинский район",
    "Красногвардейский район",
    "Красносельский район",
    "Кронштадтский район",
    "Курортный район",
    "Московский район",
    "Невский район",
    "Петроградский район",
    "Петродворцовый район",
    "Приморский район",
    "Пушкинский район",
    "Фрунзенский район",
    "Центральный район",
];

pub const POPULAR_CITIES: [&str; 15] = [
    "Москва",
    "Санкт-Петербург",
    "Новосибирск",
    "Екатеринбург",
    "Казань",
    "Нижний Новгород",
    "Челябинск",
    "Самара",
    "Омск",
    "Ростов-на-Дону",
    "Уфа",
    "Красноярск",
    "Воронеж",
    "Пермь",
    "Волгоград",
];

/// 一条生成的搜索链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapSearchUrl {
    pub city: String,
    pub segment: String,
    pub district: Option<String>,
    pub url: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MapUrlGenerator;

impl MapUrlGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 单条搜索链接
    pub fn generate_url(&self, segment: &str, city: &str, district: Option<&str>) -> String {
        let query = match district {
            Some(d) if !d.trim().is_empty() => format!("{} {} {}", segment, city, d),
            _ => format!("{} {}", segment, city),
        };
        format!("{}{}", BASE_URL, quote(&query))
    }

    /// 为一个城市生成链接
    ///
    /// # 参数
    /// - use_districts: 大城市是否按区拆分
    /// - selected: 仅生成所选区；None 表示全部区
    pub fn generate_urls_for_city(
        &self,
        city: &str,
        segment: &str,
        use_districts: bool,
        selected: Option<&[String]>,
    ) -> Vec<MapSearchUrl> {
        let districts = self.districts(city);

        if !use_districts || districts.is_empty() {
            return vec![MapSearchUrl {
                city: city.to_string(),
                segment: segment.to_string(),
                district: None,
                url: self.generate_url(segment, city, None),
            }];
        }

        let urls: Vec<MapSearchUrl> = districts
            .iter()
            .filter(|d| selected.map_or(true, |s| s.iter().any(|x| x == *d)))
            .map(|d| MapSearchUrl {
                city: city.to_string(),
                segment: segment.to_string(),
                district: Some(d.to_string()),
                url: self.generate_url(segment, city, Some(d)),
            })
            .collect();

        debug!(city, segment, count = urls.len(), "按区生成搜索链接");
        urls
    }

    pub fn generate_urls_batch(
        &self,
        cities: &[String],
        segment: &str,
        use_districts: bool,
    ) -> Vec<MapSearchUrl> {
        cities
            .iter()
            .flat_map(|city| self.generate_urls_for_city(city, segment, use_districts, None))
            .collect()
    }

    pub fn popular_cities(&self) -> &'static [&'static str] {
        &POPULAR_CITIES
    }

    /// 城市的区列表；非大城市为空
    pub fn districts(&self, city: &str) -> &'static [&'static str] {
        match city {
            MOSCOW => &MOSCOW_DISTRICTS,
            SAINT_PETERSBURG => &SPB_DISTRICTS,
            _ => &[],
        }
    }

    pub fn is_megapolis(&self, city: &str) -> bool {
        !self.districts(city).is_empty()
    }
}

/// 百分号编码；保留非保留字符与 '/'，空格编码为 %20
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
