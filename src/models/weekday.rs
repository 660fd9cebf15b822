//! 星期名称解析

use chrono::Weekday;
use phf::phf_map;

/// 配置中允许使用的星期写法（统一小写后查表）
static WEEKDAY_ALIASES: phf::Map<&'static str, Weekday> = phf_map! {
    "monday" => Weekday::Mon,
    "mon" => Weekday::Mon,
    "周一" => Weekday::Mon,
    "星期一" => Weekday::Mon,
    "tuesday" => Weekday::Tue,
    "tue" => Weekday::Tue,
    "周二" => Weekday::Tue,
    "星期二" => Weekday::Tue,
    "wednesday" => Weekday::Wed,
    "wed" => Weekday::Wed,
    "周三" => Weekday::Wed,
    "星期三" => Weekday::Wed,
    "thursday" => Weekday::Thu,
    "thu" => Weekday::Thu,
    "周四" => Weekday::Thu,
    "星期四" => Weekday::Thu,
    "friday" => Weekday::Fri,
    "fri" => Weekday::Fri,
    "周五" => Weekday::Fri,
    "星期五" => Weekday::Fri,
    "saturday" => Weekday::Sat,
    "sat" => Weekday::Sat,
    "周六" => Weekday::Sat,
    "星期六" => Weekday::Sat,
    "sunday" => Weekday::Sun,
    "sun" => Weekday::Sun,
    "周日" => Weekday::Sun,
    "星期日" => Weekday::Sun,
    "星期天" => Weekday::Sun,
};

/// 尝试从字符串解析星期（忽略大小写与首尾空白）
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    WEEKDAY_ALIASES
        .get(s.trim().to_lowercase().as_str())
        .copied()
}

/// 获取星期的中文名称
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "星期一",
        Weekday::Tue => "星期二",
        Weekday::Wed => "星期三",
        Weekday::Thu => "星期四",
        Weekday::Fri => "星期五",
        Weekday::Sat => "星期六",
        Weekday::Sun => "星期日",
    }
}
