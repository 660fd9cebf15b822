//! 日期序列生成

use crate::error::{AppError, AppResult};
use crate::models::{weekday_name, TargetDate};
use chrono::{Datelike, Days, Weekday};

/// 生成从锚定日期开始的连续日期
///
/// 返回 `anchor, anchor+1d, ..., anchor+(count-1)d`，升序。纯函数，不访问文件系统。
pub fn generate(anchor: TargetDate, count: u32) -> AppResult<Vec<TargetDate>> {
    if count == 0 {
        return Err(AppError::invalid_schedule(anchor, "生成数量必须至少为 1"));
    }

    (0..count)
        .map(|offset| {
            anchor
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or_else(|| AppError::invalid_schedule(anchor, format!("第 {} 天超出日期范围", offset + 1)))
        })
        .collect()
}

/// 检查锚定日期是否落在要求的星期
pub fn check_weekday(anchor: TargetDate, required: Weekday) -> AppResult<()> {
    let actual = anchor.weekday();
    if actual != required {
        return Err(AppError::invalid_schedule(
            anchor,
            format!(
                "只能在{}执行，锚定日期是{}",
                weekday_name(required),
                weekday_name(actual)
            ),
        ));
    }
    Ok(())
}
