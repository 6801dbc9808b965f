//! 宽松反序列化工具
//!
//! 后端对同一字段在不同接口中的形状并不统一（字符串 / 对象 / null），
//! 这里统一收敛为前端使用的简单类型。

use serde::{Deserialize, Deserializer};

/// 技能条目：既可能是纯字符串，也可能是带 `name` 字段的对象
#[derive(Deserialize)]
#[serde(untagged)]
enum SkillEntry {
    Name(String),
    Object { name: String },
}

impl SkillEntry {
    fn into_name(self) -> String {
        match self {
            SkillEntry::Name(name) | SkillEntry::Object { name } => name,
        }
    }
}

/// 将技能列表（可为 null）解析为有序的名称列表
pub fn skill_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<SkillEntry>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(SkillEntry::into_name)
        .collect())
}

/// null 视为空串
pub fn opt_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// null 或空串视为 "Unknown"
pub fn name_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| crate::UNKNOWN_DISPLAY_NAME.to_string()))
}
