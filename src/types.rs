use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// 畫廊容器的定位方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    /// 依元素 id
    Id,
    /// 依 class 成員
    Class,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorKind::Id => write!(f, "id"),
            SelectorKind::Class => write!(f, "class"),
        }
    }
}

impl FromStr for SelectorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SelectorKind::Id),
            "class" => Ok(SelectorKind::Class),
            other => Err(Error::InvalidConfiguration(format!(
                "無效的選擇器類型 '{}'，請使用 'id' 或 'class'",
                other
            ))),
        }
    }
}

/// 畫廊選擇器：(類型, 值)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSelector {
    pub kind: SelectorKind,
    pub value: String,
}

impl ContainerSelector {
    pub fn id(value: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::Id,
            value: value.into(),
        }
    }

    pub fn class(value: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::Class,
            value: value.into(),
        }
    }
}

impl fmt::Display for ContainerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.value)
    }
}

/// 檔名命名方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// URL 最後一段路徑
    #[default]
    Original,
    /// 隨機 UUID
    Uuid,
    /// Unix 時間（秒）
    Timestamp,
    /// `{prefix}_{6 位隨機字元}`
    Custom,
}

impl fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamingStrategy::Original => "original",
            NamingStrategy::Uuid => "uuid",
            NamingStrategy::Timestamp => "timestamp",
            NamingStrategy::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for NamingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(NamingStrategy::Original),
            "uuid" => Ok(NamingStrategy::Uuid),
            "timestamp" => Ok(NamingStrategy::Timestamp),
            "custom" => Ok(NamingStrategy::Custom),
            other => Err(Error::InvalidConfiguration(format!(
                "無效的命名方式 '{}'",
                other
            ))),
        }
    }
}

/// 找到的畫廊容器
///
/// 只保存容器本身的 HTML，讓後續解析不必持有整份文件。
#[derive(Debug, Clone)]
pub struct Container {
    pub html: String,
    pub image_count: usize,
}

/// 待下載的單張圖片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    /// 在清單中的位置（從 0 開始）
    pub index: usize,
    /// 絕對 URL
    pub url: String,
}
