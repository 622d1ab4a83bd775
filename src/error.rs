use thiserror::Error;

use crate::types::SelectorKind;

/// 下載流程的錯誤類型
#[derive(Error, Debug)]
pub enum Error {
    /// 目標網頁無法存取或回應非 2xx
    #[error("無法存取網頁 {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("未找到 {kind} 為 '{value}' 的畫廊")]
    ContainerNotFound { kind: SelectorKind, value: String },

    #[error("畫廊中沒有找到圖片")]
    NoImages,

    #[error("設定無效: {0}")]
    InvalidConfiguration(String),

    /// 單張圖片傳輸失敗（可重試）
    #[error("圖片傳輸失敗 {url}: {source}")]
    Transfer {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("檔案操作失敗: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL 解析失敗: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
