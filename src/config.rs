use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::error::{Error, Result};
use crate::file_manager::RunLocation;
use crate::types::{ContainerSelector, NamingStrategy};

/// 未指定儲存目錄時使用的預設值
pub const DEFAULT_SAVE_DIR: &str = "downloaded_images";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 單次下載的配置
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// 目標網頁
    pub url: String,
    /// 畫廊選擇器
    pub selector: ContainerSelector,
    /// 儲存根目錄
    pub save_dir: PathBuf,
    /// 命名方式
    pub naming: NamingStrategy,
    /// 自訂前綴（僅 custom 命名使用）
    pub custom_prefix: Option<String>,
    /// 請求超時
    pub timeout: Duration,
    /// 每張圖片的最大嘗試次數
    pub max_retries: u32,
    /// 每張圖片下載後的間隔
    pub delay: Duration,
    /// 重試前的等待時間
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl DownloadConfig {
    pub fn new(url: impl Into<String>, selector: ContainerSelector) -> Self {
        Self {
            url: url.into(),
            selector,
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            naming: NamingStrategy::Original,
            custom_prefix: None,
            timeout: Duration::from_secs(15),
            max_retries: 3,
            delay: Duration::ZERO,
            retry_delay: Duration::from_secs(1),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_save_dir(mut self, save_dir: impl Into<PathBuf>) -> Self {
        self.save_dir = save_dir.into();
        self
    }

    pub fn with_naming(mut self, naming: NamingStrategy, custom_prefix: Option<String>) -> Self {
        self.naming = naming;
        self.custom_prefix = custom_prefix;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// custom 命名時的前綴，其他情況為空字串
    pub fn prefix(&self) -> &str {
        self.custom_prefix.as_deref().unwrap_or("")
    }

    /// 這次執行的儲存位置：`save_dir/domain/YYYY-MM-DD-HHMM`
    pub fn run_location(&self, started_at: DateTime<Local>) -> RunLocation {
        RunLocation::resolve(&self.save_dir, &self.url, started_at)
    }

    /// 檢查前端傳入的參數
    ///
    /// 核心流程本身不呼叫這個方法；CLI 等前端在開始下載前使用。
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.url)?;

        if self.selector.value.trim().is_empty() {
            return Err(Error::InvalidConfiguration("選擇器值不可為空".to_string()));
        }

        if self.timeout.is_zero() {
            return Err(Error::InvalidConfiguration("超時時間必須大於 0".to_string()));
        }

        let has_prefix = self
            .custom_prefix
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());

        match (self.naming, has_prefix) {
            (NamingStrategy::Custom, false) => Err(Error::InvalidConfiguration(
                "使用 custom 命名方式時必須提供前綴".to_string(),
            )),
            (NamingStrategy::Custom, true) => Ok(()),
            (_, true) => Err(Error::InvalidConfiguration(
                "只有 custom 命名方式可以指定前綴".to_string(),
            )),
            (_, false) => Ok(()),
        }
    }
}
