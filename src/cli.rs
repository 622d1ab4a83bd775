//! 命令列參數

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{DEFAULT_SAVE_DIR, DownloadConfig};
use crate::types::{ContainerSelector, NamingStrategy, SelectorKind};

/// 圖片下載器 CLI 版本
#[derive(Parser, Debug)]
#[command(
    name = "gallery-downloader",
    version,
    about = "下載網頁畫廊中的所有圖片",
    long_about = "下載網頁畫廊中的所有圖片。\n\n\
                  按 Ctrl+C 取消下載；輸入 p 並按 Enter 暫停 / 繼續。"
)]
pub struct Args {
    /// 目標網頁 URL
    pub url: String,

    /// 畫廊選擇器值
    pub selector_value: String,

    /// 選擇器類型
    #[arg(long, value_enum, default_value_t = SelectorKindArg::Id)]
    pub selector_type: SelectorKindArg,

    /// 圖片保存目錄
    #[arg(long, default_value = DEFAULT_SAVE_DIR)]
    pub save_dir: PathBuf,

    /// 文件名命名方式
    #[arg(long, value_enum, default_value_t = NamingArg::Original)]
    pub naming: NamingArg,

    /// 自定義文件名前綴（命名方式為 custom 時使用）
    #[arg(long)]
    pub prefix: Option<String>,

    /// 下載超時時間（秒）
    #[arg(long, default_value_t = 15)]
    pub timeout: u64,

    /// 下載失敗重試次數
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// 每張圖片之間的間隔（秒）
    #[arg(long, default_value = "0", value_parser = parse_delay)]
    pub delay: Duration,

    /// 以 JSON lines 輸出進度事件
    #[arg(long)]
    pub json: bool,

    /// 顯示除錯 log
    #[arg(long)]
    pub debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorKindArg {
    Id,
    Class,
}

impl From<SelectorKindArg> for SelectorKind {
    fn from(arg: SelectorKindArg) -> Self {
        match arg {
            SelectorKindArg::Id => SelectorKind::Id,
            SelectorKindArg::Class => SelectorKind::Class,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamingArg {
    Original,
    Uuid,
    Timestamp,
    Custom,
}

impl From<NamingArg> for NamingStrategy {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Original => NamingStrategy::Original,
            NamingArg::Uuid => NamingStrategy::Uuid,
            NamingArg::Timestamp => NamingStrategy::Timestamp,
            NamingArg::Custom => NamingStrategy::Custom,
        }
    }
}

impl Args {
    pub fn to_config(&self) -> DownloadConfig {
        let selector = ContainerSelector {
            kind: self.selector_type.into(),
            value: self.selector_value.clone(),
        };

        let naming: NamingStrategy = self.naming.into();
        let prefix = match naming {
            NamingStrategy::Custom => self.prefix.clone(),
            _ => None,
        };

        DownloadConfig::new(self.url.clone(), selector)
            .with_save_dir(self.save_dir.clone())
            .with_naming(naming, prefix)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_retries(self.retries)
            .with_delay(self.delay)
    }
}

/// 間隔必須是有限的非負秒數
fn parse_delay(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{}' 不是有效的秒數", value))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("間隔必須是非負的有限秒數: {}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["gallery-downloader", "http://example.com", "gallery"]).unwrap();
        let config = args.to_config();

        assert_eq!(config.selector, ContainerSelector::id("gallery"));
        assert_eq!(config.save_dir, PathBuf::from("downloaded_images"));
        assert_eq!(config.naming, NamingStrategy::Original);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_retries, 3);
        assert!(config.delay.is_zero());
        assert!(!args.json);
    }

    #[test]
    fn test_all_options() {
        let args = Args::try_parse_from([
            "gallery-downloader",
            "http://example.com/page",
            "thumbs",
            "--selector-type",
            "class",
            "--save-dir",
            "out",
            "--naming",
            "custom",
            "--prefix",
            "cat",
            "--timeout",
            "30",
            "--retries",
            "5",
            "--delay",
            "1.5",
        ])
        .unwrap();
        let config = args.to_config();

        assert_eq!(config.selector, ContainerSelector::class("thumbs"));
        assert_eq!(config.save_dir, PathBuf::from("out"));
        assert_eq!(config.naming, NamingStrategy::Custom);
        assert_eq!(config.prefix(), "cat");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.delay, Duration::from_millis(1500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_without_prefix_fails_validation() {
        let args = Args::try_parse_from([
            "gallery-downloader",
            "http://example.com",
            "gallery",
            "--naming",
            "custom",
        ])
        .unwrap();
        assert!(args.to_config().validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_selector_type() {
        let result = Args::try_parse_from([
            "gallery-downloader",
            "http://example.com",
            "gallery",
            "--selector-type",
            "xpath",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_invalid_delay() {
        for delay in ["--delay=-1", "--delay=NaN", "--delay=inf", "--delay=soon"] {
            let result = Args::try_parse_from(["gallery-downloader", "http://example.com", "gallery", delay]);
            assert!(result.is_err(), "{}", delay);
        }
    }
}
