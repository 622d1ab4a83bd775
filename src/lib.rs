//! 從單一網頁的畫廊容器下載所有圖片。
//!
//! 流程：抓取網頁 → 找出容器 → 取出圖片 URL → 逐張下載（重試、去重、暫停 / 取消）。
//! 前端（CLI、GUI）只負責建立 [`DownloadConfig`]、提供 [`ProgressSink`]，
//! 並透過 [`ControlHandle`] 控制執行。

pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod fetcher;
pub mod file_manager;
pub mod gallery;
pub mod naming;
pub mod parser;
pub mod progress;
pub mod types;

pub use config::DownloadConfig;
pub use control::ControlHandle;
pub use error::{Error, Result};
pub use gallery::{GalleryDownloader, RunOutcome, RunSummary};
pub use progress::{ProgressEvent, ProgressSink};
pub use types::{ContainerSelector, NamingStrategy, SelectorKind};
