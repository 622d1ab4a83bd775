use chrono::Local;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use super::downloader::{ImageDownloader, TaskOutcome, pause_checkpoint};
use crate::config::DownloadConfig;
use crate::control::{ControlHandle, Flow};
use crate::error::Result;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::file_manager::{FileManager, RunLocation};
use crate::naming::name_for;
use crate::parser::{extract_image_urls, fetch_container};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::types::ImageTask;

/// 整次執行如何結束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 所有圖片都處理過
    Completed,
    /// 使用者取消
    Cancelled,
    /// 網頁、容器或目錄準備失敗
    Aborted,
}

/// 執行結果統計
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub run_dir: PathBuf,
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn new(run_dir: PathBuf) -> Self {
        Self {
            outcome: RunOutcome::Completed,
            run_dir,
            total: 0,
            downloaded: 0,
            skipped: 0,
            failed: 0,
        }
    }

    fn finish(mut self, outcome: RunOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// 畫廊下載主流程
pub struct GalleryDownloader {
    config: DownloadConfig,
    fetcher: Arc<dyn Fetcher>,
}

impl GalleryDownloader {
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config.timeout, &config.user_agent)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: DownloadConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// 以現在時間決定執行目錄後開始下載
    pub async fn run(&self, control: &ControlHandle, sink: &dyn ProgressSink) -> RunSummary {
        let location = self.config.run_location(Local::now());
        self.run_in(location, control, sink).await
    }

    /// 在指定目錄下載
    ///
    /// 錯誤一律透過 `sink` 回報，不會回傳給呼叫端；呼叫端只拿到統計結果。
    pub async fn run_in(
        &self,
        location: RunLocation,
        control: &ControlHandle,
        sink: &dyn ProgressSink,
    ) -> RunSummary {
        let mut summary = RunSummary::new(location.dir().to_path_buf());
        let file_manager = FileManager::new(location);

        // 建立目錄並載入下載記錄
        let mut history = match prepare(&file_manager) {
            Ok(history) => history,
            Err(e) => {
                sink.event(&ProgressEvent::RunFailed { reason: e.to_string() });
                return summary.finish(RunOutcome::Aborted);
            }
        };

        // 抓取網頁並取出圖片清單
        let tasks = match self.collect_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!("無法取得圖片清單: {}", e);
                sink.event(&ProgressEvent::RunFailed { reason: e.to_string() });
                return summary.finish(RunOutcome::Aborted);
            }
        };

        let total = tasks.len();
        summary.total = total;
        tracing::info!("找到 {} 張圖片，已下載記錄 {} 筆", total, history.len());

        let downloader = ImageDownloader::new(
            self.fetcher.as_ref(),
            &file_manager,
            control,
            sink,
            self.config.max_retries,
            self.config.retry_delay,
        );

        for task in &tasks {
            // 取消 / 暫停檢查
            if control.is_cancelled() {
                return cancelled(summary, sink);
            }
            if pause_checkpoint(control, sink).await == Flow::Cancelled {
                return cancelled(summary, sink);
            }

            // 產生檔名，失敗只跳過這一張
            let filename = match name_for(&task.url, self.config.naming, self.config.prefix()) {
                Ok(filename) => filename,
                Err(e) => {
                    sink.event(&ProgressEvent::NamingFailed {
                        url: task.url.clone(),
                        reason: e.to_string(),
                    });
                    summary.failed += 1;
                    continue;
                }
            };

            // 已下載過就跳過
            if history.contains(&filename) {
                sink.event(&ProgressEvent::AlreadyDownloaded { filename });
                summary.skipped += 1;
                continue;
            }

            let attempted = match downloader.download(task, &filename, total, &mut history).await {
                TaskOutcome::Downloaded(_) => {
                    summary.downloaded += 1;
                    true
                }
                TaskOutcome::Failed { attempts } => {
                    summary.failed += 1;
                    attempts > 0
                }
                TaskOutcome::Cancelled => return cancelled(summary, sink),
            };

            // 有連線過才等待下載間隔
            if attempted
                && self.should_delay(task, total)
                && control.sleep(self.config.delay).await == Flow::Cancelled
            {
                return cancelled(summary, sink);
            }
        }

        tracing::info!(
            "完成: 下載 {} / 跳過 {} / 失敗 {}",
            summary.downloaded,
            summary.skipped,
            summary.failed
        );
        summary.finish(RunOutcome::Completed)
    }

    async fn collect_tasks(&self) -> Result<Vec<ImageTask>> {
        let container =
            fetch_container(self.fetcher.as_ref(), &self.config.url, &self.config.selector).await?;
        extract_image_urls(&container, &self.config.url)
    }

    /// 只在有下一張圖片時等待
    fn should_delay(&self, task: &ImageTask, total: usize) -> bool {
        !self.config.delay.is_zero() && task.index + 1 < total
    }
}

/// 建立執行目錄並載入下載記錄
fn prepare(file_manager: &FileManager) -> Result<HashSet<String>> {
    file_manager.location().create()?;
    tracing::info!("執行目錄: {}", file_manager.location().dir().display());
    file_manager.load_history()
}

fn cancelled(summary: RunSummary, sink: &dyn ProgressSink) -> RunSummary {
    sink.event(&ProgressEvent::Cancelled);
    summary.finish(RunOutcome::Cancelled)
}
