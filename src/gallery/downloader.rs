use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::control::{ControlHandle, Flow};
use crate::error::Error;
use crate::fetcher::Fetcher;
use crate::file_manager::FileManager;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::types::ImageTask;

/// 單張圖片的處理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// 已寫入磁碟並記錄
    Downloaded(PathBuf),
    /// 失敗；`attempts` 為實際送出的請求數
    Failed { attempts: u32 },
    Cancelled,
}

/// 暫停檢查點：暫停中就等待，並回報暫停 / 繼續
pub(crate) async fn pause_checkpoint(control: &ControlHandle, sink: &dyn ProgressSink) -> Flow {
    if !control.is_paused() {
        return Flow::Continue;
    }

    sink.event(&ProgressEvent::Paused);
    let flow = control.wait_while_paused().await;
    if flow == Flow::Continue {
        sink.event(&ProgressEvent::Resumed);
    }
    flow
}

/// 帶重試的單張圖片下載
pub struct ImageDownloader<'a> {
    fetcher: &'a dyn Fetcher,
    file_manager: &'a FileManager,
    control: &'a ControlHandle,
    sink: &'a dyn ProgressSink,
    max_retries: u32,
    retry_delay: Duration,
}

impl<'a> ImageDownloader<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        file_manager: &'a FileManager,
        control: &'a ControlHandle,
        sink: &'a dyn ProgressSink,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            file_manager,
            control,
            sink,
            max_retries,
            retry_delay,
        }
    }

    /// 最多嘗試 `max_retries` 次；每次嘗試前都檢查取消與暫停
    pub async fn download(
        &self,
        task: &ImageTask,
        filename: &str,
        total: usize,
        history: &mut HashSet<String>,
    ) -> TaskOutcome {
        // 0 次嘗試：不送請求，直接算失敗
        if self.max_retries == 0 {
            self.sink.event(&ProgressEvent::DownloadFailed {
                url: task.url.clone(),
                retries: 0,
                reason: "未設定任何嘗試次數".to_string(),
            });
            return TaskOutcome::Failed { attempts: 0 };
        }

        for attempt in 1..=self.max_retries {
            // 每次嘗試前檢查取消與暫停
            if self.control.is_cancelled() {
                return TaskOutcome::Cancelled;
            }
            if pause_checkpoint(self.control, self.sink).await == Flow::Cancelled {
                return TaskOutcome::Cancelled;
            }

            // 傳輸成功就寫檔，不再重試
            match self.fetcher.fetch_bytes(&task.url).await {
                Ok(bytes) => return self.store(task, filename, total, &bytes, history, attempt),
                // 最後一次也失敗
                Err(e) if attempt == self.max_retries => {
                    tracing::warn!("放棄下載 {}: {}", task.url, e);
                    self.sink.event(&ProgressEvent::DownloadFailed {
                        url: task.url.clone(),
                        retries: self.max_retries,
                        reason: failure_reason(&e),
                    });
                    return TaskOutcome::Failed { attempts: attempt };
                }
                Err(e) => {
                    self.sink.event(&ProgressEvent::RetryFailed {
                        url: task.url.clone(),
                        attempt,
                        reason: failure_reason(&e),
                    });
                    // 等待後重試，等待中可被取消
                    if self.control.sleep(self.retry_delay).await == Flow::Cancelled {
                        return TaskOutcome::Cancelled;
                    }
                }
            }
        }

        TaskOutcome::Failed {
            attempts: self.max_retries,
        }
    }

    /// 寫檔 → 記錄 → 回報，順序不可調換
    fn store(
        &self,
        task: &ImageTask,
        filename: &str,
        total: usize,
        bytes: &[u8],
        history: &mut HashSet<String>,
        attempts: u32,
    ) -> TaskOutcome {
        let saved = self
            .file_manager
            .save_image(filename, bytes)
            .and_then(|path| {
                self.file_manager.append_history(filename)?;
                Ok(path)
            });

        // 寫檔或記錄失敗都不重試
        match saved {
            Ok(path) => {
                history.insert(filename.to_string());
                self.sink.event(&ProgressEvent::Downloaded {
                    position: task.index + 1,
                    total,
                    path: path.clone(),
                });
                TaskOutcome::Downloaded(path)
            }
            Err(e) => {
                self.sink.event(&ProgressEvent::SaveFailed {
                    filename: filename.to_string(),
                    reason: e.to_string(),
                });
                TaskOutcome::Failed { attempts }
            }
        }
    }
}

fn failure_reason(error: &Error) -> String {
    match error {
        Error::Transfer { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
