use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// 下載過程中回報給前端的事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// 整次執行無法繼續（網頁、容器、目錄等）
    RunFailed { reason: String },
    NamingFailed { url: String, reason: String },
    AlreadyDownloaded { filename: String },
    Downloaded { position: usize, total: usize, path: PathBuf },
    /// 單次嘗試失敗，之後會重試
    RetryFailed { url: String, attempt: u32, reason: String },
    /// 用完所有嘗試次數
    DownloadFailed { url: String, retries: u32, reason: String },
    SaveFailed { filename: String, reason: String },
    Paused,
    Resumed,
    Cancelled,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::RunFailed { reason } => write!(f, "{}", reason),
            ProgressEvent::NamingFailed { url, reason } => {
                write!(f, "檔名產生失敗: {}, 錯誤: {}", url, reason)
            }
            ProgressEvent::AlreadyDownloaded { filename } => write!(f, "跳過已下載: {}", filename),
            ProgressEvent::Downloaded { position, total, path } => {
                write!(f, "下載成功 ({}/{}): {}", position, total, path.display())
            }
            ProgressEvent::RetryFailed { url, attempt, reason } => {
                write!(f, "下載失敗（第 {} 次嘗試）: {}, 錯誤: {}", attempt, url, reason)
            }
            ProgressEvent::DownloadFailed { url, retries, reason } => {
                write!(f, "下載失敗（重試 {} 次）: {}, 錯誤: {}", retries, url, reason)
            }
            ProgressEvent::SaveFailed { filename, reason } => {
                write!(f, "儲存失敗: {}, 錯誤: {}", filename, reason)
            }
            ProgressEvent::Paused => write!(f, "⏸️  已暫停"),
            ProgressEvent::Resumed => write!(f, "▶️  繼續下載"),
            ProgressEvent::Cancelled => write!(f, "用戶取消下載"),
        }
    }
}

/// 進度輸出介面
///
/// 只需實作 `emit`；需要結構化資料的 sink 可以覆寫 `event`。
pub trait ProgressSink: Send + Sync {
    fn emit(&self, message: &str);

    fn event(&self, event: &ProgressEvent) {
        self.emit(&event.to_string());
    }
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, message: &str) {
        self(message)
    }
}

/// 終端機輸出：訊息印在 spinner 上方
pub struct ConsoleSink {
    pb: ProgressBar,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message("🔄 準備中...");
        Self { pb }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleSink {
    fn emit(&self, message: &str) {
        self.pb.println(message);
    }

    fn event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Downloaded { position, total, .. } => {
                self.pb.set_message(format!("🖼️  {}/{}", position, total));
            }
            ProgressEvent::Paused => self.pb.set_message("⏸️  暫停中（輸入 p 繼續）"),
            ProgressEvent::Resumed => self.pb.set_message("▶️  下載中"),
            _ => {}
        }
        self.emit(&event.to_string());
    }
}

/// 每個事件一行 JSON
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line<T: Serialize>(&self, value: &T) {
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };

        let result = serde_json::to_writer(&mut *writer, value)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(writer))
            .and_then(|_| writer.flush());

        if let Err(e) = result {
            tracing::warn!("無法寫入進度事件: {}", e);
        }
    }
}

impl<W: Write + Send> ProgressSink for JsonLinesSink<W> {
    fn emit(&self, message: &str) {
        self.write_line(&serde_json::json!({ "event": "message", "message": message }));
    }

    fn event(&self, event: &ProgressEvent) {
        self.write_line(event);
    }
}
