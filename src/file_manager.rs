use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::Result;
use crate::naming::extension_of;

/// 下載記錄檔名
pub const HISTORY_FILE: &str = "downloaded.txt";

/// URL 沒有網域時使用的目錄名稱
pub const UNKNOWN_DOMAIN: &str = "unknown_domain";

/// 單次執行的儲存目錄 `save_dir/domain/YYYY-MM-DD-HHMM`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLocation {
    dir: PathBuf,
}

impl RunLocation {
    /// 直接指定目錄（例如接續先前的執行）
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn resolve(save_dir: &Path, page_url: &str, started_at: DateTime<Local>) -> Self {
        let timestamp = started_at.format("%Y-%m-%d-%H%M").to_string();
        Self {
            dir: save_dir.join(domain_of(page_url)).join(timestamp),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 建立目錄（含上層），已存在不算錯誤
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }
}

/// 取得 URL 的網域作為目錄名稱
pub fn domain_of(page_url: &str) -> String {
    let Ok(url) = Url::parse(page_url) else {
        return UNKNOWN_DOMAIN.to_string();
    };

    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) if !host.is_empty() => format!("{}_{}", host, port),
        (Some(host), None) if !host.is_empty() => host.to_string(),
        _ => UNKNOWN_DOMAIN.to_string(),
    }
}

/// 單次執行目錄內的檔案操作
pub struct FileManager {
    location: RunLocation,
}

impl FileManager {
    pub fn new(location: RunLocation) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &RunLocation {
        &self.location
    }

    /// 讀取已下載的檔名
    ///
    /// 記錄檔不存在時回傳空集合；空白行會被忽略。
    pub fn load_history(&self) -> Result<HashSet<String>> {
        let path = self.location.history_path();

        if !path.exists() {
            return Ok(HashSet::new());
        }

        let content = fs::read_to_string(&path)?;
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(names)
    }

    /// 以 append 模式寫入一個檔名
    pub fn append_history(&self, filename: &str) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.location.history_path())?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", filename)?;
        writer.flush()?;

        Ok(())
    }

    /// 儲存圖片，回傳實際寫入的路徑
    ///
    /// 目標已存在時在副檔名前加上 `_1`、`_2`…，原檔案保持不變。
    pub fn save_image(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.unique_path(filename);
        fs::write(&path, data)?;
        Ok(path)
    }

    /// 在執行目錄內找出第一個未被佔用的路徑
    ///
    /// 下載記錄檔的名稱視為已佔用，圖片不會覆寫它。
    pub fn unique_path(&self, filename: &str) -> PathBuf {
        if !self.is_taken(filename) {
            return self.location.dir().join(filename);
        }

        let ext = extension_of(filename);
        let stem = &filename[..filename.len() - ext.len()];

        let mut counter = 1;
        loop {
            let candidate = format!("{}_{}{}", stem, counter, ext);
            if !self.is_taken(&candidate) {
                return self.location.dir().join(candidate);
            }
            counter += 1;
        }
    }

    fn is_taken(&self, filename: &str) -> bool {
        filename == HISTORY_FILE || self.location.dir().join(filename).exists()
    }
}
