//! 圖片檔名產生規則

use std::path::Path;

use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::NamingStrategy;

/// 依命名方式產生圖片的檔名
///
/// 只有 `Original` 是確定性的；其餘方式每次呼叫都會產生新的名稱，
/// 碰撞交由寫檔時的編號處理。
pub fn name_for(image_url: &str, strategy: NamingStrategy, custom_prefix: &str) -> Result<String> {
    let original = last_segment(image_url);
    let ext = extension_of(&original);

    let name = match strategy {
        NamingStrategy::Original => {
            if original.is_empty() {
                format!("image_{}{}", url_hash(image_url), ext)
            } else {
                original
            }
        }
        NamingStrategy::Uuid => format!("{}{}", Uuid::new_v4(), ext),
        NamingStrategy::Timestamp => format!("{}{}", chrono::Utc::now().timestamp(), ext),
        NamingStrategy::Custom => {
            if custom_prefix.is_empty() {
                return Err(Error::InvalidConfiguration(
                    "custom 命名方式需要非空的前綴".to_string(),
                ));
            }
            format!("{}_{}{}", sanitize_prefix(custom_prefix), random_suffix(6), ext)
        }
    };

    Ok(name)
}

/// URL 路徑的最後一段（不含 query 與 fragment）
fn last_segment(image_url: &str) -> String {
    match Url::parse(image_url) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
            .to_string(),
        Err(_) => {
            let path = image_url.split(['?', '#']).next().unwrap_or("");
            path.rsplit('/').next().unwrap_or("").to_string()
        }
    }
}

/// 將前綴中不能出現在檔名裡的字元換成 `_`
fn sanitize_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// 含點號的副檔名，例如 `.jpg`；沒有時為空字串
pub(crate) fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

fn url_hash(image_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image_url.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    hash[..16].to_string()
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
