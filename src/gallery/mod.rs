// 子模組
pub mod downloader;
pub mod engine;

// 重新導出
pub use downloader::{ImageDownloader, TaskOutcome};
pub use engine::{GalleryDownloader, RunOutcome, RunSummary};
