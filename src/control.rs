//! 暫停 / 取消控制

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::Instant;

/// 暫停等待時的輪詢間隔，也是等待中觀察到取消的最大延遲
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// 等待結束後流程該怎麼走
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Cancelled,
}

#[derive(Debug, Default)]
struct Flags {
    paused: AtomicBool,
    cancelled: AtomicBool,
}

/// 前端與下載流程共用的控制旗標
///
/// 可以 clone 到其他執行緒（Ctrl+C handler、GUI 按鈕），
/// 下載流程在每個檢查點輪詢。
#[derive(Debug, Clone, Default)]
pub struct ControlHandle {
    flags: Arc<Flags>,
}

impl ControlHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flags.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.cancelled.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.flags.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.flags.paused.store(false, Ordering::SeqCst);
    }

    /// 切換暫停狀態，回傳切換後是否為暫停
    pub fn toggle_pause(&self) -> bool {
        !self.flags.paused.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::SeqCst)
    }

    /// 暫停期間阻塞，每次醒來都檢查取消
    pub async fn wait_while_paused(&self) -> Flow {
        loop {
            if self.is_cancelled() {
                return Flow::Cancelled;
            }
            if !self.is_paused() {
                return Flow::Continue;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// 可被取消中斷的等待
    pub async fn sleep(&self, duration: Duration) -> Flow {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_cancelled() {
                return Flow::Cancelled;
            }
            let now = Instant::now();
            if now >= deadline {
                return Flow::Continue;
            }
            tokio::time::sleep((deadline - now).min(POLL_INTERVAL)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let control = ControlHandle::new();
        assert!(!control.is_paused());
        assert!(!control.is_cancelled());

        assert!(control.toggle_pause());
        assert!(control.is_paused());
        assert!(!control.toggle_pause());
        assert!(!control.is_paused());

        control.pause();
        control.resume();
        assert!(!control.is_paused());

        control.cancel();
        assert!(control.is_cancelled());
    }

    #[test]
    fn test_clones_share_state() {
        let control = ControlHandle::new();
        let remote = control.clone();

        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(control.is_cancelled());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_running() {
        let control = ControlHandle::new();
        assert_eq!(control.wait_while_paused().await, Flow::Continue);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_resumed() {
        let control = ControlHandle::new();
        control.pause();

        let remote = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            remote.resume();
        });

        assert_eq!(control.wait_while_paused().await, Flow::Continue);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_paused() {
        let control = ControlHandle::new();
        control.pause();

        let remote = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            remote.cancel();
        });

        assert_eq!(control.wait_while_paused().await, Flow::Cancelled);
        assert!(control.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_interrupted_by_cancel() {
        let control = ControlHandle::new();
        let remote = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            remote.cancel();
        });

        let started = Instant::now();
        assert_eq!(control.sleep(Duration::from_secs(60)).await, Flow::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes() {
        let control = ControlHandle::new();
        assert_eq!(control.sleep(Duration::from_millis(1200)).await, Flow::Continue);
    }
}
