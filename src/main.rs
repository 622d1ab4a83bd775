use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;
use tracing_subscriber::{EnvFilter, fmt};

use gallery_downloader::cli::Args;
use gallery_downloader::progress::{ConsoleSink, JsonLinesSink};
use gallery_downloader::{ControlHandle, GalleryDownloader, NamingStrategy, RunOutcome, RunSummary};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = args.to_config();
    config.validate().context("參數錯誤")?;

    if !args.json {
        println!("開始下載: {}", config.url);
        println!("選擇器: {}", config.selector);
        println!("保存目錄: {}", config.save_dir.display());
        match config.naming {
            NamingStrategy::Custom => println!("命名方式: custom (前綴: {})", config.prefix()),
            naming => println!("命名方式: {}", naming),
        }
        println!(
            "超時: {}秒, 重試: {}次",
            config.timeout.as_secs(),
            config.max_retries
        );
        println!("按 Ctrl+C 取消下載，輸入 p 並按 Enter 暫停 / 繼續\n");
    }

    let downloader = GalleryDownloader::new(config).context("無法建立下載器")?;
    let control = ControlHandle::new();

    spawn_ctrl_c_handler(control.clone());
    spawn_pause_reader(control.clone());

    if args.json {
        let sink = JsonLinesSink::new(std::io::stdout());
        downloader.run(&control, &sink).await;
    } else {
        let sink = ConsoleSink::new();
        let summary = downloader.run(&control, &sink).await;
        sink.finish();
        print_summary(&summary);
    }

    Ok(())
}

/// Ctrl+C → 取消；下載流程在下一個檢查點結束
fn spawn_ctrl_c_handler(control: ControlHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n下載已取消");
            control.cancel();
        }
    });
}

/// 讀取 stdin，輸入 p 切換暫停
fn spawn_pause_reader(control: ControlHandle) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("p") {
                control.toggle_pause();
            }
        }
    });
}

fn print_summary(summary: &RunSummary) {
    match summary.outcome {
        RunOutcome::Completed => {
            println!("\n下載完成!");
            println!(
                "📊 共 {} 張: 下載 {} / 跳過 {} / 失敗 {}",
                summary.total, summary.downloaded, summary.skipped, summary.failed
            );
            println!("📁 {}", summary.run_dir.display());
        }
        RunOutcome::Cancelled => {
            println!("\n已取消，已下載 {} 張", summary.downloaded);
        }
        RunOutcome::Aborted => {}
    }
}
