//! Background indexer tests against a fake cass script

use crate::common::{is_alive, test_settings, FakeCass};
use cass_mcp::core::supervisor::BackgroundIndexer;
use cass_mcp::core::types::{IndexerMode, IndexerStatus};
use serial_test::serial;
use std::time::Duration;
use tokio::sync::watch;

async fn wait_for(
    rx: &mut watch::Receiver<IndexerStatus>,
    what: &str,
    f: impl FnMut(&IndexerStatus) -> bool,
) -> IndexerStatus {
    tokio::time::timeout(Duration::from_secs(10), rx.wait_for(f))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {what}"))
        .expect("status channel closed")
        .clone()
}

#[tokio::test]
#[serial]
async fn test_watch_mode_reports_pid() {
    let cass = FakeCass::new();
    let indexer = BackgroundIndexer::new(cass.runner(), test_settings());
    let mut rx = indexer.subscribe();

    indexer.start(true, false).await;
    let status = wait_for(&mut rx, "watch mode", |s| s.mode == IndexerMode::Watch).await;

    assert!(status.is_running);
    let pid = status.watch_pid.expect("watch pid") as i32;
    assert!(is_alive(pid));
    assert_eq!(cass.wait_for_watch_pids(1).await, vec![pid]);

    indexer.stop().await;
}

#[tokio::test]
#[serial]
async fn test_start_is_idempotent() {
    let cass = FakeCass::new();
    let indexer = BackgroundIndexer::new(cass.runner(), test_settings());
    let mut rx = indexer.subscribe();

    indexer.start(true, false).await;
    let first = wait_for(&mut rx, "watch mode", |s| s.mode == IndexerMode::Watch).await;

    indexer.start(true, false).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(indexer.get_status(), first);
    assert_eq!(cass.watch_pids().len(), 1);

    indexer.stop().await;
}

#[tokio::test]
#[serial]
async fn test_stop_leaves_no_watch_child() {
    let cass = FakeCass::new();
    let indexer = BackgroundIndexer::new(cass.runner(), test_settings());
    let mut rx = indexer.subscribe();

    indexer.start(true, false).await;
    let status = wait_for(&mut rx, "watch mode", |s| s.mode == IndexerMode::Watch).await;
    let pid = status.watch_pid.expect("watch pid") as i32;

    indexer.stop().await;

    assert!(!is_alive(pid), "watch child {pid} survived stop");
    let status = indexer.get_status();
    assert!(!status.is_running);
    assert_eq!(status.mode, IndexerMode::Stopped);
    assert!(status.watch_pid.is_none());

    // Second stop is a no-op
    indexer.stop().await;
    assert_eq!(indexer.get_status().mode, IndexerMode::Stopped);
}

#[tokio::test]
#[serial]
async fn test_crashed_watch_is_restarted() {
    let cass = FakeCass::new();
    cass.set_flag("crash_once");
    let indexer = BackgroundIndexer::new(cass.runner(), test_settings());
    let mut rx = indexer.subscribe();

    indexer.start(true, false).await;
    let status = wait_for(&mut rx, "restarted watch", |s| {
        s.mode == IndexerMode::Watch && s.watch_restarts >= 1
    })
    .await;

    assert!(status.is_running);
    let pids = cass.wait_for_watch_pids(2).await;
    assert_eq!(pids.len(), 2);
    assert_eq!(status.watch_pid, Some(pids[1] as u32));

    indexer.stop().await;
    assert!(!is_alive(pids[1]));
}

#[tokio::test]
#[serial]
async fn test_periodic_mode_indexes_on_interval() {
    let cass = FakeCass::new();
    let indexer = BackgroundIndexer::new(cass.runner(), test_settings());
    let mut rx = indexer.subscribe();

    indexer.start(false, false).await;
    let status = wait_for(&mut rx, "two periodic passes", |s| s.index_count >= 2).await;

    assert_eq!(status.mode, IndexerMode::Periodic);
    assert_eq!(status.index_interval_seconds, Some(0));
    assert!(status.last_index_time.is_some());
    assert_eq!(status.failed_index_count, 0);
    assert!(cass.watch_pids().is_empty());

    indexer.stop().await;
}

#[tokio::test]
#[serial]
async fn test_initial_pass_runs_before_steady_state() {
    let cass = FakeCass::new();
    let mut settings = test_settings();
    settings.interval = Duration::from_secs(60);
    let indexer = BackgroundIndexer::new(cass.runner(), settings);

    indexer.start(false, true).await;

    let status = indexer.get_status();
    assert_eq!(status.index_count, 1);
    assert!(status.last_index_time.is_some());
    assert_eq!(cass.last_args(), vec!["index"]);

    indexer.stop().await;
}

#[tokio::test]
#[serial]
async fn test_trigger_does_not_change_mode() {
    let cass = FakeCass::new();
    let mut settings = test_settings();
    settings.interval = Duration::from_secs(60);
    let indexer = BackgroundIndexer::new(cass.runner(), settings);
    let mut rx = indexer.subscribe();

    indexer.start(false, false).await;
    wait_for(&mut rx, "periodic mode", |s| s.mode == IndexerMode::Periodic).await;

    let result = indexer.trigger(true).await.unwrap();
    assert!(result.is_success());
    assert_eq!(cass.last_args(), vec!["index", "--full"]);

    let status = indexer.get_status();
    assert_eq!(status.mode, IndexerMode::Periodic);
    assert_eq!(status.index_count, 1);

    indexer.stop().await;
}

#[tokio::test]
#[serial]
async fn test_failed_passes_are_counted() {
    let cass = FakeCass::new();
    cass.set_flag("corrupt");
    let indexer = BackgroundIndexer::new(cass.runner(), test_settings());

    let result = indexer.trigger(false).await.unwrap();
    assert!(!result.is_success());

    let status = indexer.get_status();
    assert_eq!(status.index_count, 1);
    assert_eq!(status.failed_index_count, 1);
    assert!(status.last_index_time.is_none());
}

#[tokio::test]
#[serial]
async fn test_stop_during_initial_pass() {
    let cass = FakeCass::new();
    cass.set_flag("slow_index");
    let indexer = std::sync::Arc::new(BackgroundIndexer::new(cass.runner(), test_settings()));
    let mut rx = indexer.subscribe();

    let starter = {
        let indexer = std::sync::Arc::clone(&indexer);
        tokio::spawn(async move { indexer.start(true, true).await })
    };
    wait_for(&mut rx, "starting", |s| s.mode == IndexerMode::Starting).await;

    indexer.stop().await;
    tokio::time::timeout(Duration::from_secs(5), starter)
        .await
        .expect("start did not return after stop")
        .unwrap();

    let status = indexer.get_status();
    assert!(!status.is_running);
    assert_eq!(status.mode, IndexerMode::Stopped);
    assert!(cass.watch_pids().is_empty());
}
