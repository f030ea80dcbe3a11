//! Scheduler lifecycle integration tests.
//!
//! These tests drive the conversion scheduler with mock encoder and
//! analyzer:
//! - Submission and directory expansion
//! - Status transitions through a full batch
//! - Concurrency bounds and start idempotence
//! - Error isolation and analyzer-unavailable handling

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use clipgate_core::analysis::ClipReport;
use clipgate_core::scheduler::{
    ConversionScheduler, ConversionStatus, ProcessingMode, SchedulerConfig, SchedulerError,
    SchedulerEvent,
};
use clipgate_core::testing::{MockAnalyzer, MockEncoder};

/// Test helper bundling a scheduler with its mocks.
struct TestHarness {
    scheduler: ConversionScheduler<MockEncoder, MockAnalyzer>,
    encoder: MockEncoder,
    analyzer: MockAnalyzer,
    source_dir: TempDir,
    temp_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        Self::with_config(SchedulerConfig::default()).await
    }

    async fn with_config(mut config: SchedulerConfig) -> Self {
        let source_dir = TempDir::new().expect("Failed to create source dir");
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        config.temp_dir = temp_dir.path().to_path_buf();

        let encoder = MockEncoder::new();
        let analyzer = MockAnalyzer::new();
        encoder.set_encode_duration(Duration::from_millis(10)).await;

        let scheduler = ConversionScheduler::new(config, encoder.clone(), analyzer.clone());

        Self {
            scheduler,
            encoder,
            analyzer,
            source_dir,
            temp_dir,
        }
    }

    fn create_source_file(&self, name: &str) -> PathBuf {
        let path = self.source_dir.path().join(name);
        std::fs::write(&path, b"test content").expect("Failed to create source file");
        path
    }

    async fn wait_until_finished(&self) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while self.scheduler.is_running().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("batch did not finish in time");
    }
}

// =============================================================================
// Submission Tests
// =============================================================================

#[tokio::test]
async fn test_submit_expands_directories_and_filters() {
    let harness = TestHarness::new().await;
    let nested = harness.source_dir.path().join("album");
    std::fs::create_dir_all(&nested).unwrap();
    harness.create_source_file("one.wav");
    harness.create_source_file("skip.flac");
    std::fs::write(nested.join("two.aiff"), b"x").unwrap();
    std::fs::write(nested.join("three.m4a"), b"x").unwrap();
    std::fs::write(nested.join("notes.txt"), b"x").unwrap();

    let added = harness
        .scheduler
        .submit(&[harness.source_dir.path().to_path_buf()])
        .await;

    assert_eq!(added, 3);
    let items = harness.scheduler.items().await;
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|i| i.status == ConversionStatus::Pending));
}

#[tokio::test]
async fn test_submit_marks_m4a_analyze_only() {
    let harness = TestHarness::new().await;
    let m4a = harness.create_source_file("done.m4a");
    let wav = harness.create_source_file("raw.wav");

    harness.scheduler.submit(&[m4a, wav]).await;

    let items = harness.scheduler.items().await;
    assert!(items[0].already_encoded);
    assert!(!items[1].already_encoded);
}

// =============================================================================
// Full Batch Tests
// =============================================================================

#[tokio::test]
async fn test_batch_converts_and_analyzes_all_items() {
    let harness = TestHarness::new().await;
    let a = harness.create_source_file("a.wav");
    let b = harness.create_source_file("b.aiff");
    harness.scheduler.submit(&[a.clone(), b.clone()]).await;

    assert!(
        harness
            .scheduler
            .start(ProcessingMode::ConvertAndKeep, None)
            .await
    );
    harness.wait_until_finished().await;

    let items = harness.scheduler.items().await;
    assert_eq!(items.len(), 2);
    for item in &items {
        assert!(
            matches!(&item.status, ConversionStatus::Completed { report: Some(_) }),
            "unexpected status: {:?}",
            item.status
        );
        let output = item.output_path.as_ref().expect("output path should be set");
        assert!(output.exists(), "converted file should exist");
        assert_eq!(output.extension().unwrap(), "m4a");
    }

    // Analysis ran on the converted outputs, not the sources
    let analyzed = harness.analyzer.analyzed_paths().await;
    assert_eq!(analyzed.len(), 2);
    assert!(analyzed.iter().all(|p| p.extension().unwrap() == "m4a"));

    let status = harness.scheduler.status().await;
    assert!(!status.running);
    assert_eq!(status.completed, 2);
    assert_eq!(status.failed, 0);
    assert_eq!(status.pending, 0);
}

#[tokio::test]
async fn test_m4a_items_skip_conversion() {
    let harness = TestHarness::new().await;
    let m4a = harness.create_source_file("mastered.m4a");
    harness.scheduler.submit(&[m4a.clone()]).await;

    harness
        .scheduler
        .start(ProcessingMode::ConvertAndKeep, None)
        .await;
    harness.wait_until_finished().await;

    assert_eq!(harness.encoder.encode_count().await, 0);
    assert_eq!(harness.analyzer.analyzed_paths().await, vec![m4a]);

    let items = harness.scheduler.items().await;
    assert!(items[0].output_path.is_none());
    assert!(matches!(
        &items[0].status,
        ConversionStatus::Completed { report: Some(_) }
    ));
}

#[tokio::test]
async fn test_analyze_only_discards_output() {
    let harness = TestHarness::new().await;
    let wav = harness.create_source_file("probe.wav");
    harness.scheduler.submit(&[wav]).await;

    harness
        .scheduler
        .start(ProcessingMode::AnalyzeOnly, None)
        .await;
    harness.wait_until_finished().await;

    let items = harness.scheduler.items().await;
    assert!(matches!(
        &items[0].status,
        ConversionStatus::Completed { report: Some(_) }
    ));
    // Nothing kept: no recorded output and no leftover temp artifact
    assert!(items[0].output_path.is_none());
    let leftovers: Vec<_> = std::fs::read_dir(harness.temp_dir.path())
        .unwrap()
        .flatten()
        .collect();
    assert!(leftovers.is_empty(), "temp artifacts left behind: {leftovers:?}");
}

// =============================================================================
// Failure Handling Tests
// =============================================================================

#[tokio::test]
async fn test_failed_item_does_not_abort_batch() {
    let harness = TestHarness::new().await;
    let good = harness.create_source_file("good.wav");
    let bad = harness.create_source_file("bad.wav");
    harness.encoder.fail_on(&bad).await;
    harness.scheduler.submit(&[good, bad.clone()]).await;

    let (tx, mut rx) = mpsc::channel(100);
    harness
        .scheduler
        .start(ProcessingMode::ConvertAndKeep, Some(tx))
        .await;
    harness.wait_until_finished().await;

    let items = harness.scheduler.items().await;
    assert!(matches!(
        &items[0].status,
        ConversionStatus::Completed { .. }
    ));
    match &items[1].status {
        ConversionStatus::Error { message } => assert!(message.contains("injected failure")),
        other => panic!("expected error status, got {other:?}"),
    }

    let mut saw_failed = false;
    let mut saw_finished = false;
    while let Some(event) = rx.recv().await {
        match event {
            SchedulerEvent::ItemFailed { name, .. } => {
                assert_eq!(name, "bad.wav");
                saw_failed = true;
            }
            SchedulerEvent::BatchFinished { completed, failed } => {
                assert_eq!(completed, 1);
                assert_eq!(failed, 1);
                saw_finished = true;
            }
            _ => {}
        }
    }
    assert!(saw_failed && saw_finished);
}

#[tokio::test]
async fn test_analyzer_unavailable_completes_without_report() {
    let harness = TestHarness::new().await;
    harness.analyzer.set_unavailable(true).await;
    let wav = harness.create_source_file("track.wav");
    harness.scheduler.submit(&[wav]).await;

    harness
        .scheduler
        .start(ProcessingMode::ConvertAndKeep, None)
        .await;
    harness.wait_until_finished().await;

    // Conversion succeeded; only analysis could not run. The item is
    // completed without a report, not failed.
    let items = harness.scheduler.items().await;
    assert!(matches!(
        &items[0].status,
        ConversionStatus::Completed { report: None }
    ));
    assert!(items[0].output_path.is_some());

    let status = harness.scheduler.status().await;
    assert_eq!(status.completed, 1);
    assert_eq!(status.failed, 0);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[tokio::test]
async fn test_concurrency_bound_is_respected() {
    let harness =
        TestHarness::with_config(SchedulerConfig::default().with_max_concurrent(4)).await;
    harness
        .encoder
        .set_encode_duration(Duration::from_millis(20))
        .await;

    let paths: Vec<PathBuf> = (0..50)
        .map(|i| harness.create_source_file(&format!("track-{i:02}.wav")))
        .collect();
    harness.scheduler.submit(&paths).await;

    harness
        .scheduler
        .start(ProcessingMode::ConvertAndKeep, None)
        .await;
    harness.wait_until_finished().await;

    assert_eq!(harness.encoder.encode_count().await, 50);
    let peak = harness.encoder.peak_concurrency();
    assert!(peak <= 4, "observed {peak} concurrent encodes with limit 4");

    let status = harness.scheduler.status().await;
    assert_eq!(status.completed, 50);
}

#[tokio::test]
async fn test_start_is_idempotent_while_running() {
    let harness = TestHarness::new().await;
    harness
        .encoder
        .set_encode_duration(Duration::from_millis(50))
        .await;
    let wav = harness.create_source_file("slow.wav");
    harness.scheduler.submit(&[wav]).await;

    assert!(
        harness
            .scheduler
            .start(ProcessingMode::ConvertAndKeep, None)
            .await
    );
    // Second start while running must not double-dispatch
    assert!(
        !harness
            .scheduler
            .start(ProcessingMode::ConvertAndKeep, None)
            .await
    );
    harness.wait_until_finished().await;

    assert_eq!(harness.encoder.encode_count().await, 1);
}

#[tokio::test]
async fn test_start_with_nothing_pending_is_noop() {
    let harness = TestHarness::new().await;
    assert!(
        !harness
            .scheduler
            .start(ProcessingMode::ConvertAndKeep, None)
            .await
    );
    assert!(!harness.scheduler.is_running().await);
}

#[tokio::test]
async fn test_batch_can_restart_with_new_items() {
    let harness = TestHarness::new().await;
    let first = harness.create_source_file("first.wav");
    harness.scheduler.submit(&[first]).await;

    harness
        .scheduler
        .start(ProcessingMode::ConvertAndKeep, None)
        .await;
    harness.wait_until_finished().await;

    let second = harness.create_source_file("second.wav");
    harness.scheduler.submit(&[second]).await;

    assert!(
        harness
            .scheduler
            .start(ProcessingMode::ConvertAndKeep, None)
            .await
    );
    harness.wait_until_finished().await;

    // Completed items were not re-dispatched
    assert_eq!(harness.encoder.encode_count().await, 2);
    let status = harness.scheduler.status().await;
    assert_eq!(status.completed, 2);
}

// =============================================================================
// Clear Tests
// =============================================================================

#[tokio::test]
async fn test_clear_rejected_while_running() {
    let harness = TestHarness::new().await;
    harness
        .encoder
        .set_encode_duration(Duration::from_millis(50))
        .await;
    let wav = harness.create_source_file("busy.wav");
    harness.scheduler.submit(&[wav]).await;
    harness
        .scheduler
        .start(ProcessingMode::ConvertAndKeep, None)
        .await;

    assert!(matches!(
        harness.scheduler.clear().await,
        Err(SchedulerError::Busy)
    ));

    harness.wait_until_finished().await;
    harness.scheduler.clear().await.unwrap();
    assert!(harness.scheduler.items().await.is_empty());
}

// =============================================================================
// Event Stream Tests
// =============================================================================

#[tokio::test]
async fn test_event_stream_for_one_item() {
    let harness = TestHarness::new().await;
    let wav = harness.create_source_file("track.wav");
    let mut clipped = ClipReport::empty("track.m4a", "/ignored");
    clipped.left_on_sample = 2;
    // Canned report keyed on the resolved output path
    let expected_output = harness.source_dir.path().join("track.m4a");
    harness.analyzer.set_report(&expected_output, clipped).await;
    harness.scheduler.submit(&[wav]).await;

    let (tx, mut rx) = mpsc::channel(100);
    harness
        .scheduler
        .start(ProcessingMode::ConvertAndKeep, Some(tx))
        .await;

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert!(matches!(&events[0], SchedulerEvent::ItemStarted { name, .. } if name == "track.wav"));

    let progress: Vec<f32> = events
        .iter()
        .filter_map(|e| match e {
            SchedulerEvent::ItemProgress { progress, .. } => Some(*progress),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![0.25, 0.75]);

    assert!(events.iter().any(|e| matches!(
        e,
        SchedulerEvent::ItemCompleted { report: Some(r), .. } if r.total_clips() == 2
    )));
    assert!(matches!(
        events.last(),
        Some(SchedulerEvent::BatchFinished { completed: 1, failed: 0 })
    ));
}
