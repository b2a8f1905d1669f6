//! Orchestrator lifecycle integration tests.
//!
//! These tests drive a full merge with mock retriever and remuxer:
//! downloading_video -> downloading_audio -> merging -> complete

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use splice_core::{
    orchestrator::{JobStatus, MergeCallbacks, MergeError, MergeOrchestrator},
    remuxer::{Remuxer, RemuxerError},
    retriever::{Retriever, RetrieverError, TransferProgress},
    stream::Pairing,
    testing::{fixtures, MockRemuxer, MockRetriever},
};

/// Test helper wiring mocks into an orchestrator.
struct TestHarness {
    retriever: MockRetriever,
    remuxer: MockRemuxer,
    temp_dir: TempDir,
}

/// Everything the callbacks reported during one run.
#[derive(Default)]
struct Observed {
    statuses: Vec<JobStatus>,
    video: Vec<TransferProgress>,
    audio: Vec<TransferProgress>,
}

impl TestHarness {
    async fn new() -> Self {
        let retriever = MockRetriever::new();
        retriever
            .set_payload(&fixtures::video_url(), vec![b'v'; 40_000])
            .await;
        retriever
            .set_payload(&fixtures::audio_url(), vec![b'a'; 10_000])
            .await;

        Self {
            retriever,
            remuxer: MockRemuxer::new(),
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn orchestrator(&self) -> MergeOrchestrator {
        MergeOrchestrator::new(
            Arc::new(self.retriever.clone()) as Arc<dyn Retriever>,
            Arc::new(self.remuxer.clone()) as Arc<dyn Remuxer>,
        )
    }

    fn output(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    fn recording_callbacks(observed: &Arc<Mutex<Observed>>) -> MergeCallbacks {
        let statuses = observed.clone();
        let video = observed.clone();
        let audio = observed.clone();
        MergeCallbacks::new()
            .with_status(move |s| statuses.lock().unwrap().statuses.push(s))
            .with_video_progress(move |p| video.lock().unwrap().video.push(p))
            .with_audio_progress(move |p| audio.lock().unwrap().audio.push(p))
    }

    fn temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|name| name.starts_with(".temp_"))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// =============================================================================
// Successful Merges
// =============================================================================

#[tokio::test]
async fn test_merge_happy_path() {
    let harness = TestHarness::new().await;
    let observed = Arc::new(Mutex::new(Observed::default()));
    let output = harness.output("clip.mp4");

    let outcome = harness
        .orchestrator()
        .run(
            &fixtures::video_url(),
            &fixtures::audio_url(),
            &output,
            TestHarness::recording_callbacks(&observed),
        )
        .await
        .unwrap();

    assert_eq!(outcome.path, output);
    assert_eq!(outcome.size, 50_000);
    assert_eq!(outcome.pairing, Pairing::Detected);
    assert_eq!(std::fs::metadata(&output).unwrap().len(), 50_000);

    let observed = observed.lock().unwrap();
    assert_eq!(
        observed.statuses,
        vec![
            JobStatus::DownloadingVideo,
            JobStatus::DownloadingAudio,
            JobStatus::Merging,
            JobStatus::Complete,
        ]
    );
    assert_eq!(observed.video.last().unwrap().downloaded, 40_000);
    assert_eq!(observed.audio.last().unwrap().downloaded, 10_000);

    assert!(TestHarness::temp_files(harness.temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_merge_reorders_swapped_urls() {
    let harness = TestHarness::new().await;
    let output = harness.output("swapped.mp4");

    let outcome = harness
        .orchestrator()
        .run(
            &fixtures::audio_url(),
            &fixtures::video_url(),
            &output,
            MergeCallbacks::new(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.pairing, Pairing::Detected);

    let retrievals = harness.retriever.recorded_retrievals().await;
    assert_eq!(retrievals.len(), 2);
    assert_eq!(retrievals[0].url, fixtures::video_url());
    assert_eq!(retrievals[1].url, fixtures::audio_url());

    // Video input comes first in the remux call
    let remuxes = harness.remuxer.recorded_remuxes().await;
    assert_eq!(remuxes.len(), 1);
    assert_eq!(remuxes[0].video_size, Some(40_000));
    assert_eq!(remuxes[0].audio_size, Some(10_000));
    assert_eq!(remuxes[0].output, output);
}

#[tokio::test]
async fn test_merge_positional_fallback() {
    let harness = TestHarness::new().await;
    let first = fixtures::unknown_url("first");
    let second = fixtures::unknown_url("second");
    harness.retriever.set_payload(&first, vec![1; 300]).await;
    harness.retriever.set_payload(&second, vec![2; 100]).await;

    let outcome = harness
        .orchestrator()
        .run(&first, &second, &harness.output("guess.mp4"), MergeCallbacks::new())
        .await
        .unwrap();

    assert_eq!(outcome.pairing, Pairing::Positional);
    let remuxes = harness.remuxer.recorded_remuxes().await;
    assert_eq!(remuxes[0].video_size, Some(300));
    assert_eq!(remuxes[0].audio_size, Some(100));
}

#[tokio::test]
async fn test_merge_creates_missing_output_directory() {
    let harness = TestHarness::new().await;
    let output = harness.output("nested/deeper/clip.mp4");

    harness
        .orchestrator()
        .run(
            &fixtures::video_url(),
            &fixtures::audio_url(),
            &output,
            MergeCallbacks::new(),
        )
        .await
        .unwrap();

    assert!(output.exists());
    assert!(TestHarness::temp_files(output.parent().unwrap()).is_empty());
}

#[tokio::test]
async fn test_progress_monotonic_and_bounded() {
    let harness = TestHarness::new().await;
    harness.retriever.set_chunk_size(3_000).await;
    let observed = Arc::new(Mutex::new(Observed::default()));

    harness
        .orchestrator()
        .run(
            &fixtures::video_url(),
            &fixtures::audio_url(),
            &harness.output("progress.mp4"),
            TestHarness::recording_callbacks(&observed),
        )
        .await
        .unwrap();

    let observed = observed.lock().unwrap();
    for reports in [&observed.video, &observed.audio] {
        assert!(reports.len() > 1);
        for pair in reports.windows(2) {
            assert!(pair[0].downloaded <= pair[1].downloaded);
        }
        for report in reports.iter() {
            let total = report.total.unwrap();
            assert!(report.downloaded <= total);
        }
        assert_eq!(reports.last().unwrap().percent(), Some(100));
    }
}

#[tokio::test]
async fn test_progress_with_unknown_total() {
    let harness = TestHarness::new().await;
    harness.retriever.set_announce_total(false).await;
    let observed = Arc::new(Mutex::new(Observed::default()));

    harness
        .orchestrator()
        .run(
            &fixtures::video_url(),
            &fixtures::audio_url(),
            &harness.output("unknown.mp4"),
            TestHarness::recording_callbacks(&observed),
        )
        .await
        .unwrap();

    let observed = observed.lock().unwrap();
    assert!(observed.video.iter().all(|p| p.total.is_none()));
    assert!(observed.video.iter().all(|p| p.percent().is_none()));
    assert_eq!(observed.video.last().unwrap().downloaded, 40_000);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_remux_failure_cleans_up() {
    let harness = TestHarness::new().await;
    harness
        .remuxer
        .set_next_error(RemuxerError::failed(
            Some(1),
            "[mov,mp4] moov atom not found\nInvalid data found when processing input",
            500,
        ))
        .await;
    let observed = Arc::new(Mutex::new(Observed::default()));

    let err = harness
        .orchestrator()
        .run(
            &fixtures::video_url(),
            &fixtures::audio_url(),
            &harness.output("broken.mp4"),
            TestHarness::recording_callbacks(&observed),
        )
        .await
        .unwrap_err();

    match &err {
        MergeError::Remux(RemuxerError::RemuxFailed {
            exit_code,
            stderr_tail,
        }) => {
            assert_eq!(*exit_code, Some(1));
            assert!(stderr_tail.contains("Invalid data found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), "remux_failed");

    let observed = observed.lock().unwrap();
    assert_eq!(observed.statuses.last(), Some(&JobStatus::Merging));
    assert!(!observed.statuses.contains(&JobStatus::Complete));

    assert!(TestHarness::temp_files(harness.temp_dir.path()).is_empty());
    assert!(!harness.output("broken.mp4").exists());
}

#[tokio::test]
async fn test_audio_failure_skips_remux_and_cleans_up() {
    let harness = TestHarness::new().await;
    harness
        .retriever
        .fail_url(
            &fixtures::audio_url(),
            RetrieverError::HttpStatus {
                url: fixtures::audio_url(),
                status: 403,
            },
        )
        .await;

    let err = harness
        .orchestrator()
        .run(
            &fixtures::video_url(),
            &fixtures::audio_url(),
            &harness.output("partial.mp4"),
            MergeCallbacks::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MergeError::Retrieval(RetrieverError::HttpStatus { status: 403, .. })
    ));
    assert_eq!(err.kind(), "transport");
    assert!(harness.remuxer.recorded_remuxes().await.is_empty());
    assert!(TestHarness::temp_files(harness.temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_video_failure_stops_before_audio() {
    let harness = TestHarness::new().await;
    harness
        .retriever
        .set_next_error(RetrieverError::IdleTimeout {
            url: fixtures::video_url(),
            timeout_secs: 60,
        })
        .await;
    let observed = Arc::new(Mutex::new(Observed::default()));

    let err = harness
        .orchestrator()
        .run(
            &fixtures::video_url(),
            &fixtures::audio_url(),
            &harness.output("stalled.mp4"),
            TestHarness::recording_callbacks(&observed),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "transport");
    assert_eq!(harness.retriever.retrieval_count().await, 1);
    assert_eq!(
        observed.lock().unwrap().statuses,
        vec![JobStatus::DownloadingVideo]
    );
    assert!(TestHarness::temp_files(harness.temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_remux_unavailable() {
    let harness = TestHarness::new().await;
    harness
        .remuxer
        .set_next_error(RemuxerError::RemuxUnavailable {
            path: PathBuf::from("/missing/ffmpeg"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
        .await;

    let err = harness
        .orchestrator()
        .run(
            &fixtures::video_url(),
            &fixtures::audio_url(),
            &harness.output("noffmpeg.mp4"),
            MergeCallbacks::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "remux_unavailable");
    assert!(TestHarness::temp_files(harness.temp_dir.path()).is_empty());
}

/// Remuxer that reports success without producing a file.
struct NoOutputRemuxer;

#[async_trait::async_trait]
impl Remuxer for NoOutputRemuxer {
    fn name(&self) -> &str {
        "no-output"
    }

    async fn remux(
        &self,
        _video: &Path,
        _audio: &Path,
        output: &Path,
    ) -> Result<PathBuf, RemuxerError> {
        Ok(output.to_path_buf())
    }

    async fn validate(&self) -> Result<(), RemuxerError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_missing_output_after_remux_is_filesystem_error() {
    let harness = TestHarness::new().await;
    let orchestrator = MergeOrchestrator::new(
        Arc::new(harness.retriever.clone()) as Arc<dyn Retriever>,
        Arc::new(NoOutputRemuxer) as Arc<dyn Remuxer>,
    );
    let observed = Arc::new(Mutex::new(Observed::default()));
    let output = harness.output("vanished.mp4");

    let err = orchestrator
        .run(
            &fixtures::video_url(),
            &fixtures::audio_url(),
            &output,
            TestHarness::recording_callbacks(&observed),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MergeError::Filesystem { ref path, .. } if path == &output));
    assert_eq!(err.kind(), "filesystem");
    assert!(!observed
        .lock()
        .unwrap()
        .statuses
        .contains(&JobStatus::Complete));
    assert!(TestHarness::temp_files(harness.temp_dir.path()).is_empty());
}
