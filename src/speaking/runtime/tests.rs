use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};

use crate::capture::testing::FakeMicrophone;
use crate::capture::{MicrophoneAccess, RecordingCoordinator};
use crate::config::PracticeConfig;
use crate::speaking::*;

fn config() -> PracticeConfig {
    PracticeConfig {
        tick_interval: Duration::from_secs(1),
        ..PracticeConfig::default()
    }
}

fn spawn(
    mic: &Arc<FakeMicrophone>,
    steps: Vec<Step>,
) -> (PracticeSessionHandle, broadcast::Receiver<SessionSnapshot>) {
    let script = StepScript::new(steps).expect("non-empty script");
    let coordinator = RecordingCoordinator::new(Arc::clone(mic) as Arc<dyn MicrophoneAccess>);
    spawn_practice_session(Sequencer::new(script, coordinator), &config())
}

fn question(id: u32, secs: u32) -> Step {
    Step::new(
        id,
        "Part 1",
        "Weekends",
        "How do you usually spend your weekends?",
        secs,
        StepKind::Question,
    )
}

fn preparation(id: u32, secs: u32) -> Step {
    Step::new(
        id,
        "Part 2",
        "Cue Card (Preparation)",
        "Describe a place you visited.",
        secs,
        StepKind::Preparation,
    )
}

#[tokio::test(start_paused = true)]
async fn one_second_ticks_drive_session_to_finished() {
    let mic = Arc::new(FakeMicrophone::granting());
    let (handle, mut updates) = spawn(&mic, vec![question(1, 2), preparation(2, 1)]);
    let started_at = Instant::now();

    let snapshot = handle.start().await.expect("start succeeds");
    assert_eq!(snapshot.state, SequencerState::Active { step_index: 0 });
    assert_eq!(snapshot.remaining_secs, 2);

    let first = updates.recv().await.expect("start published");
    assert_eq!(first.state, SequencerState::Active { step_index: 0 });

    let ticked = updates.recv().await.expect("tick published");
    assert_eq!(ticked.remaining_secs, 1);
    assert_eq!(started_at.elapsed(), Duration::from_secs(1));

    let second_step = updates.recv().await.expect("advance published");
    assert_eq!(second_step.state, SequencerState::Active { step_index: 1 });
    assert_eq!(second_step.remaining_secs, 1);

    let finished = updates.recv().await.expect("finish published");
    assert!(finished.finished());
    assert!(finished.recordings.is_empty());
    assert_eq!(started_at.elapsed(), Duration::from_secs(3));

    sleep(Duration::from_secs(5)).await;
    assert!(updates.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn record_and_stop_through_handle() {
    let mic = Arc::new(FakeMicrophone::granting());
    let (handle, _updates) = spawn(&mic, vec![question(0, 5), question(1, 5)]);

    handle.start().await.expect("start succeeds");
    let recording = handle.begin_recording().await.expect("capture starts");
    assert!(recording.recording);

    sleep(Duration::from_millis(2_500)).await;
    let stopped = handle.stop_recording().await.expect("capture stops");
    assert!(!stopped.recording);
    assert!(stopped.just_recorded);
    assert_eq!(stopped.remaining_secs, 3);
    assert_eq!(stopped.recordings.len(), 1);
    assert!(stopped.recordings.get(0).is_some());

    let err = handle
        .send(SessionCommand::Start)
        .await
        .expect_err("already started");
    assert_eq!(err, SequencerError::AlreadyStarted);
}

#[tokio::test(start_paused = true)]
async fn finish_step_restarts_tick_phase() {
    let mic = Arc::new(FakeMicrophone::granting());
    let (handle, _updates) = spawn(&mic, vec![question(1, 5), question(2, 3)]);

    handle.start().await.expect("start succeeds");
    sleep(Duration::from_millis(1_500)).await;
    assert_eq!(
        handle.snapshot().await.expect("snapshot").remaining_secs,
        4
    );

    let next = handle.finish_step().await.expect("finish early");
    assert_eq!(next.state, SequencerState::Active { step_index: 1 });
    assert_eq!(next.remaining_secs, 3);

    sleep(Duration::from_millis(500)).await;
    assert_eq!(
        handle.snapshot().await.expect("snapshot").remaining_secs,
        3
    );

    sleep(Duration::from_millis(600)).await;
    assert_eq!(
        handle.snapshot().await.expect("snapshot").remaining_secs,
        2
    );
}

#[tokio::test(start_paused = true)]
async fn permission_denied_surfaces_to_caller() {
    let mic = Arc::new(FakeMicrophone::denying());
    let (handle, _updates) = spawn(&mic, vec![question(1, 5)]);

    let err = handle.start().await.expect_err("permission denied");
    assert!(matches!(err, SequencerError::PermissionDenied { .. }));

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.state, SequencerState::NotStarted);
}

#[tokio::test(start_paused = true)]
async fn shutdown_releases_live_capture() {
    let mic = Arc::new(FakeMicrophone::granting());
    let (handle, _updates) = spawn(&mic, vec![question(1, 60)]);

    handle.start().await.expect("start succeeds");
    handle.begin_recording().await.expect("capture starts");
    assert_eq!(mic.open_streams(), 1);

    let snapshot = handle.shutdown().await.expect("shutdown succeeds");
    assert!(!snapshot.recording);
    assert!(snapshot.recordings.is_empty());
    assert_eq!(mic.open_streams(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_releases_live_capture() {
    let mic = Arc::new(FakeMicrophone::granting());
    let (handle, _updates) = spawn(&mic, vec![question(1, 60)]);

    handle.start().await.expect("start succeeds");
    handle.begin_recording().await.expect("capture starts");
    drop(handle);

    sleep(Duration::from_millis(10)).await;
    assert_eq!(mic.open_streams(), 0);
}

#[tokio::test(start_paused = true)]
async fn reset_returns_to_not_started() {
    let mic = Arc::new(FakeMicrophone::granting());
    let (handle, _updates) = spawn(&mic, vec![question(1, 1)]);

    handle.start().await.expect("start succeeds");
    sleep(Duration::from_millis(1_100)).await;
    assert!(handle.snapshot().await.expect("snapshot").finished());

    let snapshot = handle.reset().await.expect("reset succeeds");
    assert_eq!(snapshot.state, SequencerState::NotStarted);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(
        handle.snapshot().await.expect("snapshot").state,
        SequencerState::NotStarted
    );
}

#[tokio::test(start_paused = true)]
async fn late_subscriber_sees_following_snapshots() {
    let mic = Arc::new(FakeMicrophone::granting());
    let (handle, _updates) = spawn(&mic, vec![question(1, 3)]);

    handle.start().await.expect("start succeeds");
    let mut late = handle.subscribe();

    let ticked = late.recv().await.expect("tick published");
    assert_eq!(ticked.state, SequencerState::Active { step_index: 0 });
    assert_eq!(ticked.remaining_secs, 2);
}
