// tests/orchestrator_events.rs

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::event::{CreateKind, DataChange, ModifyKind, RenameMode};
use notify::{Event, EventKind};
use tokio::sync::{mpsc, oneshot};

use ariawatch::engine::{Dispatcher, EventDecision, IgnoreReason, Orchestrator, OrchestratorState};
use ariawatch::fs::mock::MockFileSystem;
use ariawatch::types::{DispatchResult, WatchTarget};
use ariawatch::watch::{ChangeEvent, ChangeKind, DebounceGate};
use ariawatch_test_utils::fake_launcher::FakeLauncher;
use ariawatch_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

struct Fixture {
    fs: MockFileSystem,
    launcher: FakeLauncher,
    dispatcher: Arc<Dispatcher>,
}

fn fixture(links: &str) -> Result<Fixture, Box<dyn Error>> {
    let fs = MockFileSystem::new();
    fs.add_file("work/links.txt", links);
    let launcher = FakeLauncher::exiting_with(0);
    let target = WatchTarget::new("work/links.txt").ok_or("bad target")?;
    let dispatcher = Arc::new(Dispatcher::new(
        target,
        "work/downloads",
        Arc::new(fs.clone()),
        Arc::new(launcher.clone()),
    )?);
    Ok(Fixture {
        fs,
        launcher,
        dispatcher,
    })
}

fn orchestrator(fx: &Fixture) -> Orchestrator {
    Orchestrator::new(DebounceGate::new(Duration::from_secs(1)), Arc::clone(&fx.dispatcher))
}

fn event(path: &str, kind: ChangeKind, is_dir: bool, at: Instant) -> ChangeEvent {
    ChangeEvent {
        path: PathBuf::from(path),
        kind,
        is_dir,
        at,
    }
}

#[tokio::test]
async fn events_for_other_files_never_reach_the_gate() -> TestResult {
    init_tracing();
    let fx = fixture("https://example.com/a\n")?;
    let mut orch = orchestrator(&fx);
    let t0 = Instant::now();

    for name in ["work/other.txt", "work/links.txt.swp", "work/.links.txt.un~", "links.bak"] {
        assert_eq!(
            orch.handle_event(ChangeEvent::modified(name, t0)),
            EventDecision::Ignored(IgnoreReason::OtherFile),
            "{name}"
        );
    }

    // The gate is untouched, so the real file is still accepted at t0.
    assert!(matches!(
        orch.handle_event(ChangeEvent::modified("work/links.txt", t0)),
        EventDecision::Dispatched(DispatchResult::Started)
    ));
    Ok(())
}

#[tokio::test]
async fn matching_is_by_file_name_not_full_path() -> TestResult {
    init_tracing();
    let fx = fixture("https://example.com/a\n")?;
    let mut orch = orchestrator(&fx);

    let decision = orch.handle_event(ChangeEvent::modified(
        "/absolute/prefix/from/the/os/work/links.txt",
        Instant::now(),
    ));
    assert_eq!(decision, EventDecision::Dispatched(DispatchResult::Started));
    Ok(())
}

#[tokio::test]
async fn directory_events_are_ignored_even_with_the_same_name() -> TestResult {
    init_tracing();
    let fx = fixture("https://example.com/a\n")?;
    let mut orch = orchestrator(&fx);

    let decision = orch.handle_event(event(
        "work/links.txt",
        ChangeKind::Created,
        true,
        Instant::now(),
    ));
    assert_eq!(decision, EventDecision::Ignored(IgnoreReason::Directory));
    assert_eq!(fx.launcher.launch_count(), 0);
    Ok(())
}

#[tokio::test]
async fn removals_and_metadata_changes_are_not_content_changes() -> TestResult {
    init_tracing();
    let fx = fixture("https://example.com/a\n")?;
    let mut orch = orchestrator(&fx);
    let t0 = Instant::now();

    for kind in [ChangeKind::Removed, ChangeKind::Other] {
        assert_eq!(
            orch.handle_event(event("work/links.txt", kind, false, t0)),
            EventDecision::Ignored(IgnoreReason::NotAContentChange)
        );
    }

    // Creation counts (editors that save by rename-over).
    assert!(matches!(
        orch.handle_event(event("work/links.txt", ChangeKind::Created, false, t0)),
        EventDecision::Dispatched(_)
    ));
    Ok(())
}

#[tokio::test]
async fn save_burst_dispatches_once() -> TestResult {
    init_tracing();
    let fx = fixture("https://example.com/a\n")?;
    let mut orch = orchestrator(&fx);
    let mut outcomes = fx.dispatcher.subscribe_outcomes();
    let t0 = Instant::now();

    let decisions: Vec<EventDecision> = [0u64, 20, 40, 300, 999]
        .iter()
        .map(|ms| {
            orch.handle_event(ChangeEvent::modified(
                "work/links.txt",
                t0 + Duration::from_millis(*ms),
            ))
        })
        .collect();

    assert_eq!(decisions[0], EventDecision::Dispatched(DispatchResult::Started));
    assert!(decisions[1..].iter().all(|d| *d == EventDecision::Debounced));

    with_timeout(outcomes.recv()).await;
    assert_eq!(fx.launcher.launch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn accepted_trigger_with_empty_file_reports_no_content() -> TestResult {
    init_tracing();
    let fx = fixture("# Add your links here (one per line)\n")?;
    let mut orch = orchestrator(&fx);
    let t0 = Instant::now();

    assert_eq!(
        orch.handle_event(ChangeEvent::modified("work/links.txt", t0)),
        EventDecision::Dispatched(DispatchResult::SkippedNoContent)
    );

    fx.fs.append("work/links.txt", b"https://example.com/b\n");
    // Still inside the window opened by the empty save.
    assert_eq!(
        orch.handle_event(ChangeEvent::modified(
            "work/links.txt",
            t0 + Duration::from_millis(200)
        )),
        EventDecision::Debounced
    );
    assert_eq!(
        orch.handle_event(ChangeEvent::modified(
            "work/links.txt",
            t0 + Duration::from_millis(1200)
        )),
        EventDecision::Dispatched(DispatchResult::Started)
    );
    Ok(())
}

#[tokio::test]
async fn run_loop_walks_through_all_states() -> TestResult {
    init_tracing();
    let fx = fixture("https://example.com/a\n")?;
    let (decision_tx, mut decision_rx) = mpsc::unbounded_channel();
    let orch = orchestrator(&fx).with_decisions(decision_tx);
    assert_eq!(orch.state(), OrchestratorState::Stopped);

    let mut state = orch.subscribe_state();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel();
    let task = tokio::spawn(orch.run(event_rx, stop_rx));

    with_timeout(state.wait_for(|s| *s == OrchestratorState::Watching)).await?;

    event_tx.send(ChangeEvent::modified("work/links.txt", Instant::now()))?;
    let decision = with_timeout(decision_rx.recv()).await;
    assert_eq!(decision, Some(EventDecision::Dispatched(DispatchResult::Started)));

    stop_tx.send(()).map_err(|_| "orchestrator already gone")?;
    with_timeout(task).await?;
    assert_eq!(*state.borrow(), OrchestratorState::Stopped);

    // Nothing is consumed after stopping.
    assert!(event_tx
        .send(ChangeEvent::modified("work/links.txt", Instant::now()))
        .is_err());
    Ok(())
}

#[tokio::test]
async fn run_loop_stops_when_the_event_source_goes_away() -> TestResult {
    init_tracing();
    let fx = fixture("https://example.com/a\n")?;
    let orch = orchestrator(&fx);
    let state = orch.subscribe_state();

    let (event_tx, event_rx) = mpsc::unbounded_channel::<ChangeEvent>();
    let (_stop_tx, stop_rx) = oneshot::channel();
    let task = tokio::spawn(orch.run(event_rx, stop_rx));

    drop(event_tx);
    with_timeout(task).await?;
    assert_eq!(*state.borrow(), OrchestratorState::Stopped);
    assert_eq!(fx.launcher.launch_count(), 0);
    Ok(())
}

#[tokio::test]
async fn backup_rename_save_dispatches_the_new_contents() -> TestResult {
    init_tracing();
    // State after the save: the new file holds the link.
    let fx = fixture("# queue\nhttps://example.com/a.iso\n")?;
    let mut orch = orchestrator(&fx);
    let mut outcomes = fx.dispatcher.subscribe_outcomes();
    let t0 = Instant::now();

    let links = PathBuf::from("work/links.txt");
    let backup = PathBuf::from("work/links.txt~");
    let save = [
        Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From))).add_path(links.clone()),
        Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To))).add_path(backup.clone()),
        Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(links.clone())
            .add_path(backup),
        Event::new(EventKind::Create(CreateKind::File)).add_path(links.clone()),
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Any))).add_path(links),
    ];

    let decisions: Vec<EventDecision> = save
        .iter()
        .enumerate()
        .flat_map(|(i, ev)| ChangeEvent::from_notify(ev, t0 + Duration::from_millis(i as u64)))
        .map(|change| orch.handle_event(change))
        .collect();

    assert_eq!(
        decisions,
        vec![
            EventDecision::Ignored(IgnoreReason::NotAContentChange),
            EventDecision::Ignored(IgnoreReason::OtherFile),
            EventDecision::Ignored(IgnoreReason::NotAContentChange),
            EventDecision::Ignored(IgnoreReason::OtherFile),
            EventDecision::Dispatched(DispatchResult::Started),
            EventDecision::Debounced,
        ]
    );
    with_timeout(outcomes.recv()).await;
    assert_eq!(fx.launcher.launch_count(), 1);
    Ok(())
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn live_watcher_backup_rename_save_starts_a_download() -> TestResult {
    use ariawatch::fs::RealFileSystem;
    use ariawatch::watch::{NotifyWatchBackend, WatchBackend};

    init_tracing();
    let tmp = tempfile::TempDir::new()?;
    let links = tmp.path().join("links.txt");
    std::fs::write(&links, "# Add your links here (one per line)\n")?;

    let launcher = FakeLauncher::exiting_with(0);
    let target = WatchTarget::new(&links).ok_or("bad target")?;
    let dispatcher = Arc::new(Dispatcher::new(
        target,
        tmp.path().join("downloads"),
        Arc::new(RealFileSystem),
        Arc::new(launcher.clone()),
    )?);
    let (decision_tx, mut decisions) = mpsc::unbounded_channel();
    let orch = Orchestrator::new(DebounceGate::new(Duration::from_secs(1)), Arc::clone(&dispatcher))
        .with_decisions(decision_tx);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut backend = NotifyWatchBackend::new();
    backend.watch(tmp.path(), event_tx)?;
    let (stop_tx, stop_rx) = oneshot::channel();
    let task = tokio::spawn(orch.run(event_rx, stop_rx));

    std::fs::rename(&links, tmp.path().join("links.txt~"))?;
    std::fs::write(&links, "# Add your links here (one per line)\nhttps://example.com/a.iso\n")?;

    let mut seen = Vec::new();
    let started = with_timeout(async {
        while let Some(decision) = decisions.recv().await {
            let hit = decision == EventDecision::Dispatched(DispatchResult::Started);
            seen.push(decision);
            if hit {
                return true;
            }
        }
        false
    })
    .await;
    assert!(started, "decisions: {seen:?}");

    backend.unwatch();
    stop_tx.send(()).map_err(|_| "orchestrator already gone")?;
    with_timeout(task).await?;
    assert_eq!(launcher.launch_count(), 1);
    Ok(())
}
