// tests/dispatcher_single_flight.rs

use std::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

use ariawatch::engine::{Dispatcher, RunState};
use ariawatch::fs::mock::MockFileSystem;
use ariawatch::types::{DispatchResult, ProcessOutcome, UnreadableCause, WatchTarget};
use ariawatch_test_utils::fake_launcher::{FakeBehaviour, FakeLauncher};
use ariawatch_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const LINKS: &str = "links.txt";

fn dispatcher_with(fs: &MockFileSystem, launcher: &FakeLauncher) -> Arc<Dispatcher> {
    let target = WatchTarget::new(LINKS).expect("valid target");
    Arc::new(
        Dispatcher::new(
            target,
            "downloads",
            Arc::new(fs.clone()),
            Arc::new(launcher.clone()),
        )
        .expect("inside a runtime"),
    )
}

fn fs_with_links(contents: &str) -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file(LINKS, contents);
    fs
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_dispatch_starts_exactly_one_download() -> TestResult {
    init_tracing();

    let fs = fs_with_links("https://example.com/a.iso\n");
    let launcher = FakeLauncher::exiting_with(0).gated();
    let dispatcher = dispatcher_with(&fs, &launcher);
    let mut outcomes = dispatcher.subscribe_outcomes();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                dispatcher.try_dispatch()
            })
        })
        .collect();

    let results: Vec<DispatchResult> = handles
        .into_iter()
        .map(|h| h.join().expect("dispatch thread panicked"))
        .collect();

    let started = results.iter().filter(|r| r.is_started()).count();
    let skipped = results
        .iter()
        .filter(|r| **r == DispatchResult::SkippedAlreadyRunning)
        .count();
    assert_eq!(started, 1, "results: {results:?}");
    assert_eq!(skipped, 1, "results: {results:?}");
    assert!(dispatcher.is_running());

    launcher.release();
    let outcome = with_timeout(outcomes.recv()).await;
    assert_eq!(outcome, Some(ProcessOutcome::Success));

    assert_eq!(launcher.launch_count(), 1);
    assert_eq!(launcher.max_concurrent(), 1);
    assert_eq!(dispatcher.state(), RunState::Idle);
    Ok(())
}

#[tokio::test]
async fn trigger_while_running_is_skipped_not_queued() -> TestResult {
    init_tracing();

    let fs = fs_with_links("https://example.com/a.iso\n");
    let launcher = FakeLauncher::exiting_with(0).gated();
    let dispatcher = dispatcher_with(&fs, &launcher);
    let mut outcomes = dispatcher.subscribe_outcomes();

    assert_eq!(dispatcher.try_dispatch(), DispatchResult::Started);
    assert_eq!(dispatcher.try_dispatch(), DispatchResult::SkippedAlreadyRunning);
    assert_eq!(dispatcher.try_dispatch(), DispatchResult::SkippedAlreadyRunning);

    launcher.release();
    with_timeout(outcomes.recv()).await;

    // Nothing was queued behind the running download.
    assert!(dispatcher.wait_idle(std::time::Duration::from_secs(1)).await);
    assert_eq!(launcher.launch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn state_returns_to_idle_after_success_failure_and_panic() -> TestResult {
    init_tracing();

    let fs = fs_with_links("https://example.com/a.iso\n");
    let launcher = FakeLauncher::exiting_with(0);
    let dispatcher = dispatcher_with(&fs, &launcher);
    let mut outcomes = dispatcher.subscribe_outcomes();

    let cases = [
        (FakeBehaviour::Exit(0), "success"),
        (FakeBehaviour::Exit(7), "non-zero exit"),
        (FakeBehaviour::Fail("no such file".to_string()), "launch error"),
        (FakeBehaviour::Panic, "launcher panic"),
    ];

    for (behaviour, label) in cases {
        launcher.set_behaviour(behaviour);
        assert_eq!(
            dispatcher.try_dispatch(),
            DispatchResult::Started,
            "dispatch should start before {label}"
        );
        let outcome = with_timeout(outcomes.recv()).await;
        assert!(outcome.is_some(), "no outcome after {label}");
        assert_eq!(dispatcher.state(), RunState::Idle, "stuck Running after {label}");
    }

    // And one more after the panic, to be sure the slot really came back.
    launcher.set_behaviour(FakeBehaviour::Exit(0));
    assert_eq!(dispatcher.try_dispatch(), DispatchResult::Started);
    assert_eq!(with_timeout(outcomes.recv()).await, Some(ProcessOutcome::Success));
    assert_eq!(launcher.launch_count(), 5);
    Ok(())
}

#[tokio::test]
async fn comments_and_blank_lines_only_yield_no_content() -> TestResult {
    init_tracing();

    let fs = fs_with_links("# Add your links here (one per line)\n\n   \n  # indented comment\n\t\n");
    let launcher = FakeLauncher::exiting_with(0);
    let dispatcher = dispatcher_with(&fs, &launcher);

    assert_eq!(dispatcher.try_dispatch(), DispatchResult::SkippedNoContent);
    assert_eq!(dispatcher.state(), RunState::Idle);
    assert_eq!(launcher.launch_count(), 0);
    Ok(())
}

#[tokio::test]
async fn trailing_link_line_without_newline_counts_as_content() -> TestResult {
    init_tracing();

    let fs = fs_with_links("# header\n\nhttps://example.com/file.zip");
    let launcher = FakeLauncher::exiting_with(0);
    let dispatcher = dispatcher_with(&fs, &launcher);
    let mut outcomes = dispatcher.subscribe_outcomes();

    assert_eq!(dispatcher.try_dispatch(), DispatchResult::Started);
    with_timeout(outcomes.recv()).await;
    assert_eq!(launcher.launch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn unreadable_links_file_is_skipped_and_releases_slot() -> TestResult {
    init_tracing();

    let fs = fs_with_links("https://example.com/a.iso\n");
    fs.fail_on(LINKS);
    let launcher = FakeLauncher::exiting_with(0);
    let dispatcher = dispatcher_with(&fs, &launcher);

    match dispatcher.try_dispatch() {
        DispatchResult::SkippedUnreadable(UnreadableCause::LinksFile(msg)) => {
            assert!(msg.contains("Permission denied"), "cause: {msg}");
        }
        other => panic!("expected SkippedUnreadable(LinksFile), got {other:?}"),
    }
    assert_eq!(dispatcher.state(), RunState::Idle);
    assert_eq!(launcher.launch_count(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_links_file_is_unreadable() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    let launcher = FakeLauncher::exiting_with(0);
    let dispatcher = dispatcher_with(&fs, &launcher);

    assert!(matches!(
        dispatcher.try_dispatch(),
        DispatchResult::SkippedUnreadable(UnreadableCause::LinksFile(_))
    ));
    assert_eq!(dispatcher.state(), RunState::Idle);
    Ok(())
}

#[tokio::test]
async fn missing_executable_resets_state_and_reports_configuration_error() -> TestResult {
    init_tracing();

    let fs = fs_with_links("https://example.com/a.iso\n");
    let launcher = FakeLauncher::exiting_with(0).not_installed();
    let dispatcher = dispatcher_with(&fs, &launcher);

    assert_eq!(
        dispatcher.try_dispatch(),
        DispatchResult::SkippedUnreadable(UnreadableCause::MissingExecutable(
            "fake-aria2c".to_string()
        ))
    );
    assert_eq!(dispatcher.state(), RunState::Idle);
    assert_eq!(launcher.launch_count(), 0);
    Ok(())
}

#[tokio::test]
async fn downloader_gets_exactly_continue_dir_and_input_file() -> TestResult {
    init_tracing();

    let fs = fs_with_links("https://example.com/a.iso\n");
    let launcher = FakeLauncher::exiting_with(0);
    let dispatcher = dispatcher_with(&fs, &launcher);
    let mut outcomes = dispatcher.subscribe_outcomes();

    assert_eq!(dispatcher.try_dispatch(), DispatchResult::Started);
    with_timeout(outcomes.recv()).await;

    let invocations = launcher.invocations();
    assert_eq!(invocations.len(), 1);
    let invocation = &invocations[0];
    assert_eq!(invocation.program, PathBuf::from("/usr/bin/fake-aria2c"));
    assert_eq!(
        invocation.args,
        vec![
            OsString::from("--continue=true"),
            OsString::from("--dir=downloads"),
            OsString::from("--input-file=links.txt"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn wait_idle_times_out_on_a_hung_download() -> TestResult {
    init_tracing();

    let fs = fs_with_links("https://example.com/a.iso\n");
    let launcher = FakeLauncher::exiting_with(0).gated();
    let dispatcher = dispatcher_with(&fs, &launcher);

    assert_eq!(dispatcher.try_dispatch(), DispatchResult::Started);
    let settled = dispatcher
        .wait_idle(std::time::Duration::from_millis(50))
        .await;
    assert!(!settled);
    assert!(dispatcher.is_running());

    // The detached task still finishes once the child does.
    let mut outcomes = dispatcher.subscribe_outcomes();
    launcher.release();
    assert_eq!(with_timeout(outcomes.recv()).await, Some(ProcessOutcome::Success));
    assert!(!dispatcher.is_running());
    Ok(())
}
