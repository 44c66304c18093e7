// tests/watch_session.rs

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ProjectFixture, TestResult, init_tracing, mock_path, mock_project, with_timeout};

use assetflow::dag::{TaskId, TaskRegistry};
use assetflow::engine::{Orchestrator, TriggerQueue};
use assetflow::exec::BuildContext;
use assetflow::fs::FileSystem;
use assetflow::livesync::{LiveSyncHandle, Notification};
use assetflow::watch::{
    AfterBuild, WatchBinding, WatchEvent, WatchSession, default_bindings, spawn_watcher,
    tasks_for_path,
};
use notify::event::{AccessKind, CreateKind, EventKind};
use tokio::sync::mpsc;

fn session_for(ctx: BuildContext) -> Result<WatchSession, Box<dyn std::error::Error>> {
    let bindings = default_bindings(&ctx)?;
    let orchestrator = Orchestrator::new(TaskRegistry::standard()?, Arc::new(ctx));
    Ok(WatchSession::new(orchestrator, bindings))
}

#[test]
fn stylesheets_trigger_css_and_scripts_trigger_js() -> TestResult {
    let (fs, ctx) = mock_project(&[
        ("src/scss/partials/_nav.scss", ".nav {}\n"),
        ("src/js/lib/menu.js", "menu();\n"),
        ("src/scss/notes.txt", "not a stylesheet"),
    ]);
    let bindings = default_bindings(&ctx)?;

    assert_eq!(
        tasks_for_path(&*fs, &bindings, &mock_path("src/scss/partials/_nav.scss")),
        vec![TaskId::Css]
    );
    assert_eq!(
        tasks_for_path(&*fs, &bindings, &mock_path("src/js/lib/menu.js")),
        vec![TaskId::Js]
    );
    assert!(tasks_for_path(&*fs, &bindings, &mock_path("src/scss/notes.txt")).is_empty());
    assert!(tasks_for_path(&*fs, &bindings, &mock_path("static/js/script.min.js")).is_empty());
    Ok(())
}

#[test]
fn single_star_does_not_cross_directories() -> TestResult {
    let binding = WatchBinding::new(TaskId::Css, "/project/src", &["*.scss"], AfterBuild::Nothing)?;
    assert!(binding.matches("style.scss"));
    assert!(!binding.matches("partials/_a.scss"));
    Ok(())
}

#[test]
fn events_without_content_change_are_ignored() -> TestResult {
    let (fs, ctx) = mock_project(&[("src/scss/style.scss", "a { color: red; }\n")]);
    let mut session = session_for(ctx)?;
    let style = mock_path("src/scss/style.scss");

    assert_eq!(session.prime()?, 1);
    assert!(session.on_change(&style).is_empty());

    fs.add_file(&style, "a { color: blue; }\n");
    assert_eq!(session.on_change(&style), vec![TaskId::Css]);
    assert!(session.on_change(&style).is_empty());

    let report = session.report();
    assert_eq!(report.triggers, 1);
    assert_eq!(report.ignored, 2);
    Ok(())
}

#[test]
fn repeated_triggers_coalesce_into_one_build() -> TestResult {
    let (fs, ctx) = mock_project(&[("src/js/script.js", "a();\n")]);
    let mut session = session_for(ctx)?;
    let script = mock_path("src/js/script.js");

    session.on_change(&script);
    fs.add_file(&script, "b();\n");
    session.on_change(&script);

    assert_eq!(session.queue().len(), 1);
    assert_eq!(session.queue().received(), 2);
    Ok(())
}

#[test]
fn deleted_file_still_triggers_a_rebuild() -> TestResult {
    let (_fs, ctx) = mock_project(&[]);
    let mut session = session_for(ctx)?;

    let tasks = session.on_change(&mock_path("src/js/removed.js"));

    assert_eq!(tasks, vec![TaskId::Js]);
    Ok(())
}

#[test]
fn trigger_queue_drains_in_task_order() {
    let mut queue = TriggerQueue::new();
    queue.record_trigger(TaskId::Js);
    queue.record_trigger(TaskId::Css);
    queue.record_trigger(TaskId::Js);

    assert_eq!(queue.drain_pending(), vec![TaskId::Css, TaskId::Js]);
    assert!(queue.is_empty());
    assert_eq!(queue.received(), 3);
    assert!(queue.drain_pending().is_empty());
}

#[tokio::test]
async fn failed_rebuild_keeps_the_session_alive() -> TestResult {
    init_tracing();
    let (fs, ctx) = mock_project(&[
        ("src/scss/style.scss", "@import \"missing\";\n"),
        ("src/js/script.js", "go();\n"),
    ]);
    let sync = LiveSyncHandle::start("http://localhost:8080/")?;
    let mut client = sync.subscribe();
    let session = session_for(ctx.with_live_sync(sync))?;

    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(WatchEvent::Changed(mock_path("src/scss/style.scss")))?;
    tx.send(WatchEvent::Changed(mock_path("src/js/script.js")))?;
    let handle = tokio::spawn(session.run(rx));

    let notification = with_timeout(client.recv()).await?;
    assert_eq!(notification, Notification::Reload);
    tx.send(WatchEvent::Shutdown)?;

    let report = with_timeout(handle).await?;
    assert_eq!(report.triggers, 2);
    assert_eq!(report.builds, 2);
    assert_eq!(report.failed_builds, 1);
    assert_eq!(fs.read_to_string(&mock_path("static/js/script.min.js"))?, "go();\n");
    assert!(!fs.exists(&mock_path("static/css/style.min.css")));
    Ok(())
}

#[test]
fn autofix_rewrite_is_not_seen_as_an_edit() -> TestResult {
    let (fs, ctx) = mock_project(&[("src/js/script.js", "var a = 1\n")]);
    let mut session = session_for(ctx.clone())?;
    let script = mock_path("src/js/script.js");
    session.prime()?;

    let report = assetflow::script::lint_scripts(&ctx)?;
    assert_eq!(report.files_fixed, vec![script.clone()]);
    assert_eq!(fs.read_to_string(&script)?, "var a = 1;\n");

    assert!(session.on_change(&script).is_empty());
    assert_eq!(session.absorb_own_writes(), 0);

    fs.add_file(&script, "var a = 2;\n");
    assert_eq!(session.on_change(&script), vec![TaskId::Js]);
    Ok(())
}

#[tokio::test]
async fn js_rebuild_with_autofix_reloads_once() -> TestResult {
    let (fs, ctx) = mock_project(&[("src/js/script.js", "go();\n")]);
    let sync = LiveSyncHandle::start("http://localhost:8080/")?;
    let mut client = sync.subscribe();
    let mut session = session_for(ctx.with_live_sync(sync))?;
    let script = mock_path("src/js/script.js");
    session.prime()?;

    fs.add_file(&script, "go()\n");
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(WatchEvent::Changed(script.clone()))?;
    let handle = tokio::spawn(session.run(rx));

    assert_eq!(with_timeout(client.recv()).await?, Notification::Reload);
    // The lint fix rewrote the source; its change event follows the build.
    tx.send(WatchEvent::Changed(script.clone()))?;
    tx.send(WatchEvent::Shutdown)?;

    let report = with_timeout(handle).await?;
    assert_eq!(report.triggers, 1);
    assert_eq!(report.builds, 1);
    assert_eq!(fs.read_to_string(&script)?, "go();\n");
    assert!(client.try_recv().is_err(), "second reload sent");
    Ok(())
}

#[tokio::test]
async fn closing_the_event_channel_ends_the_session() -> TestResult {
    let (_fs, ctx) = mock_project(&[]);
    let session = session_for(ctx)?;
    let (tx, rx) = mpsc::unbounded_channel::<WatchEvent>();
    drop(tx);

    let report = with_timeout(session.run(rx)).await;

    assert_eq!(report.builds, 0);
    Ok(())
}

#[test]
fn access_events_are_not_changes() {
    assert!(!assetflow::watch::watcher::is_relevant(&EventKind::Access(AccessKind::Any)));
    assert!(assetflow::watch::watcher::is_relevant(&EventKind::Create(CreateKind::File)));
}

#[tokio::test]
async fn real_watcher_reports_written_files() -> TestResult {
    let project = ProjectFixture::new().file("src/scss/style.scss", "a {}\n");
    let root = project.path("src/scss");
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _handle = spawn_watcher(root.clone(), tx)?;

    tokio::time::sleep(Duration::from_millis(100)).await;
    project.write("src/scss/style.scss", "b {}\n");

    let seen = with_timeout(async {
        while let Some(event) = rx.recv().await {
            if let WatchEvent::Changed(path) = event {
                if path.file_name() == root.join("style.scss").file_name() {
                    return true;
                }
            }
        }
        false
    })
    .await;
    assert!(seen, "no change event for style.scss");
    Ok(())
}
