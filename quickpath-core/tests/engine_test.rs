use std::{fs, path::MAIN_SEPARATOR, time::Duration};

use quickpath_core::{
    CompletionEngine, CompletionEvent, config::CompletionConfig, error::AppError,
};
use tempfile::TempDir;
use tokio::{sync::mpsc::UnboundedReceiver, time::timeout};

fn test_config() -> CompletionConfig {
    CompletionConfig {
        debounce: Duration::from_millis(30),
        preload: false,
        case_sensitive_keys: true,
        ..CompletionConfig::default()
    }
}

fn prefix_of(dir: &TempDir) -> String {
    format!("{}{MAIN_SEPARATOR}", dir.path().display())
}

/// Wait for the next event matching `pred`, failing after two seconds.
async fn next_matching<F>(events: &mut UnboundedReceiver<CompletionEvent>, pred: F) -> CompletionEvent
where
    F: Fn(&CompletionEvent) -> bool,
{
    timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.expect("engine event stream closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn results(event: &CompletionEvent) -> Vec<String> {
    match event {
        CompletionEvent::ResultsAvailable { results, .. } => results.as_slice().to_vec(),
        _ => Vec::new(),
    }
}

#[tokio::test]
async fn test_typing_burst_produces_one_query() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("docs")).unwrap();
    fs::write(temp_dir.path().join("data.csv"), b"").unwrap();
    fs::write(temp_dir.path().join("notes.md"), b"").unwrap();
    let prefix = prefix_of(&temp_dir);

    let (handle, mut events, task) = CompletionEngine::spawn(test_config());

    for len in 1..=prefix.len() {
        handle.text_changed(&prefix[..len]).unwrap();
    }
    handle.text_changed(format!("{prefix}d")).unwrap();

    let event = next_matching(&mut events, |e| {
        matches!(e, CompletionEvent::ResultsAvailable { .. })
    })
    .await;

    assert_eq!(
        results(&event),
        vec![format!("{prefix}data.csv"), format!("{prefix}docs")]
    );

    // The whole burst was one query: the generation counter moved once.
    if let CompletionEvent::ResultsAvailable { generation, .. } = event {
        assert_eq!(generation, 1);
    }

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_accepting_directory_chains_into_its_listing() {
    let temp_dir = TempDir::new().unwrap();
    let inner = temp_dir.path().join("Projects");
    fs::create_dir(&inner).unwrap();
    fs::write(inner.join("readme.txt"), b"").unwrap();
    let prefix = prefix_of(&temp_dir);

    let (handle, mut events, task) = CompletionEngine::spawn(test_config());

    handle.text_changed(format!("{prefix}pro")).unwrap();
    let first = next_matching(&mut events, |e| {
        matches!(e, CompletionEvent::ResultsAvailable { .. })
    })
    .await;
    assert_eq!(results(&first), vec![format!("{prefix}Projects")]);

    handle.accept().unwrap();

    let drilled = format!("{prefix}Projects{MAIN_SEPARATOR}");
    let replaced = next_matching(&mut events, |e| {
        matches!(e, CompletionEvent::TextReplaced(_))
    })
    .await;
    assert_eq!(replaced, CompletionEvent::TextReplaced(drilled.clone()));

    let listing = next_matching(&mut events, |e| {
        matches!(e, CompletionEvent::ResultsAvailable { .. })
    })
    .await;
    assert_eq!(results(&listing), vec![format!("{drilled}readme.txt")]);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_non_path_text_clears_results() {
    let (handle, mut events, task) = CompletionEngine::spawn(test_config());

    handle.text_changed("github.com").unwrap();
    let event = next_matching(&mut events, |_| true).await;
    assert_eq!(event, CompletionEvent::ResultsCleared);
    assert_eq!(handle.cache().stats().misses, 0);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_empty_text_clears_immediately() {
    let (handle, mut events, task) = CompletionEngine::spawn(test_config());

    handle.text_changed("").unwrap();
    let event = next_matching(&mut events, |_| true).await;
    assert_eq!(event, CompletionEvent::ResultsCleared);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_invalidation_picks_up_new_entries() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("old.txt"), b"").unwrap();
    let prefix = prefix_of(&temp_dir);

    let (handle, mut events, task) = CompletionEngine::spawn(test_config());

    handle.text_changed(prefix.clone()).unwrap();
    let first = next_matching(&mut events, |e| {
        matches!(e, CompletionEvent::ResultsAvailable { .. })
    })
    .await;
    assert_eq!(results(&first), vec![format!("{prefix}old.txt")]);

    // Let the worker finish writing the cache before touching the directory.
    let key = quickpath_core::cache::CacheKey::from_prefix(&prefix, true);
    for _ in 0..100 {
        if handle.cache().contains(&key) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    fs::write(temp_dir.path().join("new.txt"), b"").unwrap();
    handle.invalidate_prefix(prefix.clone()).unwrap();
    handle.text_changed(format!("{prefix}n")).unwrap();

    let second = next_matching(&mut events, |e| {
        matches!(e, CompletionEvent::ResultsAvailable { .. })
    })
    .await;
    assert_eq!(results(&second), vec![format!("{prefix}new.txt")]);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_handle_reports_stopped_engine() {
    let (handle, _events, task) = CompletionEngine::spawn(test_config());
    handle.shutdown().unwrap();
    task.await.unwrap();

    assert!(matches!(
        handle.text_changed("/tmp/"),
        Err(AppError::EngineStopped)
    ));
}

#[tokio::test]
async fn test_event_stream_drains_then_closes_after_shutdown() {
    let (handle, mut events, task) = CompletionEngine::spawn(test_config());

    handle.dismiss().unwrap();
    handle.shutdown().unwrap();
    task.await.unwrap();

    assert_eq!(events.recv().await, Some(CompletionEvent::ResultsCleared));
    assert_eq!(events.recv().await, None);
}

#[tokio::test]
async fn test_dismiss_discards_pending_text() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("late.txt"), b"").unwrap();
    let prefix = prefix_of(&temp_dir);

    let (handle, mut events, task) = CompletionEngine::spawn(test_config());

    handle.text_changed(prefix).unwrap();
    handle.dismiss().unwrap();

    let event = next_matching(&mut events, |_| true).await;
    assert_eq!(event, CompletionEvent::ResultsCleared);

    // Well past the quiet interval: the discarded text never became a query.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(events.try_recv().is_err());
    assert_eq!(handle.cache().stats().misses, 0);

    handle.shutdown().unwrap();
    task.await.unwrap();
}
