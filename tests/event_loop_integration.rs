// Debounce timing and ordering of the event loop, under tokio's paused clock
// WHY: Paused time makes the delay boundaries exact instead of sleep-and-hope

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use overlong::{
    Command, DebounceConfig, EventLoop, EventSender, Highlighter, HostEvent, Settings,
};

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::{ten_word_settings, SharedHost, LONG_SENTENCE};

fn start(host: SharedHost) -> (JoinHandle<Highlighter<SharedHost>>, EventSender) {
    let (event_loop, tx) = EventLoop::new(Highlighter::new(host), DebounceConfig::default(), 16);
    (tokio::spawn(event_loop.run()), tx)
}

async fn ms(n: u64) {
    sleep(Duration::from_millis(n)).await;
}

#[tokio::test(start_paused = true)]
async fn test_initial_load_fires_after_one_second() {
    let host = SharedHost::new(LONG_SENTENCE, ten_word_settings());
    let (handle, tx) = start(host.clone());

    ms(900).await;
    assert_eq!(host.applied_count(), 0);

    ms(200).await;
    assert_eq!(host.applied_count(), 1);
    assert_eq!(host.last_applied().map(|set| set.len()), Some(1));

    tx.send(HostEvent::Shutdown).await.unwrap();
    let highlighter = handle.await.unwrap();
    assert_eq!(highlighter.stats().applied, 1);
}

#[tokio::test(start_paused = true)]
async fn test_edit_burst_coalesces_into_one_recompute() {
    let host = SharedHost::new("Short.", ten_word_settings());
    let (handle, tx) = start(host.clone());
    ms(1100).await;
    assert_eq!(host.applied_count(), 1);

    // five edits 100ms apart, each inside the previous one's 300ms window
    for _ in 0..5 {
        tx.send(HostEvent::DocumentChanged).await.unwrap();
        ms(100).await;
    }
    host.set_document(LONG_SENTENCE);

    // last edit landed 100ms ago, so nothing fires for another 200ms
    ms(150).await;
    assert_eq!(host.applied_count(), 1);

    ms(100).await;
    assert_eq!(host.applied_count(), 2);
    assert_eq!(host.last_applied().map(|set| set.len()), Some(1));

    drop(tx);
    let highlighter = handle.await.unwrap();
    assert_eq!(highlighter.stats().runs, 2);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_schedules_nothing() {
    let settings = Settings {
        enabled: false,
        ..ten_word_settings()
    };
    let host = SharedHost::new(LONG_SENTENCE, settings);
    let (handle, tx) = start(host.clone());

    ms(1500).await;
    tx.send(HostEvent::DocumentChanged).await.unwrap();
    tx.send(HostEvent::ThemeChanged).await.unwrap();
    tx.send(HostEvent::ActiveViewChanged).await.unwrap();
    ms(2000).await;

    assert_eq!(host.applied_count(), 0);
    tx.send(HostEvent::Shutdown).await.unwrap();
    assert_eq!(handle.await.unwrap().stats().runs, 0);
}

#[tokio::test(start_paused = true)]
async fn test_commands_run_without_delay() {
    let host = SharedHost::new(LONG_SENTENCE, ten_word_settings());
    let (handle, tx) = start(host.clone());

    tx.send(HostEvent::Command(Command::Highlight)).await.unwrap();
    ms(1).await;
    assert_eq!(host.applied_count(), 1);
    assert_eq!(host.last_applied().map(|set| set.len()), Some(1));

    tx.send(HostEvent::Command(Command::Clear)).await.unwrap();
    ms(1).await;
    assert_eq!(host.applied_count(), 2);
    assert_eq!(host.last_applied(), Some(Vec::new()));

    tx.send(HostEvent::Shutdown).await.unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_recompute_reads_snapshot_at_fire_time() {
    let host = SharedHost::new("Short.", ten_word_settings());
    let (handle, tx) = start(host.clone());
    ms(1100).await;
    assert_eq!(host.last_applied(), Some(Vec::new()));

    tx.send(HostEvent::DocumentChanged).await.unwrap();
    ms(100).await;
    // changed after scheduling and without a further notification
    host.set_document(LONG_SENTENCE);
    ms(300).await;

    assert_eq!(host.applied_count(), 2);
    assert_eq!(host.last_applied().map(|set| set.len()), Some(1));

    tx.send(HostEvent::Shutdown).await.unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_different_kinds_fire_independently() {
    let host = SharedHost::new(LONG_SENTENCE, ten_word_settings());
    let (handle, tx) = start(host.clone());
    ms(1100).await;
    assert_eq!(host.applied_count(), 1);

    tx.send(HostEvent::DocumentChanged).await.unwrap();
    tx.send(HostEvent::ThemeChanged).await.unwrap();

    ms(150).await;
    assert_eq!(host.applied_count(), 2);

    ms(200).await;
    assert_eq!(host.applied_count(), 3);

    tx.send(HostEvent::Shutdown).await.unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drops_pending_recomputes() {
    let host = SharedHost::new(LONG_SENTENCE, ten_word_settings());
    let (handle, tx) = start(host.clone());

    tx.send(HostEvent::DocumentChanged).await.unwrap();
    tx.send(HostEvent::Shutdown).await.unwrap();
    let highlighter = handle.await.unwrap();

    ms(2000).await;
    assert_eq!(host.applied_count(), 0);
    assert_eq!(highlighter.stats().runs, 0);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_persists_and_stops_scheduling() {
    let host = SharedHost::new(LONG_SENTENCE, ten_word_settings());
    let (handle, tx) = start(host.clone());
    ms(1100).await;

    tx.send(HostEvent::Command(Command::Toggle)).await.unwrap();
    ms(1).await;
    assert!(!host.settings.lock().unwrap().enabled);
    assert_eq!(host.last_applied(), Some(Vec::new()));
    assert_eq!(host.notices(), vec!["Highlighting disabled".to_string()]);

    let before = host.applied_count();
    tx.send(HostEvent::DocumentChanged).await.unwrap();
    ms(1000).await;
    assert_eq!(host.applied_count(), before);

    tx.send(HostEvent::Command(Command::Toggle)).await.unwrap();
    ms(1).await;
    assert!(host.settings.lock().unwrap().enabled);
    assert_eq!(host.last_applied().map(|set| set.len()), Some(1));
    assert_eq!(host.notices().last().map(String::as_str), Some("Highlighting enabled"));

    tx.send(HostEvent::Shutdown).await.unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_settings_change_applies_new_threshold() {
    let host = SharedHost::new(LONG_SENTENCE, ten_word_settings());
    let (handle, tx) = start(host.clone());
    ms(1100).await;
    assert_eq!(host.last_applied().map(|set| set.len()), Some(1));

    tx.send(HostEvent::SettingsChanged(Settings {
        max_words: 50,
        ..Default::default()
    }))
    .await
    .unwrap();
    ms(1).await;
    assert_eq!(host.last_applied(), Some(Vec::new()));
    assert_eq!(host.settings.lock().unwrap().max_words, 50);

    // rejected: previous settings stay and the user is told why
    tx.send(HostEvent::SettingsChanged(Settings {
        max_words: 0,
        ..Default::default()
    }))
    .await
    .unwrap();
    ms(1).await;
    assert_eq!(host.settings.lock().unwrap().max_words, 50);
    assert!(host.notices().iter().any(|n| n.starts_with("invalid settings")));

    tx.send(HostEvent::Shutdown).await.unwrap();
    handle.await.unwrap();
}
