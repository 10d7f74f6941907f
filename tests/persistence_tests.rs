/// Tests for saving, loading, exporting and importing lists
use async_trait::async_trait;
use std::time::Duration;
use wall_picker::{
    EventLog, InMemoryStore, ListStore, PickerConfig, PickerError, StoreError, Timer, Tone,
    VirtualTimer, WallEvent, WallPicker,
};

fn picker() -> WallPicker {
    WallPicker::with_seed(PickerConfig::default(), 42)
}

/// Store whose writes always fail, like a browser with storage disabled
struct ReadOnlyStore;

#[async_trait(?Send)]
impl ListStore for ReadOnlyStore {
    async fn get(&self, _slot: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn set(&self, _slot: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let store = InMemoryStore::new();
    let timer = VirtualTimer::new();
    let text = "alice\nbob\n1-3";

    let mut first = picker();
    first.set_input(text);
    first.save(&store, &timer).await.unwrap();
    assert_eq!(
        first.notice(timer.now()).map(|n| (n.message.as_str(), n.tone)),
        Some(("List saved successfully!", Tone::Success))
    );

    let mut second = picker();
    let mut log = EventLog::new();
    let generated = second.load(&store, &mut log, &timer).await.unwrap();

    assert_eq!(second.input(), text);
    assert_eq!(generated.count, 5);
    assert_eq!(second.items(), wall_picker::parse(text).as_slice());
    assert!(matches!(log.events.as_slice(), [WallEvent::Rendered { .. }]));
    assert_eq!(
        second.notice(timer.now()).map(|n| n.message.as_str()),
        Some("List loaded successfully!")
    );
}

#[tokio::test]
async fn test_save_trims_input() {
    let store = InMemoryStore::new();
    let timer = VirtualTimer::new();
    let mut picker = picker();

    picker.set_input("\n  alice\nbob  \n\n");
    picker.save(&store, &timer).await.unwrap();
    assert_eq!(
        store.get("wallNamePickerList").await,
        Ok(Some("alice\nbob".to_string()))
    );
}

#[tokio::test]
async fn test_load_without_saved_list() {
    let store = InMemoryStore::new();
    let timer = VirtualTimer::new();
    let mut picker = picker();
    let mut log = EventLog::new();

    let result = picker.load(&store, &mut log, &timer).await;
    assert_eq!(result, Err(PickerError::NoSavedList));
    assert!(log.events.is_empty());
    assert_eq!(
        picker.notice(timer.now()).map(|n| (n.message.as_str(), n.tone)),
        Some(("No saved list found", Tone::Error))
    );
}

#[tokio::test]
async fn test_load_treats_blank_slot_as_missing() {
    let store = InMemoryStore::new();
    store.set("wallNamePickerList", "   ").await.unwrap();
    let timer = VirtualTimer::new();
    let mut picker = picker();

    let result = picker.load(&store, &mut EventLog::new(), &timer).await;
    assert_eq!(result, Err(PickerError::NoSavedList));
}

#[tokio::test]
async fn test_save_failure_is_reported() {
    let timer = VirtualTimer::new();
    let mut picker = picker();
    picker.set_input("alice");

    let result = picker.save(&ReadOnlyStore, &timer).await;
    assert!(matches!(result, Err(PickerError::SaveFailed(_))));
    assert_eq!(
        picker.notice(timer.now()).map(|n| (n.message.as_str(), n.tone)),
        Some(("Failed to save list", Tone::Error))
    );
}

#[tokio::test]
async fn test_notice_expires_and_is_replaced() {
    let store = InMemoryStore::new();
    let timer = VirtualTimer::new();
    let mut picker = picker();
    picker.set_input("alice");

    picker.save(&store, &timer).await.unwrap();
    let first = picker.notice(timer.now()).unwrap().id;

    timer.advance(Duration::from_millis(2000));
    picker.load(&store, &mut EventLog::new(), &timer).await.unwrap();

    // the expiry for the first notice must not hide the second
    timer.advance(Duration::from_millis(1500));
    assert!(!picker.dismiss_notice(first));
    assert_eq!(
        picker.notice(timer.now()).map(|n| n.message.as_str()),
        Some("List loaded successfully!")
    );

    timer.advance(Duration::from_millis(1500));
    assert!(picker.notice(timer.now()).is_none());
}

#[tokio::test]
async fn test_slot_name_comes_from_config() {
    let store = InMemoryStore::new();
    let timer = VirtualTimer::new();
    let config = PickerConfig {
        slot: "classroom".to_string(),
        ..PickerConfig::default()
    };
    let mut picker = WallPicker::with_seed(config, 1);
    picker.set_input("x");
    picker.save(&store, &timer).await.unwrap();

    assert!(store.contains("classroom"));
    assert!(!store.contains("wallNamePickerList"));
}

#[test]
fn test_export_current_items() {
    let mut picker = picker();
    picker.generate("a\nb\nc", &mut EventLog::new()).unwrap();

    let file = picker.export();
    assert_eq!(file.file_name, "wall_name_picker_list.csv");
    assert_eq!(file.contents, "a\nb\nc");
}

#[test]
fn test_import_then_generate() {
    let mut picker = picker();
    let mut log = EventLog::new();

    let generated = picker.import("x\ny", &mut log).unwrap();
    assert_eq!(generated.count, 2);
    assert_eq!(picker.input(), "x\ny");
    assert_eq!(picker.items(), ["x".to_string(), "y".to_string()]);
}

#[test]
fn test_export_import_round_trip() {
    let mut source = picker();
    source.generate("1-4\nzed", &mut EventLog::new()).unwrap();
    let file = source.export();

    let mut target = picker();
    target.import(&file.contents, &mut EventLog::new()).unwrap();
    assert_eq!(target.items(), source.items());
}

#[cfg(feature = "tokio-runtime")]
#[tokio::test]
async fn test_folder_store_backs_picker() {
    let dir = tempfile::tempdir().unwrap();
    let store = wall_picker::FolderStore::new(dir.path().to_path_buf());
    let timer = VirtualTimer::new();

    let mut picker = picker();
    picker.set_input("one\ntwo");
    picker.save(&store, &timer).await.unwrap();

    let mut reloaded = WallPicker::with_seed(PickerConfig::default(), 2);
    reloaded
        .load(&store, &mut EventLog::new(), &timer)
        .await
        .unwrap();
    assert_eq!(reloaded.input(), "one\ntwo");
    assert_eq!(reloaded.wall().current_count(), 2);
}
