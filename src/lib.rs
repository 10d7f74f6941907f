/// Wall Picker - a random name picker wall
///
/// Free-form text becomes a wall of tiles, one per name or number; a pick
/// flashes random tiles before settling on a uniformly random winner, which
/// can then be removed and the pick repeated.
///
/// # Example
///
/// ```
/// # tokio_test::block_on(async {
/// use wall_picker::{EventLog, PickerConfig, VirtualTimer, WallPicker};
///
/// let mut picker = WallPicker::with_seed(PickerConfig::default(), 42);
/// let mut log = EventLog::new();
/// let timer = VirtualTimer::new();
///
/// picker.generate("alice\nbob\n1-3", &mut log).unwrap();
/// let selection = picker.pick(&mut log, &timer).await.unwrap();
/// println!("Selected: {}", selection.item);
/// # });
/// ```
pub mod animator;
pub mod config;
pub mod diagnostic;
pub mod event;
pub mod notice;
pub mod parser;
pub mod picker;
pub mod span;
pub mod storage;
pub mod timer;
pub mod wall;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Re-export main types for convenience
pub use animator::{Animator, PickError, Selection};
pub use config::PickerConfig;
pub use event::{EventLog, WallEvent, WallRenderer};
pub use notice::{Notice, NoticeId, Notifier, Tone};
pub use parser::{ItemParser, MalformedRange, ParseReport, RangeFault};
pub use picker::{Generated, PickerError, WallPicker};
pub use storage::{ExportFile, InMemoryStore, ListStore, StoreError};
pub use timer::{Timer, VirtualTimer};
pub use wall::{grid_columns, Removal, WallError, WallState};

#[cfg(feature = "tokio-runtime")]
pub use storage::FolderStore;
#[cfg(feature = "tokio-runtime")]
pub use timer::TokioTimer;

/// Parse input text into wall items
///
/// # Example
/// ```
/// use wall_picker::parse;
///
/// assert_eq!(parse("alice\nbob\n5-7"), vec!["alice", "bob", "5", "6", "7"]);
/// assert!(parse("3-1").is_empty());
/// ```
pub fn parse(text: &str) -> Vec<String> {
    ItemParser::new().parse(text).items
}

/// Parse input text, keeping the range lines that were skipped
pub fn parse_report(text: &str) -> ParseReport {
    ItemParser::new().parse(text)
}

/// Join items into export file content, one per line
///
/// # Example
/// ```
/// use wall_picker::export_text;
///
/// let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// assert_eq!(export_text(&items), "a\nb\nc");
/// ```
pub fn export_text(items: &[String]) -> String {
    storage::export_text(items)
}

/// Pick from `items` with a seed, skipping the animation delays
///
/// This is a convenience function for deterministic output.
///
/// # Example
/// ```
/// # tokio_test::block_on(async {
/// use wall_picker::pick_with_seed;
///
/// let items = vec!["x".to_string(), "y".to_string()];
/// let selection = pick_with_seed(&items, 42).await.unwrap();
/// assert!(selection.index < 2);
/// # });
/// ```
pub async fn pick_with_seed(items: &[String], seed: u64) -> Result<Selection, PickError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let timer = VirtualTimer::new();
    Animator::default()
        .pick(items, &mut rng, &mut |_: &WallEvent| {}, &timer)
        .await
}
