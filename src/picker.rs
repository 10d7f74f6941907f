/// The wall picker: the command interface tying parser, wall, animator,
/// storage and notices together
use crate::animator::{Animator, PickError, Selection};
use crate::config::PickerConfig;
use crate::event::{WallEvent, WallRenderer};
use crate::notice::{Notice, NoticeId, Notifier, Tone};
use crate::parser::{ItemParser, MalformedRange};
use crate::storage::{export_text, import_text, ExportFile, ListStore, StoreError};
use crate::timer::Timer;
use crate::wall::{Removal, WallError, WallState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Combined error type for picker commands
///
/// None of these are fatal: each one has a user-facing [`PickerError::message`]
/// that the picker also surfaces through its status line or a notice.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerError {
    EmptyInput,
    Wall(WallError),
    NothingToSave,
    SaveFailed(StoreError),
    NoSavedList,
    LoadFailed(StoreError),
}

impl PickerError {
    /// Text to show the user
    pub fn message(&self) -> String {
        match self {
            PickerError::EmptyInput => "Please enter names or numbers".to_string(),
            PickerError::Wall(WallError::NoItems) => "Generate a wall first".to_string(),
            PickerError::Wall(e) => e.to_string(),
            PickerError::NothingToSave => "No list to save".to_string(),
            PickerError::SaveFailed(_) => "Failed to save list".to_string(),
            PickerError::NoSavedList => "No saved list found".to_string(),
            PickerError::LoadFailed(_) => "Failed to load list".to_string(),
        }
    }
}

impl std::fmt::Display for PickerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickerError::SaveFailed(e) | PickerError::LoadFailed(e) => {
                write!(f, "{}: {}", self.message(), e)
            }
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for PickerError {}

impl From<WallError> for PickerError {
    fn from(e: WallError) -> Self {
        PickerError::Wall(e)
    }
}

impl From<PickError> for PickerError {
    fn from(e: PickError) -> Self {
        match e {
            PickError::NoItems => PickerError::Wall(WallError::NoItems),
        }
    }
}

/// Summary of a freshly generated wall
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub count: usize,
    pub columns: usize,
    /// Range lines that produced no items
    pub malformed: Vec<MalformedRange>,
}

/// A name picker wall.
///
/// Owns the raw input text, the wall built from it, the persistent status
/// line and the transient notice. Collaborators (renderer, timer, store) are
/// passed to each command.
pub struct WallPicker<R: Rng = StdRng> {
    config: PickerConfig,
    parser: ItemParser,
    animator: Animator,
    input: String,
    wall: WallState,
    status: Option<String>,
    notices: Notifier,
    rng: R,
}

impl WallPicker<StdRng> {
    /// Create a picker seeded from system entropy
    pub fn new(config: PickerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a picker with deterministic picks
    pub fn with_seed(config: PickerConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> WallPicker<R> {
    pub fn with_rng(config: PickerConfig, rng: R) -> Self {
        WallPicker {
            parser: config.parser(),
            animator: config.animator(),
            notices: Notifier::new(config.notice_ttl()),
            config,
            input: String::new(),
            wall: WallState::new(),
            status: None,
            rng,
        }
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn animator(&self) -> Animator {
        self.animator
    }

    pub fn wall(&self) -> &WallState {
        &self.wall
    }

    pub fn items(&self) -> &[String] {
        self.wall.items()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the raw input text without rebuilding the wall
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The persistent result line (`Selected: …`, soft errors)
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The notice visible at `now`, if any
    pub fn notice(&mut self, now: Duration) -> Option<&Notice> {
        self.notices.visible(now)
    }

    /// Hide notice `id` unless a newer one has replaced it
    pub fn dismiss_notice(&mut self, id: NoticeId) -> bool {
        self.notices.dismiss(id)
    }

    fn notify(&mut self, message: impl Into<String>, tone: Tone, timer: &dyn Timer) -> NoticeId {
        self.notices.show(message, tone, timer.now())
    }

    /// Set the input to `text` and rebuild the wall from it
    pub fn generate(
        &mut self,
        text: &str,
        renderer: &mut dyn WallRenderer,
    ) -> Result<Generated, PickerError> {
        if self.wall.is_picking() {
            return Err(WallError::PickInProgress.into());
        }
        self.input = text.to_string();
        self.regenerate(renderer)
    }

    /// Rebuild the wall from the current input
    pub fn regenerate(
        &mut self,
        renderer: &mut dyn WallRenderer,
    ) -> Result<Generated, PickerError> {
        let generated = self.rebuild(renderer)?;
        if generated.count == 0 {
            return Err(PickerError::EmptyInput);
        }
        Ok(generated)
    }

    /// Rebuild the wall; an input with no items clears it and yields a count of 0
    fn rebuild(&mut self, renderer: &mut dyn WallRenderer) -> Result<Generated, PickerError> {
        let report = self.parser.parse(&self.input);
        let malformed = report.malformed;

        match self.wall.reset(report.items) {
            Ok(count) => {
                self.status = None;
                let columns = self.wall.columns();
                info!(count, columns, "generated wall");
                renderer.render(&WallEvent::Rendered {
                    items: self.wall.items().to_vec(),
                    columns,
                });
                Ok(Generated {
                    count,
                    columns,
                    malformed,
                })
            }
            Err(WallError::NoItems) => {
                self.status = Some(PickerError::EmptyInput.message());
                renderer.render(&WallEvent::Cleared);
                Ok(Generated {
                    count: 0,
                    columns: 0,
                    malformed,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Start a pick: checks there is something to pick from, takes the pick
    /// guard and clears the previous selection.
    ///
    /// Every successful call must be followed by [`WallPicker::finish_pick`].
    pub fn begin_pick(&mut self, renderer: &mut dyn WallRenderer) -> Result<usize, PickerError> {
        match self.wall.begin_pick() {
            Ok(count) => {
                debug!(count, "pick started");
                renderer.render(&WallEvent::SelectionCleared);
                Ok(count)
            }
            Err(e) => {
                let error = PickerError::from(e);
                if error == PickerError::Wall(WallError::NoItems) {
                    self.status = Some(error.message());
                }
                Err(error)
            }
        }
    }

    /// Record the outcome of an animation started by [`WallPicker::begin_pick`]
    pub fn finish_pick(
        &mut self,
        outcome: Result<Selection, PickError>,
    ) -> Result<Selection, PickerError> {
        let selection = match outcome {
            Ok(selection) => selection,
            Err(e) => {
                self.wall.abandon_pick();
                return Err(e.into());
            }
        };

        let item = self.wall.finish_pick(selection.index)?;
        info!(index = selection.index, item, "picked");
        self.status = Some(format!("Selected: {}", item));
        Ok(selection)
    }

    /// Run the full pick animation and select its result
    pub async fn pick(
        &mut self,
        renderer: &mut dyn WallRenderer,
        timer: &dyn Timer,
    ) -> Result<Selection, PickerError> {
        self.begin_pick(renderer)?;
        let outcome = {
            let mut lease = PickLease {
                wall: &mut self.wall,
                finished: false,
            };
            let outcome = self
                .animator
                .pick(lease.wall.items(), &mut self.rng, renderer, timer)
                .await;
            lease.finished = true;
            outcome
        };
        self.finish_pick(outcome)
    }

    /// Remove the selected item and redraw the wall
    pub fn remove_selected(
        &mut self,
        renderer: &mut dyn WallRenderer,
    ) -> Result<Removal, PickerError> {
        let removal = self.wall.remove_selected()?;

        if removal.emptied() {
            info!(item = %removal.item, "removed last item");
            self.status = Some("No more items left!".to_string());
            renderer.render(&WallEvent::Cleared);
        } else {
            self.status = None;
            renderer.render(&WallEvent::Rendered {
                items: self.wall.items().to_vec(),
                columns: self.wall.columns(),
            });
        }
        Ok(removal)
    }

    /// Save the trimmed input to the configured slot
    pub async fn save(
        &mut self,
        store: &dyn ListStore,
        timer: &dyn Timer,
    ) -> Result<(), PickerError> {
        let text = self.input.trim().to_string();
        let result = if text.is_empty() {
            Err(PickerError::NothingToSave)
        } else {
            store
                .set(&self.config.slot, &text)
                .await
                .map_err(PickerError::SaveFailed)
        };

        match &result {
            Ok(()) => {
                info!(slot = %self.config.slot, "saved list");
                self.notify("List saved successfully!", Tone::Success, timer);
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.notify(e.message(), Tone::Error, timer);
            }
        }
        result
    }

    /// Load the saved input, if any, and rebuild the wall from it
    pub async fn load(
        &mut self,
        store: &dyn ListStore,
        renderer: &mut dyn WallRenderer,
        timer: &dyn Timer,
    ) -> Result<Generated, PickerError> {
        if self.wall.is_picking() {
            return Err(WallError::PickInProgress.into());
        }
        let saved = store.get(&self.config.slot).await;
        let result = match saved {
            // A saved list that yields no items still loads; the status line
            // then asks for input
            Ok(Some(text)) if !text.trim().is_empty() => {
                self.input = text;
                self.rebuild(renderer)
            }
            Ok(_) => Err(PickerError::NoSavedList),
            Err(e) => Err(PickerError::LoadFailed(e)),
        };

        match &result {
            Ok(generated) => {
                info!(count = generated.count, "loaded saved list");
                self.notify("List loaded successfully!", Tone::Success, timer);
            }
            Err(e) => {
                debug!(error = %e, "load failed");
                self.notify(e.message(), Tone::Error, timer);
            }
        }
        result
    }

    /// The current items as a downloadable file
    pub fn export(&self) -> ExportFile {
        ExportFile {
            file_name: self.config.export_file_name.clone(),
            contents: export_text(self.wall.items()),
        }
    }

    /// Use an uploaded file's text as the input and rebuild the wall
    pub fn import(
        &mut self,
        file_text: &str,
        renderer: &mut dyn WallRenderer,
    ) -> Result<Generated, PickerError> {
        self.generate(import_text(file_text), renderer)
    }
}

/// Releases the pick guard if a pick future is dropped before the animation ends
struct PickLease<'a> {
    wall: &'a mut WallState,
    finished: bool,
}

impl Drop for PickLease<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!("pick cancelled");
            self.wall.abandon_pick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;
    use crate::storage::InMemoryStore;
    use crate::timer::VirtualTimer;

    fn picker() -> WallPicker {
        WallPicker::with_seed(PickerConfig::default(), 7)
    }

    #[test]
    fn test_generate_renders_grid() {
        let mut picker = picker();
        let mut log = EventLog::new();

        let generated = picker.generate("alice\nbob\n5-7", &mut log).unwrap();
        assert_eq!(generated.count, 5);
        assert_eq!(generated.columns, 3);
        assert_eq!(
            log.events,
            vec![WallEvent::Rendered {
                items: vec!["alice", "bob", "5", "6", "7"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                columns: 3,
            }]
        );
        assert_eq!(picker.status(), None);
    }

    #[test]
    fn test_generate_blank_sets_status() {
        let mut picker = picker();
        let mut log = EventLog::new();

        assert_eq!(
            picker.generate("  \n ", &mut log),
            Err(PickerError::EmptyInput)
        );
        assert_eq!(picker.status(), Some("Please enter names or numbers"));
        assert_eq!(log.events, vec![WallEvent::Cleared]);
    }

    #[tokio::test]
    async fn test_pick_without_wall() {
        let mut picker = picker();
        let timer = VirtualTimer::new();
        let mut log = EventLog::new();

        let result = picker.pick(&mut log, &timer).await;
        assert_eq!(result, Err(PickerError::Wall(WallError::NoItems)));
        assert_eq!(picker.status(), Some("Generate a wall first"));
        assert!(log.events.is_empty());
        assert!(timer.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_failed_animation_releases_guard() {
        let mut picker = picker();
        picker.generate("a\nb", &mut EventLog::new()).unwrap();
        picker.begin_pick(&mut EventLog::new()).unwrap();

        assert!(picker.finish_pick(Err(PickError::NoItems)).is_err());
        assert!(!picker.wall().is_picking());
        assert_eq!(picker.wall().selected(), None);
    }

    #[tokio::test]
    async fn test_save_blank_input() {
        let mut picker = picker();
        let store = InMemoryStore::new();
        let timer = VirtualTimer::new();

        picker.set_input("   ");
        assert_eq!(
            picker.save(&store, &timer).await,
            Err(PickerError::NothingToSave)
        );
        assert_eq!(
            picker.notice(timer.now()).map(|n| n.message.as_str()),
            Some("No list to save")
        );
        assert!(!store.contains(&picker.config().slot));
    }

    #[tokio::test]
    async fn test_load_list_without_items() {
        let mut picker = picker();
        let store = InMemoryStore::new();
        let timer = VirtualTimer::new();
        let mut log = EventLog::new();
        store.set(&picker.config().slot, "3-1").await.unwrap();

        let generated = picker.load(&store, &mut log, &timer).await.unwrap();
        assert_eq!(generated.count, 0);
        assert_eq!(picker.input(), "3-1");
        assert_eq!(picker.status(), Some("Please enter names or numbers"));
        assert_eq!(log.events, vec![WallEvent::Cleared]);

        let notice = picker.notice(timer.now()).unwrap();
        assert_eq!(notice.message, "List loaded successfully!");
        assert_eq!(notice.tone, Tone::Success);
    }

    /// Timer whose sleeps never finish
    struct StalledTimer;

    #[async_trait::async_trait(?Send)]
    impl Timer for StalledTimer {
        async fn sleep(&self, _duration: Duration) {
            std::future::pending::<()>().await
        }

        fn now(&self) -> Duration {
            Duration::ZERO
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_pick_releases_guard() {
        let mut picker = picker();
        let mut log = EventLog::new();
        picker.generate("a\nb\nc", &mut log).unwrap();

        let cancelled = tokio::time::timeout(
            Duration::from_millis(250),
            picker.pick(&mut log, &StalledTimer),
        )
        .await;
        assert!(cancelled.is_err());
        assert!(!picker.wall().is_picking());
        assert_eq!(picker.wall().selected(), None);

        assert_eq!(picker.generate("x\ny", &mut log).map(|g| g.count), Ok(2));
        let selection = picker.pick(&mut log, &VirtualTimer::new()).await.unwrap();
        assert!(selection.index < 2);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PickerError::SaveFailed(StoreError::Unavailable("quota".into())).to_string(),
            "Failed to save list: Storage unavailable: quota"
        );
        assert_eq!(PickerError::NoSavedList.to_string(), "No saved list found");
        assert_eq!(
            PickerError::from(PickError::NoItems).message(),
            "Generate a wall first"
        );
    }
}
