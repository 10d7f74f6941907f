/// Rendering collaborator interface: everything the wall tells its renderer
use serde::{Deserialize, Serialize};

/// A single instruction for whatever draws the wall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WallEvent {
    /// Draw every item as a tile in a grid with `columns` columns
    Rendered { items: Vec<String>, columns: usize },

    /// Remove every tile
    Cleared,

    /// Drop any selection or highlight marks before a new pick
    SelectionCleared,

    /// Mark the tile at `index` for animation step `step`
    Highlight { step: usize, index: usize },

    /// Undo the mark from the matching [`WallEvent::Highlight`]
    Unhighlight { step: usize, index: usize },

    /// The pick settled on `index`
    Selected { index: usize, item: String },
}

/// Receives wall events in the order they happen
pub trait WallRenderer {
    fn render(&mut self, event: &WallEvent);
}

impl<F> WallRenderer for F
where
    F: FnMut(&WallEvent),
{
    fn render(&mut self, event: &WallEvent) {
        self(event)
    }
}

/// Renderer that only records events, useful for tests and replays
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    pub events: Vec<WallEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of every highlight step, in order
    pub fn highlights(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                WallEvent::Highlight { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// The last selection recorded, if any
    pub fn selected(&self) -> Option<(usize, &str)> {
        self.events.iter().rev().find_map(|event| match event {
            WallEvent::Selected { index, item } => Some((*index, item.as_str())),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Send every recorded event to `renderer`, in order.
    ///
    /// Lets a shared picker record events while borrowed and hand them to a
    /// renderer that reads the picker back once the borrow is released.
    pub fn replay(&self, renderer: &mut dyn WallRenderer) {
        for event in &self.events {
            renderer.render(event);
        }
    }
}

impl WallRenderer for EventLog {
    fn render(&mut self, event: &WallEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = WallEvent::Highlight { step: 2, index: 5 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"highlight","step":2,"index":5}"#);

        let back: WallEvent = serde_json::from_str(r#"{"kind":"cleared"}"#).unwrap();
        assert_eq!(back, WallEvent::Cleared);
    }

    #[test]
    fn test_closure_renderer() {
        let mut count = 0;
        {
            let mut renderer = |_: &WallEvent| count += 1;
            renderer.render(&WallEvent::Cleared);
            renderer.render(&WallEvent::SelectionCleared);
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        log.render(&WallEvent::Highlight { step: 0, index: 1 });
        log.render(&WallEvent::Unhighlight { step: 0, index: 1 });
        log.render(&WallEvent::Selected {
            index: 0,
            item: "a".into(),
        });
        assert_eq!(log.highlights(), vec![1]);
        assert_eq!(log.selected(), Some((0, "a")));
    }

    #[test]
    fn test_replay_keeps_order() {
        let mut log = EventLog::new();
        log.render(&WallEvent::SelectionCleared);
        log.render(&WallEvent::Highlight { step: 0, index: 2 });

        let mut copy = EventLog::new();
        log.replay(&mut copy);
        assert_eq!(copy.events, log.events);
    }
}
