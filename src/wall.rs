/// Wall state: the ordered item list and the current selection
use serde::Serialize;
use tracing::debug;

/// Error types for wall mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WallError {
    NoItems,
    PickInProgress,
    NothingSelected,
    NotSelected { index: usize, selected: usize },
    IndexOutOfRange { index: usize, len: usize },
}

impl std::fmt::Display for WallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WallError::NoItems => write!(f, "The wall has no items"),
            WallError::PickInProgress => write!(f, "A pick is already in progress"),
            WallError::NothingSelected => write!(f, "No item is selected"),
            WallError::NotSelected { index, selected } => write!(
                f,
                "Item {} is not the selected item (selected: {})",
                index, selected
            ),
            WallError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} is out of range for {} items", index, len)
            }
        }
    }
}

impl std::error::Error for WallError {}

/// Number of grid columns for `count` tiles: `ceil(sqrt(count))`
pub fn grid_columns(count: usize) -> usize {
    let mut columns = (count as f64).sqrt() as usize;
    // Float rounding can land one off in either direction
    while columns * columns < count {
        columns += 1;
    }
    while columns > 0 && (columns - 1) * (columns - 1) >= count {
        columns -= 1;
    }
    columns
}

/// What a successful removal left behind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Removal {
    pub item: String,
    pub remaining: usize,
}

impl Removal {
    /// The wall has no items left and shows its empty state until the next reset
    pub fn emptied(&self) -> bool {
        self.remaining == 0
    }
}

/// The list of items on the wall and which one, if any, is selected.
///
/// `selected` is only ever set between a finished pick and the next
/// mutation of `items`.
#[derive(Debug, Clone, Default)]
pub struct WallState {
    items: Vec<String>,
    selected: Option<usize>,
    picking: bool,
}

impl WallState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every item. An empty list still clears the wall but is reported
    /// as [`WallError::NoItems`].
    pub fn reset(&mut self, items: Vec<String>) -> Result<usize, WallError> {
        if self.picking {
            return Err(WallError::PickInProgress);
        }
        self.selected = None;
        self.items = items;
        debug!(count = self.items.len(), "wall reset");

        if self.items.is_empty() {
            Err(WallError::NoItems)
        } else {
            Ok(self.items.len())
        }
    }

    /// Remove the selected item. `index` must be the current selection.
    pub fn remove_at(&mut self, index: usize) -> Result<Removal, WallError> {
        if self.picking {
            return Err(WallError::PickInProgress);
        }
        match self.selected {
            None => Err(WallError::NothingSelected),
            Some(selected) if selected != index => Err(WallError::NotSelected { index, selected }),
            Some(_) => {
                self.selected = None;
                let item = self.items.remove(index);
                debug!(index, remaining = self.items.len(), "removed item");
                Ok(Removal {
                    item,
                    remaining: self.items.len(),
                })
            }
        }
    }

    /// Remove whichever item is currently selected
    pub fn remove_selected(&mut self) -> Result<Removal, WallError> {
        let index = self.selected.ok_or(WallError::NothingSelected)?;
        self.remove_at(index)
    }

    /// Mark a pick as running and drop the previous selection.
    ///
    /// Returns the number of items the pick may choose from.
    pub fn begin_pick(&mut self) -> Result<usize, WallError> {
        if self.picking {
            return Err(WallError::PickInProgress);
        }
        if self.items.is_empty() {
            return Err(WallError::NoItems);
        }
        self.selected = None;
        self.picking = true;
        Ok(self.items.len())
    }

    /// Record the final pick and release the pick guard
    pub fn finish_pick(&mut self, index: usize) -> Result<&str, WallError> {
        self.picking = false;
        if index >= self.items.len() {
            return Err(WallError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.selected = Some(index);
        Ok(&self.items[index])
    }

    /// Release the pick guard without selecting anything
    pub fn abandon_pick(&mut self) {
        self.picking = false;
    }

    pub fn current_count(&self) -> usize {
        self.items.len()
    }

    pub fn columns(&self) -> usize {
        grid_columns(self.items.len())
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.selected.map(|index| self.items[index].as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_picking(&self) -> bool {
        self.picking
    }
}
