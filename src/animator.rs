/// Selection animator: a run of random highlights that settles on one winner
use crate::event::{WallEvent, WallRenderer};
use crate::timer::Timer;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Number of intermediate highlights before the final pick
pub const HIGHLIGHT_STEPS: usize = 10;

/// How long each intermediate highlight stays visible
pub const STEP_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickError {
    /// There is nothing to pick from
    NoItems,
}

impl std::fmt::Display for PickError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickError::NoItems => write!(f, "No items to pick from"),
        }
    }
}

impl std::error::Error for PickError {}

/// The item a pick settled on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub index: usize,
    pub item: String,
}

/// Runs the pick animation.
///
/// Each step draws a uniform index (with replacement), highlights it, waits
/// one step delay and unhighlights it. Steps never overlap. The winner is an
/// independent uniform draw made after the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animator {
    steps: usize,
    step_delay: Duration,
}

impl Default for Animator {
    fn default() -> Self {
        Animator {
            steps: HIGHLIGHT_STEPS,
            step_delay: STEP_DELAY,
        }
    }
}

impl Animator {
    pub fn new(steps: usize, step_delay: Duration) -> Self {
        Animator { steps, step_delay }
    }

    pub async fn pick<R: Rng>(
        &self,
        items: &[String],
        rng: &mut R,
        renderer: &mut dyn WallRenderer,
        timer: &dyn Timer,
    ) -> Result<Selection, PickError> {
        if items.is_empty() {
            return Err(PickError::NoItems);
        }

        for step in 0..self.steps {
            let index = rng.gen_range(0..items.len());
            renderer.render(&WallEvent::Highlight { step, index });
            timer.sleep(self.step_delay).await;
            renderer.render(&WallEvent::Unhighlight { step, index });
        }

        let index = rng.gen_range(0..items.len());
        let item = items[index].clone();
        debug!(index, item = %item, "pick settled");
        renderer.render(&WallEvent::Selected {
            index,
            item: item.clone(),
        });

        Ok(Selection { index, item })
    }
}
