/// Parser turning free-form input text into wall items
use crate::span::Span;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default cap on how many items a single range line may expand to
pub const DEFAULT_MAX_RANGE_LEN: u64 = 100_000;

/// Why a range line produced no items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeFault {
    /// The text before the `-` is not an integer
    InvalidStart,
    /// The text after the `-` is not an integer
    InvalidEnd,
    /// The range would expand to more items than allowed
    TooLarge { len: u64, max: u64 },
}

/// A line that looked like a range but could not be expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedRange {
    /// 1-based line number in the input
    pub line: usize,
    /// The trimmed line text
    pub text: String,
    /// Position of the trimmed line in the input
    pub span: Span,
    pub fault: RangeFault,
}

impl std::fmt::Display for MalformedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.fault {
            RangeFault::InvalidStart => write!(
                f,
                "Invalid range start in '{}' at line {}",
                self.text, self.line
            ),
            RangeFault::InvalidEnd => {
                write!(f, "Invalid range end in '{}' at line {}", self.text, self.line)
            }
            RangeFault::TooLarge { len, max } => write!(
                f,
                "Range '{}' at line {} expands to {} items (limit {})",
                self.text, self.line, len, max
            ),
        }
    }
}

/// Items produced from one input text, plus the range lines that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub malformed: Vec<MalformedRange>,
}

impl ParseReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Line-oriented item parser.
///
/// Each non-blank line is one item, except lines containing a `-`, which
/// are read as an inclusive `start-end` integer range. A range whose start
/// exceeds its end contributes nothing.
#[derive(Debug, Clone, Copy)]
pub struct ItemParser {
    max_range_len: u64,
}

impl Default for ItemParser {
    fn default() -> Self {
        ItemParser {
            max_range_len: DEFAULT_MAX_RANGE_LEN,
        }
    }
}

impl ItemParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many items one range line may produce
    pub fn with_max_range_len(mut self, max: u64) -> Self {
        self.max_range_len = max;
        self
    }

    pub fn parse(&self, text: &str) -> ParseReport {
        let mut report = ParseReport::default();
        let mut offset = 0;

        for (idx, raw) in text.split('\n').enumerate() {
            let raw_len = raw.chars().count();
            let line = raw.trim();

            if line.contains('-') {
                let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
                let start = offset + leading;
                let span = Span::new(start, start + line.chars().count());

                if let Err(fault) = self.expand_range(line, &mut report.items) {
                    let malformed = MalformedRange {
                        line: idx + 1,
                        text: line.to_string(),
                        span,
                        fault,
                    };
                    warn!(
                        line = malformed.line,
                        text = %malformed.text,
                        "skipping malformed range"
                    );
                    report.malformed.push(malformed);
                }
            } else if !line.is_empty() {
                report.items.push(line.to_string());
            }

            offset += raw_len + 1;
        }

        report
    }

    fn expand_range(&self, line: &str, items: &mut Vec<String>) -> Result<(), RangeFault> {
        // Only the first two fields count: "1-2-3" is the range 1..=2
        let mut fields = line.split('-');
        let start = parse_bound(fields.next()).ok_or(RangeFault::InvalidStart)?;
        let end = parse_bound(fields.next()).ok_or(RangeFault::InvalidEnd)?;

        if start > end {
            return Ok(());
        }

        let len = (end as i128 - start as i128 + 1) as u128;
        if len > self.max_range_len as u128 {
            return Err(RangeFault::TooLarge {
                len: u64::try_from(len).unwrap_or(u64::MAX),
                max: self.max_range_len,
            });
        }

        items.extend((start..=end).map(|n| n.to_string()));
        Ok(())
    }
}

/// Read one side of a range. A blank side counts as zero.
fn parse_bound(field: Option<&str>) -> Option<i64> {
    let field = field.unwrap_or("").trim();
    if field.is_empty() {
        return Some(0);
    }
    field.parse().ok()
}
