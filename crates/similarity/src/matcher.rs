use crate::error::{Result, SimilarityError};
use crate::window::WindowScan;
use crate::word_bag::tokenize;
use serde::Serialize;
use std::cmp::Ordering;

const DEFAULT_WINDOW_SIZE: usize = 20;
const DEFAULT_MAX_MATCHES: usize = 50;

/// A scored region of the candidate text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// Jaccard similarity in [0, 1]
    pub score: f32,
    /// First line (0-indexed)
    pub start_line: usize,
    /// One past the last line
    pub end_line: usize,
    /// Lines `start_line..end_line` joined with `\n`
    pub content: String,
}

impl Match {
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// Window and result-size settings for the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherConfig {
    /// Lines per window
    pub window_size: usize,
    /// Maximum matches returned
    pub max_matches: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(SimilarityError::invalid_argument(
                "window_size must be > 0",
            ));
        }
        Ok(())
    }

    /// Run [`best_matches`] with this configuration
    pub fn best_matches(&self, target: &str, candidate: &str) -> Result<Vec<Match>> {
        best_matches(target, candidate, self.window_size, self.max_matches)
    }
}

/// Find the regions of `candidate` most lexically similar to `target`
///
/// Slides a `window_size`-line window over the candidate, scoring each
/// position by Jaccard similarity of stemmed word bags. Positions whose first
/// line is blank are not reported unless they are the first or the last
/// position. Results are ordered by descending score; ties keep line order.
pub fn best_matches(
    target: &str,
    candidate: &str,
    window_size: usize,
    max_matches: usize,
) -> Result<Vec<Match>> {
    if window_size == 0 {
        return Err(SimilarityError::invalid_argument(
            "window size must be greater than zero",
        ));
    }
    if candidate.is_empty() {
        return Ok(Vec::new());
    }

    let lines: Vec<&str> = candidate.split('\n').collect();
    let scan = WindowScan::new(tokenize(target), &lines, window_size)?;
    let last_start = scan.last_start();

    let mut matches = Vec::new();
    for position in scan {
        let position = position?;
        let start = position.start_line;
        if start != 0 && start != last_start && lines[start].trim().is_empty() {
            continue;
        }
        matches.push(Match {
            score: position.score,
            start_line: start,
            end_line: position.end_line,
            content: lines[start..position.end_line].join("\n"),
        });
    }

    // `sort_by` is stable: equal scores keep ascending line order.
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    matches.truncate(max_matches);

    log::debug!(
        "best_matches: {} lines, window={}, kept {} matches",
        lines.len(),
        window_size,
        matches.len()
    );
    Ok(matches)
}
