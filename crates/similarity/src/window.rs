use crate::error::{Result, SimilarityError};
use crate::word_bag::{tokenize, WordBag};

/// Running aggregates for one window position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowScore {
    /// First line of the window (0-indexed)
    pub start_line: usize,
    /// One past the last line of the window
    pub end_line: usize,
    /// Σ of the window bag counts
    pub window_count: usize,
    /// Σ min(target[w], window[w])
    pub intersection_count: usize,
    /// Jaccard similarity in [0, 1]
    pub score: f32,
}

/// Incremental state carried through the slide loop
///
/// `intersection[w]` always equals `min(target[w], window[w])`; only the
/// words of the line entering or leaving the window are touched per step.
#[derive(Debug)]
struct WindowState {
    window: WordBag,
    intersection: WordBag,
    window_count: usize,
    intersection_count: usize,
}

impl WindowState {
    fn new(target: &WordBag, lines: &[WordBag]) -> Self {
        let mut window = WordBag::new();
        for bag in lines {
            window.merge(bag);
        }
        let window_count = window.total();

        let mut intersection = WordBag::new();
        for (word, target_count) in target {
            let shared = (*target_count).min(window.get(word));
            intersection.add(word.as_str(), shared);
        }
        let intersection_count = intersection.total();

        Self {
            window,
            intersection,
            window_count,
            intersection_count,
        }
    }

    fn remove_line(&mut self, target: &WordBag, line: &WordBag) -> Result<()> {
        for (word, count) in line {
            let current = self.window.get(word);
            if current < *count {
                return Err(SimilarityError::invariant(format!(
                    "window count for '{word}' would go negative ({current} - {count})"
                )));
            }
            let remaining = current - count;
            self.window.set(word, remaining);
            self.window_count -= count;

            let target_count = target.get(word);
            if target_count == 0 {
                continue;
            }
            let before = self.intersection.get(word);
            let after = target_count.min(remaining);
            self.intersection.set(word, after);
            self.intersection_count -= before - after;
        }
        Ok(())
    }

    fn add_line(&mut self, target: &WordBag, line: &WordBag) {
        for (word, count) in line {
            let updated = self.window.get(word) + count;
            self.window.set(word, updated);
            self.window_count += count;

            let target_count = target.get(word);
            if target_count == 0 {
                continue;
            }
            let before = self.intersection.get(word);
            let after = target_count.min(updated);
            self.intersection.set(word, after);
            self.intersection_count += after - before;
        }
    }
}

/// Jaccard similarity from multiset sizes; 0 when the union is empty
pub fn jaccard(target_count: usize, window_count: usize, intersection_count: usize) -> Result<f32> {
    let union = target_count as i64 + window_count as i64 - intersection_count as i64;
    if union < 0 {
        return Err(SimilarityError::invariant(format!(
            "negative union size (target={target_count}, window={window_count}, intersection={intersection_count})"
        )));
    }
    if union == 0 {
        return Ok(0.0);
    }
    Ok((intersection_count as f64 / union as f64) as f32)
}

/// Iterator over every window position of a candidate, scored against a target
///
/// Yields one [`WindowScore`] per start line, sliding one line at a time.
/// When the candidate is shorter than the window size a single window covering
/// the whole candidate is produced. After an error the scan is exhausted.
#[derive(Debug)]
pub struct WindowScan {
    target: WordBag,
    target_count: usize,
    line_bags: Vec<WordBag>,
    window_size: usize,
    state: WindowState,
    next_start: usize,
    done: bool,
}

impl WindowScan {
    /// Prepare a scan; tokenizes every candidate line once
    pub fn new(target: WordBag, lines: &[&str], window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(SimilarityError::invalid_argument(
                "window size must be greater than zero",
            ));
        }
        let line_bags: Vec<WordBag> = lines.iter().map(|line| tokenize(line)).collect();
        let window_size = window_size.min(line_bags.len());
        let state = WindowState::new(&target, &line_bags[..window_size]);
        let target_count = target.total();

        Ok(Self {
            target,
            target_count,
            done: line_bags.is_empty(),
            line_bags,
            window_size,
            state,
            next_start: 0,
        })
    }

    /// Effective window size (clamped to the candidate length)
    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Start line of the final window position
    #[must_use]
    pub fn last_start(&self) -> usize {
        self.line_bags.len().saturating_sub(self.window_size)
    }

    fn step(&mut self) -> Result<WindowScore> {
        let start = self.next_start;
        if start > 0 {
            self.state
                .remove_line(&self.target, &self.line_bags[start - 1])?;
            self.state
                .add_line(&self.target, &self.line_bags[start + self.window_size - 1]);
        }
        let score = jaccard(
            self.target_count,
            self.state.window_count,
            self.state.intersection_count,
        )?;
        Ok(WindowScore {
            start_line: start,
            end_line: start + self.window_size,
            window_count: self.state.window_count,
            intersection_count: self.state.intersection_count,
            score,
        })
    }
}

impl Iterator for WindowScan {
    type Item = Result<WindowScore>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next_start > self.last_start() {
            return None;
        }
        let result = self.step();
        match result {
            Ok(_) => self.next_start += 1,
            Err(_) => self.done = true,
        }
        Some(result)
    }
}
