//! # Context Similarity
//!
//! Lexical bag-of-words similarity for locating code that resembles the text
//! around the cursor.
//!
//! ## Architecture
//!
//! ```text
//! target text ──> tokenize ──> WordBag (stemmed, stop words removed)
//!                                  │
//! candidate text ──> lines ──> WordBag per line
//!                                  │
//!                                  └──> WindowScan
//!                                        ├─> first window summed once
//!                                        ├─> slide: remove outgoing line, add incoming line
//!                                        └─> Jaccard score per position
//!                                               │
//!                                               └──> best_matches: skip rule, stable sort, top-K
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_similarity::best_matches;
//!
//! let candidate = "render the view\nparse every item\nparse the header";
//! let matches = best_matches("parse items", candidate, 1, 2).unwrap();
//! assert_eq!(matches[0].start_line, 1);
//! assert_eq!(matches[0].content, "parse every item");
//! ```

mod error;
mod matcher;
mod stop_words;
mod window;
mod word_bag;

pub use error::{Result, SimilarityError};
pub use matcher::{best_matches, Match, MatcherConfig};
pub use stop_words::is_stop_word;
pub use window::{jaccard, WindowScan, WindowScore};
pub use word_bag::{tokenize, WordBag};
