//! Text analysis for Juris.
//!
//! An [`Analyzer`] turns text into the token sequence the lexical index is
//! built from. The same analyzer instance is used at build time and at query
//! time; it is stored in the index snapshot so the two can never drift apart.
//!
//! # Examples
//!
//! ```
//! use juris::analysis::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new();
//! let tokens = analyzer.analyze("What are the elements of Theft?").unwrap();
//! assert_eq!(tokens, vec!["elements", "theft"]);
//! ```

#[cfg(feature = "lang-ko")]
pub mod korean;
pub mod standard;

use std::fmt::Debug;

use crate::error::Result;

pub use self::standard::StandardAnalyzer;

#[cfg(feature = "lang-ko")]
pub use self::korean::KoreanAnalyzer;

/// Converts text into index terms.
pub trait Analyzer: Send + Sync + Debug {
    /// Analyze `text` into an ordered list of terms. Duplicates are kept.
    fn analyze(&self, text: &str) -> Result<Vec<String>>;

    /// Short identifier used in logs and snapshot stats.
    fn name(&self) -> &'static str;
}
