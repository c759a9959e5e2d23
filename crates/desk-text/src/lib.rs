//! OpenDesk Text - normalization and keyword extraction
//!
//! Shared text pipeline for the classifiers and the similarity engine:
//!
//! - `Normalizer`: lowercase → accent fold → cleanup → stopwords → stem
//! - `KeywordScanner`: pre-compiled multi-keyword literal matching
//! - `KeywordMatcher`: term frequency, top-N keywords, TF-IDF

pub mod keywords;
pub mod normalizer;

pub use keywords::{KeywordMatcher, KeywordScanner};
pub use normalizer::Normalizer;
