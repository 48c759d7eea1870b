//! Text analysis: the keyword vocabulary and occurrence counting.

mod keywords;

pub use keywords::{count_keywords, default_vocabulary};
