//! Keyword vocabulary and substring counting.

use std::collections::BTreeMap;

/// Technology keywords searched for in page content.
///
/// Order matters: queries are issued in declaration order. Duplicates are
/// tolerated; they collapse naturally since counts key by keyword string.
const TECHNOLOGY_KEYWORDS: &[&str] = &[
    "digital transformation",
    "digital innovation",
    "digital strategy",
    "big data",
    "industry 4.0",
    "artificial intelligence",
    "cloud",
    "Internet of Things",
    "quantum computing",
    "digital twins",
    "digitalization",
    "digital technology",
    "information technology",
    "incubator",
    "accelerator",
    "crowdsourcer",
    "venture capitalist",
    "data lakes",
    "cloud computing",
    "virtual reality",
    "augmented reality",
    "wearable",
    "digital twins",
    "blockchain",
    "quantum computing",
    "machine learning",
    "neural networks",
    "deep learning",
    "algorithms",
    "digital channels",
    "data analytics",
    "digital marketing",
    "simulation",
    "AI-driven drug discovery",
    "digital patient monitoring",
    "data ecosystem",
    "real-time tracking",
    "connected patient platforms",
    "business intelligence",
    "smart factory",
    "lab of the future",
    "machine intelligence",
    "automation",
    "robotics",
    "natural language processing",
    "analyze data",
    "decentralized trials",
    "real-world data",
    "virtual assistance",
    "remote monitoring",
];

/// The built-in keyword vocabulary, in query order.
pub fn default_vocabulary() -> Vec<String> {
    TECHNOLOGY_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Count keyword occurrences in a page's text.
///
/// Matching is literal, case-insensitive, non-overlapping substring
/// matching with no word boundaries: "cloud" matches inside "cloudy".
/// The text is expected pre-lowercased; keywords are lowercased here.
/// Every vocabulary entry is present in the result, zeroes included.
pub fn count_keywords(text: &str, vocabulary: &[String]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for keyword in vocabulary {
        let needle = keyword.to_lowercase();
        let occurrences = text.matches(needle.as_str()).count() as u64;
        counts.insert(keyword.clone(), occurrences);
    }
    counts
}
