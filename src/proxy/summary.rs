use std::collections::HashMap;

use crate::proxy::research::SearchResult;

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
    "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "may", "might", "can", "this", "that", "these", "those", "a", "an",
];

const MIN_WORD_LEN: usize = 4;
const FALLBACK_TOPICS: &str = "various technical topics";

pub fn no_results(query: &str) -> String {
    format!(
        "No results found for \"{}\". Please try a different search term.",
        query
    )
}

pub fn summarize(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return no_results(query);
    }

    let domains = distinct_domains(results, 3).join(", ");
    let topics = key_topics(results, 3);
    let topics = if topics.is_empty() {
        FALLBACK_TOPICS.to_string()
    } else {
        topics.join(", ")
    };

    format!(
        "Based on {} search results for \"{}\", I found comprehensive information from sources \
         including {}. The research covers key topics such as {}. These sources provide both \
         foundational knowledge and current developments in this area, offering multiple \
         perspectives and practical insights.",
        results.len(),
        query,
        domains,
        topics
    )
}

/// First `limit` domains in result order, duplicates skipped.
pub fn distinct_domains(results: &[SearchResult], limit: usize) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(limit);
    for r in results {
        if seen.len() == limit {
            break;
        }
        if !seen.contains(&r.domain.as_str()) {
            seen.push(&r.domain);
        }
    }
    seen
}

/// Most frequent content words across titles and snippets.
///
/// Words are lower-cased runs of ASCII letters, digits and `_` of at least
/// four characters, minus the stop words. Equal counts keep first-seen order.
pub fn key_topics(results: &[SearchResult], limit: usize) -> Vec<String> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for r in results {
        for text in [&r.title, &r.snippet] {
            let lowered = text.to_lowercase();
            for word in words(&lowered) {
                if STOP_WORDS.contains(&word) {
                    continue;
                }
                match index.get(word) {
                    Some(&i) => order[i].1 += 1,
                    None => {
                        index.insert(word.to_string(), order.len());
                        order.push((word.to_string(), 1));
                    }
                }
            }
        }
    }

    // stable: ties stay in first-seen order
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.into_iter().take(limit).map(|(w, _)| w).collect()
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| w.len() >= MIN_WORD_LEN)
}
