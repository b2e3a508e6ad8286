//! Thread-local compilation cache for search patterns.
//!
//! The same `key:pattern` terms are typically parsed once per recipe and per
//! CLI invocation; caching the compiled regex avoids rebuilding automata for
//! each of them. Cache is capped at 256 entries; when full it is cleared.

use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    // Keyed by the anchored source, so `a` and `^(?:a)` never collide.
    static REGEX_CACHE: RefCell<HashMap<String, Regex>> =
        RefCell::new(HashMap::new());
}

/// Compile `pattern` anchored at the start of the haystack, or fetch it
/// from the cache.
pub fn get_or_compile_anchored(pattern: &str) -> Result<Regex, regex::Error> {
    let anchored = format!("^(?:{pattern})");

    REGEX_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();

        if let Some(re) = cache.get(&anchored) {
            return Ok(re.clone());
        }

        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }

        let compiled = Regex::new(&anchored)?;
        cache.insert(anchored, compiled.clone());
        Ok(compiled)
    })
}

/// Clear the pattern cache (mainly for testing).
pub fn clear_cache() {
    REGEX_CACHE.with(|cache| {
        cache.borrow_mut().clear();
    });
}

pub fn cache_size() -> usize {
    REGEX_CACHE.with(|cache| cache.borrow().len())
}
