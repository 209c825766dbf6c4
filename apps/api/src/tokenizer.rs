//! Word tokenizer support data, initialised once per process.
//!
//! `init` is called from `main` before the server starts; later calls (from
//! the pipeline, or tests) return the same instance without rebuilding it.

use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::info;

static TOKENIZER: OnceCell<WordTokenizer> = OnceCell::new();
static BUILDS: AtomicUsize = AtomicUsize::new(0);

/// Splits text into word tokens: letters/digits, with inner `'`, `.`, `+`, `#`
/// or `-` kept so "C++", "Node.js" and "don't" stay whole.
#[derive(Debug)]
pub struct WordTokenizer {
    word: Regex,
}

impl WordTokenizer {
    fn build() -> Self {
        Self {
            word: Regex::new(r"[\p{L}\p{N}]+(?:['.\-][\p{L}\p{N}]+)*[+#]*")
                .expect("word pattern is valid"),
        }
    }

    pub fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.word.find_iter(text).map(|m| m.as_str())
    }

    pub fn word_count(&self, text: &str) -> usize {
        self.tokens(text).count()
    }
}

/// Returns the process-wide tokenizer, building it on first use.
pub fn init() -> &'static WordTokenizer {
    TOKENIZER.get_or_init(|| {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        info!("Tokenizer support data initialised");
        WordTokenizer::build()
    })
}

/// How many times the support data has been built. Stays at 1.
#[cfg(test)]
pub fn build_count() -> usize {
    BUILDS.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let first = init() as *const WordTokenizer;
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| init() as *const WordTokenizer as usize))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), first as usize);
        }
        assert_eq!(build_count(), 1);
    }

    #[test]
    fn test_tokens_keep_tech_terms_whole() {
        let tokens: Vec<_> = init()
            .tokens("Built APIs in C++, C#, Node.js and Python 3.12; don't panic!")
            .collect();
        assert_eq!(
            tokens,
            vec!["Built", "APIs", "in", "C++", "C#", "Node.js", "and", "Python", "3.12", "don't", "panic"]
        );
    }

    #[test]
    fn test_word_count() {
        let tokenizer = init();
        assert_eq!(tokenizer.word_count(""), 0);
        assert_eq!(tokenizer.word_count("  \n\t "), 0);
        assert_eq!(tokenizer.word_count("AWS -> EC2, S3 & RDS"), 4);
    }
}
