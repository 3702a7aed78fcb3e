mod entry;
mod error;
mod ranking;
mod tree;

pub mod persist;

pub use entry::Entry;
pub use error::DictionaryError;
pub use persist::{LoadOutcome, MalformedRecord};
pub use ranking::Popularity;
pub use tree::{Iter, WordTree};

/// Words every fresh dictionary starts from when no file is available.
pub const SAMPLE_WORDS: [(&str, &str, u64); 7] = [
    ("hello", "привіт", 5),
    ("world", "світ", 3),
    ("book", "книга", 7),
    ("computer", "комп'ютер", 10),
    ("university", "університет", 2),
    ("student", "студент", 8),
    ("professor", "професор", 1),
];

pub fn sample_tree() -> WordTree {
    let mut tree = WordTree::new();
    for (key, value, count) in SAMPLE_WORDS {
        tree.insert_with_count(key, value, count);
    }
    tree
}
