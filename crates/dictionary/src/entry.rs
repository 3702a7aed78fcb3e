use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub count: u64,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            count,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} (Access count: {})", self.key, self.value, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::Entry;

    #[test]
    fn display_matches_menu_rendering() {
        let entry = Entry::new("book", "книга", 7);
        assert_eq!(entry.to_string(), "book - книга (Access count: 7)");
    }
}
