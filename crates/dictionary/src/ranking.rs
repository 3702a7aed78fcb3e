use crate::entry::Entry;
use crate::tree::WordTree;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Popularity {
    Most,
    Least,
}

impl WordTree {
    /// Up to `n` entries ordered by access count.
    ///
    /// The snapshot is taken in key order and sorted stably, so equal counts
    /// stay in ascending key order. Entries are re-resolved with `get`, which
    /// leaves their counts untouched.
    pub fn top_by_count(&self, n: usize, popularity: Popularity) -> Vec<&Entry> {
        let mut snapshot: Vec<(&str, u64)> = self
            .iter()
            .map(|entry| (entry.key.as_str(), entry.count))
            .collect();
        match popularity {
            Popularity::Most => snapshot.sort_by(|a, b| b.1.cmp(&a.1)),
            Popularity::Least => snapshot.sort_by_key(|&(_, count)| count),
        }
        snapshot.truncate(n);
        snapshot
            .into_iter()
            .filter_map(|(key, _)| self.get(key))
            .collect()
    }
}
