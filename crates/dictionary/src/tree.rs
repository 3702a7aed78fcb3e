use std::cmp::Ordering;
use std::fmt;
use std::mem;

use log::debug;

use crate::entry::Entry;

/// Unbalanced binary search tree keyed by word.
///
/// - Keys are unique; every key in a left subtree is smaller than its parent,
///   every key in a right subtree is larger.
/// - No rebalancing ever happens, so sorted insertion degrades the tree into a
///   list. All descents are iterative to keep that case safe.
/// - The size is not cached; `len` walks the whole tree.
pub struct WordTree {
    root: Link,
}

type Link = Option<Box<Node>>;

struct Node {
    entry: Entry,
    left: Link,
    right: Link,
}

impl Node {
    fn new(entry: Entry) -> Self {
        Self {
            entry,
            left: None,
            right: None,
        }
    }
}

impl WordTree {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<&Node> = self.root.as_deref().into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .into_iter()
                .flat_map(|node| [node.left.as_deref(), node.right.as_deref()])
                .flatten()
                .collect();
        }
        height
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root.as_deref())
    }

    /// Looks a word up without touching its access count.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match key.cmp(node.entry.key.as_str()) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => return Some(&node.entry),
            }
        }
        None
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Looks a word up and bumps its access count by one.
    pub fn touch(&mut self, key: &str) -> Option<&Entry> {
        let node = Self::slot_of(&mut self.root, key).as_deref_mut()?;
        node.entry.count = node.entry.count.saturating_add(1);
        Some(&node.entry)
    }

    /// Inserts a word with a zero access count.
    ///
    /// Re-adding an existing word therefore resets its popularity.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<Entry> {
        self.insert_with_count(key, value, 0)
    }

    /// Inserts a new leaf, or overwrites value and count of an existing key in place.
    /// Returns the replaced entry.
    pub fn insert_with_count(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        count: u64,
    ) -> Option<Entry> {
        let key = key.into();
        let value = value.into();
        let slot = Self::slot_of(&mut self.root, &key);
        if let Some(node) = slot {
            let value = mem::replace(&mut node.entry.value, value);
            let count = mem::replace(&mut node.entry.count, count);
            return Some(Entry { key, value, count });
        }
        debug!("new word '{key}'");
        *slot = Some(Box::new(Node::new(Entry { key, value, count })));
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        let slot = Self::slot_of(&mut self.root, key);
        let mut node = slot.take()?;
        if node.left.is_some() {
            // Two children: the successor's entry moves up, its node is unlinked.
            if let Some(successor) = Self::take_min(&mut node.right) {
                let removed = mem::replace(&mut node.entry, successor.entry);
                *slot = Some(node);
                debug!("removed '{}' via successor splice", removed.key);
                return Some(removed);
            }
        }
        *slot = node.left.take().or_else(|| node.right.take());
        debug!("removed '{}'", node.entry.key);
        Some(node.entry)
    }

    /// Releases every node, children before their parent.
    pub fn clear(&mut self) {
        let mut pending: Vec<Box<Node>> = self.root.take().into_iter().collect();
        let mut released = 0_usize;
        while let Some(mut node) = pending.pop() {
            match (node.left.take(), node.right.take()) {
                (None, None) => released += 1,
                (left, right) => {
                    pending.push(node);
                    pending.extend(left);
                    pending.extend(right);
                }
            }
        }
        if released > 0 {
            debug!("released {released} nodes");
        }
    }

    /// Slot holding `key`, or the empty slot where it would be attached.
    fn slot_of<'a>(mut slot: &'a mut Link, key: &str) -> &'a mut Link {
        loop {
            let ord = match slot.as_deref() {
                Some(node) => key.cmp(node.entry.key.as_str()),
                None => return slot,
            };
            slot = match (ord, slot) {
                (Ordering::Less, Some(node)) => &mut node.left,
                (Ordering::Greater, Some(node)) => &mut node.right,
                (_, found) => return found,
            };
        }
    }

    fn take_min(mut slot: &mut Link) -> Option<Box<Node>> {
        while slot.as_ref().is_some_and(|node| node.left.is_some()) {
            slot = &mut slot.as_mut()?.left;
        }
        let mut min = slot.take()?;
        *slot = min.right.take();
        Some(min)
    }
}

impl Default for WordTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WordTree {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for WordTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|e| (&e.key, (&e.value, e.count))))
            .finish()
    }
}

impl Extend<Entry> for WordTree {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for Entry { key, value, count } in iter {
            self.insert_with_count(key, value, count);
        }
    }
}

impl FromIterator<Entry> for WordTree {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a> IntoIterator for &'a WordTree {
    type Item = &'a Entry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order (ascending key) iterator.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn new(root: Option<&'a Node>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut cur: Option<&'a Node>) {
        while let Some(node) = cur {
            self.stack.push(node);
            cur = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.entry)
    }
}
