//! Tag co-occurrence counting.
//!
//! A pair of tags is stored once, in lexicographic order, so `(a, b)` and
//! `(b, a)` always address the same counter.

use std::collections::{BTreeMap, BTreeSet};

use crate::meme::Meme;

/// An unordered pair of distinct tag keys, stored in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagPair {
  first:  String,
  second: String,
}

impl TagPair {
  /// Build the canonical pair. Returns `None` when both keys are equal.
  pub fn new(a: impl Into<String>, b: impl Into<String>) -> Option<Self> {
    let (a, b) = (a.into(), b.into());
    match a.cmp(&b) {
      std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
      std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
      std::cmp::Ordering::Equal => None,
    }
  }

  pub fn first(&self) -> &str { &self.first }

  pub fn second(&self) -> &str { &self.second }

  /// The partner of `tag` in this pair, if `tag` is a member.
  pub fn other(&self, tag: &str) -> Option<&str> {
    if self.first == tag {
      Some(&self.second)
    } else if self.second == tag {
      Some(&self.first)
    } else {
      None
    }
  }
}

/// Tag keys are compared case-insensitively.
fn key(tag: &str) -> String { tag.trim().to_lowercase() }

/// Co-occurrence counts over a set of memes.
#[derive(Debug, Clone, Default)]
pub struct CooccurrenceTable {
  counts: BTreeMap<TagPair, u64>,
}

impl CooccurrenceTable {
  pub fn from_memes<'a>(memes: impl IntoIterator<Item = &'a Meme>) -> Self {
    let mut table = Self::default();
    for meme in memes {
      table.record(meme.tag_names());
    }
    table
  }

  /// Count every distinct pair among `tags` once.
  pub fn record<'a>(&mut self, tags: impl IntoIterator<Item = &'a str>) {
    let tags: BTreeSet<String> = tags
      .into_iter()
      .map(key)
      .filter(|t| !t.is_empty())
      .collect();
    let tags: Vec<&String> = tags.iter().collect();

    for (i, a) in tags.iter().enumerate() {
      for b in &tags[i + 1..] {
        if let Some(pair) = TagPair::new(a.as_str(), b.as_str()) {
          *self.counts.entry(pair).or_default() += 1;
        }
      }
    }
  }

  pub fn count(&self, a: &str, b: &str) -> u64 {
    TagPair::new(key(a), key(b))
      .and_then(|pair| self.counts.get(&pair).copied())
      .unwrap_or(0)
  }

  /// Tags seen together with `tag`, most frequent first, ties by name.
  pub fn related(&self, tag: &str, limit: usize) -> Vec<(String, u64)> {
    let tag = key(tag);
    let mut related: Vec<(String, u64)> = self
      .counts
      .iter()
      .filter_map(|(pair, n)| pair.other(&tag).map(|o| (o.to_owned(), *n)))
      .collect();
    related.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    related.truncate(limit);
    related
  }

  pub fn is_empty(&self) -> bool { self.counts.is_empty() }
}
