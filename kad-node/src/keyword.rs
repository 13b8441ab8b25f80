// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Splits a raw user search phrase into keywords and, separately, into
//! the flat `target_keywords` list the KAD search layer hashes one at a
//! time (SPEC_FULL.md §3 item 1).
//!
//! This is the boundary between free text and the typed `MyKeywordStruct`
//! spec.md §6 already defines; nothing downstream of it deals in raw
//! strings again.

use crate::external::{Item, ItemType, MyKeyword};
use std::collections::HashSet;

const MIN_PRIMARY_KEYWORD_LEN: usize = 3;
const MIN_TARGET_KEYWORD_LEN: usize = 3;
const SEPARATORS: &str = "·!/\\*?<>|-_:,.;'\"()[]‘’“”；、：，。？！\t";

fn stopwords() -> &'static HashSet<&'static str> {
    static WORDS: std::sync::OnceLock<HashSet<&'static str>> = std::sync::OnceLock::new();
    WORDS.get_or_init(|| {
        [
            "the", "these", "that", "a", "this", "he", "she", "we", "you", "us", "his", "her",
            "it", "my", "our", "no", "yes", "not", "is", "are", "in", "on", "of",
        ]
        .into_iter()
        .collect()
    })
}

/// Lower-cases and replaces every separator with a space, then splits on
/// whitespace, dropping empty fragments.
pub fn split_to_keywords(s: &str) -> Vec<String> {
    split_with_ignored(s, "")
}

/// Like [`split_to_keywords`], but keeps apostrophes inside a word rather
/// than splitting on them, and then drops any resulting word that still
/// contains one (it isn't a clean primary keyword).
pub fn split_to_primary_keywords(s: &str) -> Vec<String> {
    split_with_ignored(s, "'’")
        .into_iter()
        .filter(|k| !k.contains('\'') && !k.contains('’'))
        .collect()
}

fn split_with_ignored(s: &str, ignore: &str) -> Vec<String> {
    let lowered = s.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if SEPARATORS.contains(c) && !ignore.contains(c) {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out.split(' ').filter(|k| !k.is_empty()).map(String::from).collect()
}

/// A single keyword qualifies as a "primary" keyword for KAD search
/// unless it's a stopword or shorter than 3 characters.
pub fn primary_keywords_for(keyword: &str) -> Option<Vec<String>> {
    if stopwords().contains(keyword) || keyword.chars().count() < MIN_PRIMARY_KEYWORD_LEN {
        return None
    }
    Some(vec![keyword.to_string()])
}

/// Splits a free-text name and returns its deduplicated primary keywords,
/// preserving first-seen order.
pub fn get_primary_keywords(s: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for key in split_to_primary_keywords(s) {
        if let Some(expanded) = primary_keywords_for(&key) {
            for k in expanded {
                if seen.insert(k.clone()) {
                    out.push(k);
                }
            }
        }
    }
    out
}

/// One target keyword per item's original name, deduplicated across all
/// items so the KAD layer doesn't hash the same target twice.
pub fn get_target_keywords(items: &[Item]) -> Vec<String> {
    let mut target_set: HashSet<String> = HashSet::new();
    for item in items {
        let primary = get_primary_keywords(&item.org_name);
        let already_covered = primary.iter().any(|k| target_set.contains(k));
        if already_covered {
            continue;
        }
        if let Some(candidate) = primary
            .into_iter()
            .find(|k| k.chars().count() >= MIN_TARGET_KEYWORD_LEN && !target_set.contains(k))
        {
            target_set.insert(candidate);
        }
    }
    target_set.into_iter().collect()
}

/// Parses season/episode carve-outs (`season N`, `sNN`, `第N季`) out of a
/// raw keyword list from the user, the way `NewMyKeyword` does, and
/// returns the remaining name/search keyword lists plus the season found
/// (`-1` when none was specified).
pub fn derive_my_keyword(raw_keywords: &[String]) -> MyKeyword {
    let mut name_keywords = Vec::new();
    let mut search_keywords = Vec::new();
    let mut season: i32 = -1;
    let mut skip_next = false;

    for (i, key) in raw_keywords.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if key == "season" {
            if let Some(next) = raw_keywords.get(i + 1) {
                if let Ok(n) = next.parse::<i32>() {
                    season = n;
                    skip_next = true;
                    continue;
                }
            }
        } else if let Some(rest) = key.strip_prefix('s') {
            if let Ok(n) = rest.parse::<i32>() {
                season = n;
                continue;
            }
        } else if let Some(rest) = key.strip_prefix('第') {
            let rest = rest.strip_suffix('季').unwrap_or(rest);
            if !rest.is_empty() {
                if let Ok(n) = rest.parse::<i32>() {
                    season = n;
                    continue;
                }
            }
        }

        name_keywords.push(key.clone());
        if let Some(expanded) = primary_keywords_for(key) {
            search_keywords.extend(expanded);
        }
    }

    MyKeyword {
        original: raw_keywords.to_vec(),
        search_keywords,
        name_keywords,
        season,
    }
}

/// Filters metadata items down to those whose original/Chinese/other
/// names all contain every one of the user's name keywords, TV items
/// sorted ahead of movies ahead of unknowns (matches `FilterItems`'s
/// ordering, which later classification stages rely on).
pub fn filter_items(items: Vec<Item>, keyword: &MyKeyword) -> Vec<Item> {
    let satisfied: Vec<Item> = items
        .into_iter()
        .filter(|item| {
            let org_lower = item.org_name.to_lowercase();
            keyword.name_keywords.iter().all(|k| {
                org_lower.contains(k) || item.ch_name.contains(k) || item.other_ch_name.contains(k)
            })
        })
        .collect();

    let mut tv = Vec::new();
    let mut movie = Vec::new();
    let mut other = Vec::new();
    for item in satisfied {
        match item.kind {
            ItemType::SeasonTv | ItemType::NoSeasonTv => tv.push(item),
            ItemType::Movie => movie.push(item),
            ItemType::Unknown => other.push(item),
        }
    }
    tv.into_iter().chain(movie).chain(other).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_separators_and_lowercases() {
        assert_eq!(
            split_to_keywords("The.Matrix-Reloaded"),
            vec!["the", "matrix", "reloaded"]
        );
    }

    #[test]
    fn primary_keywords_drop_stopwords_and_short_fragments() {
        assert_eq!(get_primary_keywords("the it matrix"), vec!["matrix"]);
    }

    #[test]
    fn derive_my_keyword_extracts_season_token() {
        let raw = vec!["breaking".to_string(), "bad".to_string(), "s02".to_string()];
        let mk = derive_my_keyword(&raw);
        assert_eq!(mk.season, 2);
        assert_eq!(mk.name_keywords, vec!["breaking", "bad"]);
    }

    #[test]
    fn derive_my_keyword_extracts_season_word_form() {
        let raw = vec!["matrix".to_string(), "season".to_string(), "3".to_string()];
        let mk = derive_my_keyword(&raw);
        assert_eq!(mk.season, 3);
        assert_eq!(mk.name_keywords, vec!["matrix"]);
    }

    #[test]
    fn target_keywords_dedup_across_items() {
        let items = vec![
            Item {
                kind: ItemType::Movie,
                org_name: "The Matrix".into(),
                ch_name: "黑客帝国".into(),
                other_ch_name: String::new(),
            },
            Item {
                kind: ItemType::Movie,
                org_name: "The Matrix Reloaded".into(),
                ch_name: "黑客帝国2".into(),
                other_ch_name: String::new(),
            },
        ];
        let targets = get_target_keywords(&items);
        assert_eq!(targets.len(), 2);
    }
}
