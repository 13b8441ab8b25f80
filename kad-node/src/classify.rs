// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Matches an incoming file name against a user's candidate metadata
//! items and extracts season/episode (spec.md §4.5).
//!
//! This is the last gate before a file becomes a result: type tag must
//! be `"Video"`, the item's tokenized original name must match as a
//! loose substring-ordered regex, and a Han-character/Chinese-name
//! cross-check guards against mis-classification.

use crate::external::{Ed2kFileLink, Item, ItemType};
use crate::keyword::split_to_keywords;
use kad_protocol::message::SearchFileEntry;
use regex::Regex;
use std::sync::OnceLock;

const MIN_SEASON: u32 = 0;
const MAX_SEASON: u32 = 100;
const MAX_EPISODE: u32 = 200;

/// A file name matched against one of the user's items, with season and
/// episode extracted (`-1` for "not present").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classified {
    pub item_index: usize,
    pub season: i32,
    pub episode: i32,
    pub inferred_type: ItemType,
}

fn is_han(c: char) -> bool {
    ('\u{4E00}'..='\u{9FA5}').contains(&c)
}

fn season_episode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"s(\d{1,3})\.?e(\d{1,3})|(\d{1,3})x(\d{1,3})").expect("valid"))
}

fn episode_only_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ex](\d{1,3})|\.(\d{1,3})\.").expect("valid"))
}

/// Scans for `sNNeNN`, `sNN.eNN` or `NNxNN` within range. Returns the
/// first match honoring the season/episode bounds.
fn scan_season_episode(name: &str) -> Option<(u32, u32)> {
    for caps in season_episode_regex().captures_iter(name) {
        let (season, episode) = if let (Some(s), Some(e)) = (caps.get(1), caps.get(2)) {
            (s.as_str().parse().ok()?, e.as_str().parse().ok()?)
        } else if let (Some(s), Some(e)) = (caps.get(3), caps.get(4)) {
            (s.as_str().parse().ok()?, e.as_str().parse().ok()?)
        } else {
            continue
        };
        if (MIN_SEASON..=MAX_SEASON).contains(&season) && episode < MAX_EPISODE {
            return Some((season, episode))
        }
    }
    None
}

/// Scans for `eNN`, `xNN` or a dot-delimited `.NN.` once season+episode
/// has already failed to match.
fn scan_episode_only(name: &str) -> Option<u32> {
    for caps in episode_only_regex().captures_iter(name) {
        let episode = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse::<u32>().ok())?;
        if episode < MAX_EPISODE {
            return Some(episode)
        }
    }
    None
}

fn item_matches(item: &Item, lower_name: &str) -> bool {
    let tokens = split_to_keywords(&item.org_name);
    if tokens.is_empty() {
        return false
    }
    let pattern = tokens.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join(".*");
    Regex::new(&pattern).map(|re| re.is_match(lower_name)).unwrap_or(false)
}

/// Classifies one candidate file name against a user's item list,
/// honoring a season restriction (`-1` for "any"). Returns the first
/// item that matches and survives the Han/season cross-checks.
pub fn classify(
    file_name: &str,
    type_tag: &str,
    items: &[Item],
    requested_season: i32,
) -> Option<Classified> {
    if type_tag != "Video" {
        return None
    }
    let lower = file_name.to_lowercase();

    for (item_index, item) in items.iter().enumerate() {
        if !item_matches(item, &lower) {
            continue
        }

        let (season, episode) = match scan_season_episode(&lower) {
            Some((s, e)) => (s as i32, e as i32),
            None => match scan_episode_only(&lower) {
                Some(e) => (-1, e as i32),
                None => (-1, -1),
            },
        };

        let inferred_type = match item.kind {
            ItemType::Unknown => {
                if season >= 0 && episode >= 0 {
                    ItemType::SeasonTv
                } else if episode >= 0 {
                    ItemType::NoSeasonTv
                } else {
                    ItemType::Movie
                }
            }
            other => other,
        };

        let non_chinese_original = item.org_name != item.ch_name;
        if non_chinese_original && lower.chars().any(is_han) {
            let ch_lower = item.ch_name.to_lowercase();
            if !ch_lower.is_empty() && !lower.contains(&ch_lower) {
                continue
            }
        }

        if requested_season >= 0 && season != requested_season {
            continue
        }

        return Some(Classified { item_index, season, episode, inferred_type })
    }
    None
}

/// Converts a raw search-response file entry into an `Ed2kFileLink`
/// carrying the matched item's titles and the extracted season/episode,
/// or `None` if the file doesn't match any item / type tag / season
/// restriction (spec.md §6).
pub fn to_file_link(
    file: &SearchFileEntry,
    items: &[Item],
    requested_season: i32,
) -> Option<Ed2kFileLink> {
    let classified = classify(&file.name, &file.type_tag, items, requested_season)?;
    let item = &items[classified.item_index];
    Some(Ed2kFileLink {
        kind: classified.inferred_type,
        org_name: item.org_name.clone(),
        ch_name: item.ch_name.clone(),
        season: classified.season,
        episode: classified.episode,
        name: file.name.clone(),
        size: file.size,
        avail: file.sources,
        hash: file.hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown_item(org_name: &str) -> Item {
        Item {
            kind: ItemType::Unknown,
            org_name: org_name.to_string(),
            ch_name: org_name.to_string(),
            other_ch_name: String::new(),
        }
    }

    #[test]
    fn rejects_non_video_type_tag() {
        let items = vec![unknown_item("Breaking Bad")];
        assert!(classify("breaking.bad.s02e05.mkv", "Audio", &items, -1).is_none());
    }

    #[test]
    fn extracts_season_and_episode_from_sxxexx() {
        let items = vec![unknown_item("Breaking Bad")];
        let result = classify("breaking.bad.s02e05.mkv", "Video", &items, -1).unwrap();
        assert_eq!(result.season, 2);
        assert_eq!(result.episode, 5);
        assert_eq!(result.inferred_type, ItemType::SeasonTv);
    }

    #[test]
    fn extracts_episode_only_from_exx() {
        let items = vec![unknown_item("Some Show")];
        let result = classify("some.show.e12.mkv", "Video", &items, -1).unwrap();
        assert_eq!(result.season, -1);
        assert_eq!(result.episode, 12);
        assert_eq!(result.inferred_type, ItemType::NoSeasonTv);
    }

    #[test]
    fn no_season_or_episode_markers_infers_movie() {
        let items = vec![unknown_item("The Matrix")];
        let result = classify("the.matrix.1999.mkv", "Video", &items, -1).unwrap();
        assert_eq!(result.inferred_type, ItemType::Movie);
        assert_eq!(result.season, -1);
    }

    #[test]
    fn season_mismatch_is_rejected() {
        let items = vec![unknown_item("Breaking Bad")];
        assert!(classify("breaking.bad.s02e05.mkv", "Video", &items, 3).is_none());
        assert!(classify("breaking.bad.s02e05.mkv", "Video", &items, 2).is_some());
    }

    #[test]
    fn non_matching_item_name_does_not_match() {
        let items = vec![unknown_item("Some Other Show")];
        assert!(classify("breaking.bad.s02e05.mkv", "Video", &items, -1).is_none());
    }

    #[test]
    fn to_file_link_carries_matched_item_titles() {
        let items = vec![unknown_item("Breaking Bad")];
        let file = SearchFileEntry {
            hash: [1u8; 16],
            name: "breaking.bad.s02e05.mkv".to_string(),
            size: 100,
            type_tag: "Video".to_string(),
            sources: 4,
            media_length: 0,
        };
        let link = to_file_link(&file, &items, -1).unwrap();
        assert_eq!(link.org_name, "Breaking Bad");
        assert_eq!(link.season, 2);
        assert_eq!(link.episode, 5);
        assert_eq!(link.avail, 4);
    }
}
