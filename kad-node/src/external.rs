// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The two typed boundaries external collaborators use to hand work to
//! the scheduler (spec.md §6): a search request and a keyword-check
//! request, both carrying a `MyKeywordStruct` and a response channel.
//!
//! Everything here is a plain data shape; no networking or classification
//! logic lives in this module.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// What a metadata item is believed to be before classification narrows
/// it against an actual file name (§4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ItemType {
    Movie,
    SeasonTv,
    NoSeasonTv,
    Unknown,
}

/// A single plausible title for the thing the user is searching for,
/// usually one of several supplied by an external metadata lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub org_name: String,
    pub ch_name: String,
    pub other_ch_name: String,
}

/// The parsed form of a user's raw search phrase: the original tokens,
/// the subset usable as DHT search keywords, the subset usable for
/// name matching, and an optional season carve-out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MyKeyword {
    pub original: Vec<String>,
    pub search_keywords: Vec<String>,
    pub name_keywords: Vec<String>,
    /// -1 means "any season"; a non-negative value restricts results.
    pub season: i32,
}

/// Everything one search request needs: the flat target-keyword list the
/// networking layer hashes one at a time, the parsed user keyword, and
/// the candidate metadata items classification matches file names against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MyKeywordStruct {
    pub target_keywords: Vec<String>,
    pub user_keyword: MyKeyword,
    pub items: Vec<Item>,
}

/// A classified, formatted result ready for the external boundary's JSON
/// encoding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ed2kFileLink {
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub org_name: String,
    pub ch_name: String,
    pub season: i32,
    pub episode: i32,
    pub name: String,
    pub size: u64,
    pub avail: u32,
    pub hash: [u8; 16],
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchRes {
    pub file_links: Vec<Ed2kFileLink>,
}

/// A search request from the web boundary (out of scope here; see
/// spec.md §1) to the core. `result_sink` is a bounded stream the
/// scheduler writes incremental `SearchRes` batches to; per spec.md §5 a
/// full sink drops the write rather than blocking the event loop.
pub struct SearchReq {
    pub result_sink: mpsc::Sender<SearchRes>,
    pub keyword_struct: MyKeywordStruct,
}

/// Response to a keyword-check request: the same item shape the search
/// boundary uses, or an error string when the external metadata worker
/// failed or timed out (spec.md §6, §7).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KeywordCheckRes {
    pub items: Vec<Item>,
    pub error: Option<String>,
}

/// A keyword-check request: identical shape to a search request, routed
/// to an external metadata worker instead of the DHT.
pub struct KeywordCheckReq {
    pub result_sink: mpsc::Sender<KeywordCheckRes>,
    pub keyword_struct: MyKeywordStruct,
}
