//! Pacing analytics: role balance, line lengths, frequent phrases, and
//! rhythm/tempo balance.
//!
//! Everything here is a pure function of the block sequence. It never mutates
//! the script and is cheap enough to recompute after every edit.
//!
//! Lengths count characters (`char`s), not bytes, so a line of Japanese reads
//! the same as a line of ASCII.
//!
//! # Tempo balance
//!
//! For each line (headings skipped), with its previous and next *line* as
//! neighbours:
//!
//! ```text
//! prev_ratio   = len / prev_len        (1 without a previous line)
//! next_ratio   = next_len / len        (1 without a next line)
//! base         = |1 - prev_ratio| + |1 - next_ratio|
//! penalty      = 0.5 if prev.role == role == next.role, else 0
//! tempo_balance = round2(base + penalty)
//! ```

use indexmap::IndexMap;
use serde::Serialize;

use manzai_types::{Block, LineBlock, Role};

/// Phrase window width, in characters.
pub const PHRASE_WIDTH: usize = 3;

/// How many frequent phrases a report keeps.
pub const TOP_PHRASES: usize = 5;

/// Extra tempo balance for three consecutive lines by the same role.
pub const ROLE_REPEAT_PENALTY: f64 = 0.5;

/// Line counts per role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoleBalance {
    pub boke: usize,
    pub tsukkomi: usize,
}

impl RoleBalance {
    pub fn count(&self, role: Role) -> usize {
        match role {
            Role::Boke => self.boke,
            Role::Tsukkomi => self.tsukkomi,
        }
    }

    pub fn total(&self) -> usize {
        self.boke + self.tsukkomi
    }

    /// Proportion of lines spoken by `role`, in `[0, 1]`. Zero when empty.
    pub fn share(&self, role: Role) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.count(role) as f64 / total as f64,
        }
    }
}

/// One point of the line-length series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LineLength {
    /// 1-based position among line blocks.
    pub index: usize,
    pub length: usize,
    pub role: Role,
}

/// A 3-character phrase seen more than once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhraseCount {
    pub phrase: String,
    pub count: usize,
}

/// Rhythm metrics for one line.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RhythmPoint {
    /// 1-based position among line blocks.
    pub index: usize,
    pub length: usize,
    pub role: Role,
    /// Rounded to 2 decimals for display.
    pub prev_ratio: f64,
    /// Rounded to 2 decimals for display.
    pub next_ratio: f64,
    pub prev_diff: i64,
    pub next_diff: i64,
    pub tempo_change: u64,
    /// e.g. `boke-tsukkomi-boke`, shorter at the edges.
    pub role_pattern: String,
    pub tempo_balance: f64,
}

impl RhythmPoint {
    pub fn band(&self) -> TempoBand {
        TempoBand::classify(self.tempo_balance)
    }
}

/// Display band for a tempo balance value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TempoBand {
    /// Below 1.0.
    Stable,
    /// 1.0 through 1.5.
    Moderate,
    /// Above 1.5.
    Large,
}

impl TempoBand {
    pub fn classify(balance: f64) -> Self {
        if balance < 1.0 {
            TempoBand::Stable
        } else if balance <= 1.5 {
            TempoBand::Moderate
        } else {
            TempoBand::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TempoBand::Stable => "stable",
            TempoBand::Moderate => "moderate variation",
            TempoBand::Large => "large variation",
        }
    }
}

/// All pacing metrics for one script.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PacingReport {
    pub role_balance: RoleBalance,
    pub lengths: Vec<LineLength>,
    pub phrases: Vec<PhraseCount>,
    pub rhythm: Vec<RhythmPoint>,
}

/// Compute every metric for `blocks`.
pub fn analyze(blocks: &[Block]) -> PacingReport {
    PacingReport {
        role_balance: role_balance(blocks),
        lengths: length_series(blocks),
        phrases: frequent_phrases(blocks),
        rhythm: rhythm(blocks),
    }
}

pub fn role_balance(blocks: &[Block]) -> RoleBalance {
    blocks
        .iter()
        .filter_map(Block::role)
        .fold(RoleBalance::default(), |mut acc, role| {
            match role {
                Role::Boke => acc.boke += 1,
                Role::Tsukkomi => acc.tsukkomi += 1,
            }
            acc
        })
}

pub fn length_series(blocks: &[Block]) -> Vec<LineLength> {
    lines(blocks)
        .enumerate()
        .map(|(i, line)| LineLength {
            index: i + 1,
            length: char_len(&line.content),
            role: line.role,
        })
        .collect()
}

/// Overlapping 3-character windows across every block, headings included.
///
/// Windows never span two blocks. Phrases seen more than once are returned by
/// descending count, ties in first-seen order, at most [`TOP_PHRASES`].
pub fn frequent_phrases(blocks: &[Block]) -> Vec<PhraseCount> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for block in blocks {
        let chars: Vec<char> = block.content().chars().collect();
        for window in chars.windows(PHRASE_WIDTH) {
            *counts.entry(window.iter().collect()).or_insert(0) += 1;
        }
    }

    let mut repeated: Vec<PhraseCount> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(phrase, count)| PhraseCount { phrase, count })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    repeated.sort_by(|a, b| b.count.cmp(&a.count));
    repeated.truncate(TOP_PHRASES);
    repeated
}

pub fn rhythm(blocks: &[Block]) -> Vec<RhythmPoint> {
    let lines: Vec<&LineBlock> = lines(blocks).collect();
    let lengths: Vec<usize> = lines.iter().map(|l| char_len(&l.content)).collect();

    (0..lines.len())
        .map(|i| {
            let len = lengths[i];
            let role = lines[i].role;
            let prev = i.checked_sub(1).map(|p| (lengths[p], lines[p].role));
            let next = lines.get(i + 1).map(|l| (lengths[i + 1], l.role));

            let prev_ratio = prev.map_or(1.0, |(p, _)| ratio(len, p));
            let next_ratio = next.map_or(1.0, |(n, _)| ratio(n, len));
            let prev_diff = prev.map_or(0, |(p, _)| len as i64 - p as i64);
            let next_diff = next.map_or(0, |(n, _)| n as i64 - len as i64);

            let role_pattern = [prev.map(|(_, r)| r), Some(role), next.map(|(_, r)| r)]
                .into_iter()
                .flatten()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join("-");

            let base = (1.0 - prev_ratio).abs() + (1.0 - next_ratio).abs();
            let penalty = match (prev, next) {
                (Some((_, p)), Some((_, n))) if p == role && n == role => ROLE_REPEAT_PENALTY,
                _ => 0.0,
            };

            RhythmPoint {
                index: i + 1,
                length: len,
                role,
                prev_ratio: round2(prev_ratio),
                next_ratio: round2(next_ratio),
                prev_diff,
                next_diff,
                tempo_change: prev_diff.unsigned_abs() + next_diff.unsigned_abs(),
                role_pattern,
                tempo_balance: round2(base + penalty),
            }
        })
        .collect()
}

fn lines(blocks: &[Block]) -> impl Iterator<Item = &LineBlock> {
    blocks.iter().filter_map(Block::as_line)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// `num / den`, with an empty denominator treated as length 1 and two empty
/// lines counted as equal.
fn ratio(num: usize, den: usize) -> f64 {
    match (num, den) {
        (0, 0) => 1.0,
        (n, 0) => n as f64,
        (n, d) => n as f64 / d as f64,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(role: Role, content: &str) -> Block {
        Block::line(role).with_content(content)
    }

    fn heading(content: &str) -> Block {
        Block::heading().with_content(content)
    }

    #[test]
    fn test_role_balance_counts_lines_only() {
        let blocks = vec![
            line(Role::Boke, "a"),
            heading("h"),
            line(Role::Tsukkomi, "b"),
            line(Role::Boke, "c"),
        ];
        let balance = role_balance(&blocks);
        assert_eq!(
            balance,
            RoleBalance {
                boke: 2,
                tsukkomi: 1
            }
        );
        assert!((balance.share(Role::Boke) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(RoleBalance::default().share(Role::Boke), 0.0);
    }

    #[test]
    fn test_length_series_skips_headings_and_counts_chars() {
        let blocks = vec![
            heading("つかみ"),
            line(Role::Boke, "どうも"),
            line(Role::Tsukkomi, "hi"),
        ];
        let series = length_series(&blocks);
        assert_eq!(
            series,
            vec![
                LineLength {
                    index: 1,
                    length: 3,
                    role: Role::Boke,
                },
                LineLength {
                    index: 2,
                    length: 2,
                    role: Role::Tsukkomi,
                },
            ]
        );
    }

    #[test]
    fn test_phrases_ababab() {
        let phrases = frequent_phrases(&[line(Role::Boke, "ababab")]);
        assert_eq!(
            phrases,
            vec![
                PhraseCount {
                    phrase: "aba".into(),
                    count: 2,
                },
                PhraseCount {
                    phrase: "bab".into(),
                    count: 2,
                },
            ]
        );
    }

    #[test]
    fn test_phrases_do_not_cross_blocks() {
        // "abc" only appears if windows span the boundary
        let phrases = frequent_phrases(&[
            line(Role::Boke, "xab"),
            line(Role::Tsukkomi, "cxa"),
            line(Role::Boke, "bcx"),
        ]);
        assert!(phrases.is_empty());
    }

    #[test]
    fn test_phrases_include_headings() {
        let phrases = frequent_phrases(&[
            heading("なんでやねん"),
            line(Role::Tsukkomi, "なんでやねん"),
        ]);
        // なんで, んでや, でやね, やねん
        assert_eq!(phrases.len(), 4);
        assert!(phrases.iter().all(|p| p.count == 2));
        assert_eq!(phrases[0].phrase, "なんで");
    }

    #[test]
    fn test_phrases_sorted_by_count_then_first_seen() {
        let phrases = frequent_phrases(&[
            line(Role::Boke, "xyz"),
            line(Role::Boke, "abc"),
            line(Role::Boke, "abc"),
            line(Role::Boke, "xyz"),
            line(Role::Boke, "abc"),
        ]);
        assert_eq!(
            phrases,
            vec![
                PhraseCount {
                    phrase: "abc".into(),
                    count: 3,
                },
                PhraseCount {
                    phrase: "xyz".into(),
                    count: 2,
                },
            ]
        );
    }

    #[test]
    fn test_phrases_truncated_to_top_five() {
        let blocks: Vec<Block> = ["aaa", "bbb", "ccc", "ddd", "eee", "fff"]
            .iter()
            .flat_map(|p| [line(Role::Boke, p), line(Role::Boke, p)])
            .collect();
        let phrases = frequent_phrases(&blocks);
        assert_eq!(phrases.len(), 5);
        assert_eq!(phrases[4].phrase, "eee");
    }

    #[test]
    fn test_short_content_has_no_windows() {
        assert!(frequent_phrases(&[line(Role::Boke, "ab"), line(Role::Boke, "ab")]).is_empty());
    }

    #[test]
    fn test_same_role_triplet_equal_lengths_is_half() {
        let blocks = vec![
            line(Role::Boke, "aaaa"),
            line(Role::Boke, "bbbb"),
            line(Role::Boke, "cccc"),
        ];
        let points = rhythm(&blocks);
        assert_eq!(points[1].tempo_balance, 0.5);
        assert_eq!(points[1].role_pattern, "boke-boke-boke");
        // Edges have only one neighbour: no penalty
        assert_eq!(points[0].tempo_balance, 0.0);
        assert_eq!(points[2].tempo_balance, 0.0);
    }

    #[test]
    fn test_alternating_triplet_equal_lengths_is_zero() {
        let blocks = vec![
            line(Role::Boke, "aaaa"),
            line(Role::Tsukkomi, "bbbb"),
            line(Role::Boke, "cccc"),
        ];
        let points = rhythm(&blocks);
        assert_eq!(points[1].tempo_balance, 0.0);
        assert_eq!(points[1].role_pattern, "boke-tsukkomi-boke");
        assert_eq!(points[0].role_pattern, "boke-tsukkomi");
        assert_eq!(points[2].role_pattern, "tsukkomi-boke");
    }

    #[test]
    fn test_rhythm_ratios_and_diffs() {
        let blocks = vec![
            line(Role::Boke, "aa"),
            heading("ignored"),
            line(Role::Tsukkomi, "bbbb"),
            line(Role::Boke, "c"),
        ];
        let points = rhythm(&blocks);
        assert_eq!(points.len(), 3);

        let mid = &points[1];
        assert_eq!(mid.index, 2);
        assert_eq!(mid.prev_ratio, 2.0);
        assert_eq!(mid.next_ratio, 0.25);
        assert_eq!(mid.prev_diff, 2);
        assert_eq!(mid.next_diff, -3);
        assert_eq!(mid.tempo_change, 5);
        // |1 - 2| + |1 - 0.25|
        assert_eq!(mid.tempo_balance, 1.75);
        assert_eq!(mid.band(), TempoBand::Large);
    }

    #[test]
    fn test_single_line_rhythm() {
        let points = rhythm(&[line(Role::Tsukkomi, "x")]);
        assert_eq!(points[0].role_pattern, "tsukkomi");
        assert_eq!(points[0].prev_ratio, 1.0);
        assert_eq!(points[0].next_ratio, 1.0);
        assert_eq!(points[0].tempo_balance, 0.0);
    }

    #[test]
    fn test_empty_lines_stay_finite() {
        let points = rhythm(&[
            line(Role::Boke, ""),
            line(Role::Tsukkomi, ""),
            line(Role::Boke, "abc"),
        ]);
        assert!(points.iter().all(|p| p.tempo_balance.is_finite()));
        assert_eq!(points[0].tempo_balance, 0.0);
        assert_eq!(points[1].next_ratio, 3.0);
    }

    #[test]
    fn test_tempo_bands() {
        assert_eq!(TempoBand::classify(0.99), TempoBand::Stable);
        assert_eq!(TempoBand::classify(1.0), TempoBand::Moderate);
        assert_eq!(TempoBand::classify(1.5), TempoBand::Moderate);
        assert_eq!(TempoBand::classify(1.51), TempoBand::Large);
    }

    #[test]
    fn test_analyze_empty_script() {
        let report = analyze(&[]);
        assert_eq!(report.role_balance.total(), 0);
        assert!(report.lengths.is_empty());
        assert!(report.phrases.is_empty());
        assert!(report.rhythm.is_empty());
    }
}
