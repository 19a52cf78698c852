//! Greedy longest-matching-block similarity over characters.
//!
//! The longest common block is found first, then the regions on either side
//! are matched recursively. With `b` of 200 characters or more, characters
//! occurring in more than 1% of `b` (plus one) are not used to seed a match,
//! only to extend one.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
}

const AUTOJUNK_MIN_LEN: usize = 200;

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let b2j = index_b(&b);
        Self { a, b, b2j }
    }

    /// Longest block with `a[i..i+size] == b[j..j+size]` inside the given
    /// windows. Ties go to the smallest `i`, then the smallest `j`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i-1], b[j].
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular characters never seed a match but may extend one.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        Match {
            a: best_i,
            b: best_j,
            size: best_size,
        }
    }

    /// Non-overlapping matching blocks in ascending order.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
        }

        blocks.sort_by_key(|m| (m.a, m.b));
        blocks
    }

    /// `2*M / T`, where `M` is the number of matched characters and `T` the
    /// total length of both sequences. Two empty sequences are identical.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

fn index_b(b: &[char]) -> HashMap<char, Vec<usize>> {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b2j.entry(c).or_default().push(j);
    }

    if b.len() >= AUTOJUNK_MIN_LEN {
        let limit = b.len() / 100 + 1;
        b2j.retain(|_, positions| positions.len() <= limit);
    }
    b2j
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_have_ratio_one() {
        assert_eq!(SequenceMatcher::new("attention", "attention").ratio(), 1.0);
        assert_eq!(SequenceMatcher::new("", "").ratio(), 1.0);
    }

    #[test]
    fn disjoint_or_one_sided_strings_have_ratio_zero() {
        assert_eq!(SequenceMatcher::new("abc", "xyz").ratio(), 0.0);
        assert_eq!(SequenceMatcher::new("abc", "").ratio(), 0.0);
    }

    #[test]
    fn known_ratios() {
        // abcd / bcde share "bcd": 2*3/8.
        assert_eq!(SequenceMatcher::new("abcd", "bcde").ratio(), 0.75);
        // "a" + "cd" match around the differing middle: 2*3/8.
        assert_eq!(SequenceMatcher::new("abcd", "axcd").ratio(), 0.75);
        assert_eq!(SequenceMatcher::new("private", "privacy").ratio(), 2.0 * 5.0 / 14.0);
    }

    #[test]
    fn longest_match_prefers_earliest_block() {
        let m = SequenceMatcher::new(" abcd", "abcd abcd");
        assert_eq!(m.find_longest_match(0, 5, 0, 9), Match { a: 0, b: 4, size: 5 });

        let m = SequenceMatcher::new("ab", "abab");
        assert_eq!(m.find_longest_match(0, 2, 0, 4), Match { a: 0, b: 0, size: 2 });
    }

    #[test]
    fn matching_blocks_are_ordered() {
        let m = SequenceMatcher::new("abxcd", "abcd");
        assert_eq!(
            m.matching_blocks(),
            vec![Match { a: 0, b: 0, size: 2 }, Match { a: 3, b: 2, size: 2 }]
        );
    }

    #[test]
    fn popular_characters_do_not_seed_matches_in_long_inputs() {
        let long = "a".repeat(250);
        // Every char of `long` is popular and the leading 'b' blocks extension.
        assert_eq!(SequenceMatcher::new("baaaa", &long).ratio(), 0.0);

        let short = "a".repeat(150);
        assert!(SequenceMatcher::new("baaaa", &short).ratio() > 0.0);
    }
}
