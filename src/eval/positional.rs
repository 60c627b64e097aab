//! Positional operators: `#NEAR/n`, `#WINDOW/n`, `#SYN`.
//!
//! All three consume inverted lists and produce a new inverted list — a
//! virtual term — so they can nest under each other or under a scoring
//! operator. Candidate documents come from a sorted-merge intersection
//! (union for `#SYN`); the position walks below decide which candidates
//! survive.

use super::cursor::intersect;
use crate::error::{Error, Result};
use crate::types::{Field, InvertedList, Posting};

/// Check that every operand has positions in the same field and return it.
///
/// Positional operators reason about token offsets, which are only
/// comparable within a single field.
fn common_field(op_name: &str, lists: &[InvertedList]) -> Result<Field> {
    let mut fields = lists.iter().map(|l| l.field);
    let Some(first) = fields.next() else {
        return Err(Error::Eval(format!("{op_name} with no arguments")));
    };
    if fields.all(|f| f == first) {
        Ok(first)
    } else {
        Err(Error::Eval(format!(
            "{op_name} arguments must share a field"
        )))
    }
}

/// Ordered proximity: one position per operand, strictly increasing in
/// argument order, every adjacent gap in `[1, distance]`.
///
/// Pointer policy: a non-positive gap advances the later pointer; a gap
/// over `distance` advances the earlier pointer and the whole chain is
/// re-verified from the first pair. Each full match records the *last*
/// term's position, then every pointer advances once.
fn near_positions(lists: &[&[usize]], distance: usize) -> Vec<usize> {
    let k = lists.len();
    let mut idx = vec![0usize; k];
    let mut matches = Vec::new();

    if k == 0 || lists.iter().any(|l| l.is_empty()) {
        return matches;
    }
    if k == 1 {
        return lists[0].to_vec();
    }

    'scan: loop {
        let mut i = 1;
        while i < k {
            let prev = lists[i - 1][idx[i - 1]];
            let curr = lists[i][idx[i]];
            if curr <= prev {
                // Later term sits at or before the earlier one.
                idx[i] += 1;
                if idx[i] >= lists[i].len() {
                    break 'scan;
                }
            } else if curr - prev > distance {
                idx[i - 1] += 1;
                if idx[i - 1] >= lists[i - 1].len() {
                    break 'scan;
                }
                // Earlier pointer moved: everything behind it needs
                // re-verification.
                i = 1;
            } else {
                i += 1;
            }
        }

        matches.push(lists[k - 1][idx[k - 1]]);
        for (j, list) in lists.iter().enumerate() {
            idx[j] += 1;
            if idx[j] >= list.len() {
                break 'scan;
            }
        }
    }

    matches
}

/// Unordered proximity: one position per operand with
/// `max(positions) - min(positions) < distance`, argument order irrelevant.
///
/// While the window is too wide, the pointer holding the minimum position
/// advances; a found window records its end position and every pointer
/// advances once.
fn window_positions(lists: &[&[usize]], distance: usize) -> Vec<usize> {
    let k = lists.len();
    let mut idx = vec![0usize; k];
    let mut matches = Vec::new();

    if k == 0 || lists.iter().any(|l| l.is_empty()) {
        return matches;
    }

    loop {
        let mut min_at = 0;
        let mut min_pos = usize::MAX;
        let mut max_pos = 0;
        for (j, list) in lists.iter().enumerate() {
            let p = list[idx[j]];
            if p < min_pos {
                min_pos = p;
                min_at = j;
            }
            max_pos = max_pos.max(p);
        }

        if max_pos - min_pos < distance {
            matches.push(max_pos);
            for (j, list) in lists.iter().enumerate() {
                idx[j] += 1;
                if idx[j] >= list.len() {
                    return matches;
                }
            }
        } else {
            idx[min_at] += 1;
            if idx[min_at] >= lists[min_at].len() {
                return matches;
            }
        }
    }
}

/// Run an ordered or unordered proximity operator over its operands'
/// inverted lists.
pub(crate) fn proximity(
    op_name: &str,
    lists: &[InvertedList],
    distance: usize,
    ordered: bool,
) -> Result<InvertedList> {
    let field = common_field(op_name, lists)?;
    let mut result = InvertedList::empty(field);

    let postings: Vec<&[Posting]> = lists.iter().map(|l| l.postings.as_slice()).collect();
    intersect(&postings, |doc, row| {
        let position_lists: Vec<&[usize]> = row.iter().map(|p| p.positions.as_slice()).collect();
        let positions = if ordered {
            near_positions(&position_lists, distance)
        } else {
            window_positions(&position_lists, distance)
        };
        // Candidates with zero full matches are dropped.
        if !positions.is_empty() {
            result.ctf += positions.len() as u64;
            result.postings.push(Posting::new(doc, positions));
        }
    });

    Ok(result)
}

/// `#SYN`: merge the operands' postings into one virtual term.
///
/// Per docid, position lists are union-merged (duplicates collapse); the
/// merged term's document frequency is the union size and its collection
/// term frequency the summed occurrence count.
pub(crate) fn synonym(lists: &[InvertedList]) -> Result<InvertedList> {
    let field = common_field("#SYN", lists)?;
    let mut result = InvertedList::empty(field);
    result.ctf = lists.iter().map(|l| l.ctf).sum();

    let mut merged: std::collections::BTreeMap<usize, Vec<usize>> =
        std::collections::BTreeMap::new();
    for list in lists {
        for posting in &list.postings {
            merged
                .entry(posting.doc_id)
                .or_default()
                .extend_from_slice(&posting.positions);
        }
    }
    for (doc, mut positions) in merged {
        positions.sort_unstable();
        positions.dedup();
        result.postings.push(Posting::new(doc, positions));
    }

    Ok(result)
}
