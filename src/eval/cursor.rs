//! Cursors: forward-only traversal state over docid-ordered sequences.
//!
//! A cursor is owned exclusively by the operator node using it during one
//! evaluation call and discarded afterwards — never cached, never shared.
//! Restarting means re-fetching the underlying list, not rewinding.

use crate::types::{DocId, Posting, ScoreEntry};

/// Anything with a document id that can be merged in docid order.
pub(crate) trait HasDocId {
    fn doc_id(&self) -> DocId;
}

impl HasDocId for Posting {
    fn doc_id(&self) -> DocId {
        self.doc_id
    }
}

impl HasDocId for ScoreEntry {
    fn doc_id(&self) -> DocId {
        self.doc_id
    }
}

/// A forward-only cursor over one operand's docid-ordered sequence.
#[derive(Debug)]
pub(crate) struct DocCursor<'a, T> {
    items: &'a [T],
    pos: usize,
}

impl<'a, T: HasDocId> DocCursor<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        DocCursor { items, pos: 0 }
    }

    pub fn current(&self) -> Option<&'a T> {
        self.items.get(self.pos)
    }

    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Advance until the current docid is `>= doc`. Returns the current
    /// item, or `None` if the sequence is exhausted first.
    pub fn seek(&mut self, doc: DocId) -> Option<&'a T> {
        while let Some(item) = self.items.get(self.pos) {
            if item.doc_id() >= doc {
                return Some(item);
            }
            self.pos += 1;
        }
        None
    }
}

/// Sorted-merge intersection over any number of docid-ordered sequences.
///
/// Calls `emit` once per docid present in *every* sequence, passing the
/// matching items in operand order. Exhaustion of any operand terminates
/// the scan — the sequences are ascending, so no further match is possible.
pub(crate) fn intersect<'a, T: HasDocId>(
    lists: &[&'a [T]],
    mut emit: impl FnMut(DocId, &[&'a T]),
) {
    if lists.is_empty() {
        return;
    }
    let mut cursors: Vec<DocCursor<'a, T>> = lists.iter().map(|l| DocCursor::new(l)).collect();
    let mut row: Vec<&'a T> = Vec::with_capacity(lists.len());

    'scan: loop {
        // Candidate is the largest current docid; every other cursor must
        // catch up to it or the candidate moves forward.
        let mut candidate = match cursors[0].current() {
            Some(item) => item.doc_id(),
            None => return,
        };
        loop {
            let mut all_match = true;
            for cursor in &mut cursors {
                match cursor.seek(candidate) {
                    None => break 'scan,
                    Some(item) if item.doc_id() > candidate => {
                        candidate = item.doc_id();
                        all_match = false;
                        break;
                    }
                    Some(_) => {}
                }
            }
            if all_match {
                break;
            }
        }
        row.clear();
        for cursor in &cursors {
            if let Some(item) = cursor.current() {
                row.push(item);
            }
        }
        emit(candidate, &row);
        for cursor in &mut cursors {
            cursor.advance();
        }
    }
}
