use crate::types::{CallInfo, FileLocation, Goroutine};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Goroutines sharing an identical location stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Shared location stack, innermost call first
    pub stack: Vec<FileLocation>,

    /// Per-member call information, one entry per stack frame
    pub calls: Vec<Vec<CallInfo>>,
}

impl Group {
    /// Number of goroutines merged into this group
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Order two locations by root, then file path, then line
pub fn compare_location(a: &FileLocation, b: &FileLocation) -> Ordering {
    a.root
        .cmp(&b.root)
        .then_with(|| a.file.cmp(&b.file))
        .then_with(|| a.line.cmp(&b.line))
}

/// Pairwise lexicographic comparison; a strict prefix sorts first
pub fn compare_stack<'a, 'b>(
    a: impl IntoIterator<Item = &'a FileLocation>,
    b: impl IntoIterator<Item = &'b FileLocation>,
) -> Ordering {
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) => match compare_location(x, y) {
                Ordering::Equal => continue,
                other => return other,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        }
    }
}

/// Sort goroutines in place: the entry goroutine first, then by descending
/// blocked duration, ties by ascending ID.
pub fn sort(goroutines: &mut [Goroutine]) {
    goroutines.sort_by(|a, b| {
        b.is_entry()
            .cmp(&a.is_entry())
            .then_with(|| b.duration.cmp(&a.duration))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Merge goroutines whose location stacks are identical.
///
/// Groups come out ordered by [`compare_stack`]; members keep their relative
/// input order.
pub fn group(goroutines: &[Goroutine]) -> Vec<Group> {
    let mut ordered: Vec<&Goroutine> = goroutines.iter().collect();
    ordered.sort_by(|a, b| compare_stack(a.locations(), b.locations()));

    let mut groups: Vec<Group> = Vec::new();
    for goroutine in ordered {
        let calls: Vec<CallInfo> = goroutine
            .call_stack
            .iter()
            .map(|frame| frame.call.clone())
            .collect();
        if let Some(last) = groups.last_mut() {
            if compare_stack(&last.stack, goroutine.locations()) == Ordering::Equal {
                last.calls.push(calls);
                continue;
            }
        }
        groups.push(Group {
            stack: goroutine.locations().cloned().collect(),
            calls: vec![calls],
        });
    }
    groups
}
