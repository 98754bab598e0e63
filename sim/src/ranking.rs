//! Stable top-down merge sort used for health-priority display order.

use crate::components::{Agent, AgentId};
use std::cmp::Ordering;

/// Sort `items` in place by `compare`, keeping equal items in input order.
///
/// Classic top-down merge sort over a scratch buffer; runs of length one or
/// less are already sorted. The merge takes from the left run whenever the
/// heads compare equal, which is what makes it stable.
pub fn merge_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return;
    }
    let mut scratch = items.to_vec();
    sort_run(items, &mut scratch, &mut compare);
}

fn sort_run<T, F>(items: &mut [T], scratch: &mut [T], compare: &mut F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len <= 1 {
        return;
    }
    let mid = len / 2;
    {
        let (left, right) = items.split_at_mut(mid);
        let (scratch_left, scratch_right) = scratch.split_at_mut(mid);
        sort_run(left, scratch_left, compare);
        sort_run(right, scratch_right, compare);
    }

    scratch[..len].copy_from_slice(items);
    let (left, right) = scratch[..len].split_at(mid);
    let (mut i, mut j) = (0, 0);
    for slot in items.iter_mut() {
        let take_left = j >= right.len()
            || (i < left.len() && compare(&left[i], &right[j]) != Ordering::Greater);
        if take_left {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

/// Ids of `agents[begin..end]` ordered by ascending health.
///
/// Agents with equal health keep their store order. Pure: no agent state is
/// touched. `begin..end` is clamped to the slice.
pub fn sort_by_health(agents: &[Agent], begin: usize, end: usize) -> Vec<AgentId> {
    let end = end.min(agents.len());
    let begin = begin.min(end);
    let mut ids: Vec<AgentId> = (begin..end).map(|i| AgentId(i as u32)).collect();
    merge_sort_by(&mut ids, |a, b| {
        agents[a.index()].health.cmp(&agents[b.index()].health)
    });
    ids
}
