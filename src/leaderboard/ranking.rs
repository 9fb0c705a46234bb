use std::cmp::Ordering;

use super::models::{RankedEntry, UserAggregate};

/// Strict total order over aggregates; `Less` means `a` ranks ahead of `b`.
///
/// Points descending, then correct picks descending, then user id ascending.
/// Percentage never participates.
pub fn compare(a: &UserAggregate, b: &UserAggregate) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.correct_picks.cmp(&a.correct_picks))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Sorts aggregates and assigns ranks 1..=N, one per position
pub fn rank(mut aggregates: Vec<UserAggregate>) -> Vec<RankedEntry> {
    aggregates.sort_by(compare);
    aggregates
        .into_iter()
        .enumerate()
        .map(|(index, aggregate)| RankedEntry {
            rank: index + 1,
            aggregate,
        })
        .collect()
}

/// Rank of a single user without sorting: one plus the number of users strictly ahead
pub fn rank_of<'a, I>(aggregates: I, user_id: &str) -> Option<RankedEntry>
where
    I: IntoIterator<Item = &'a UserAggregate>,
    I::IntoIter: Clone,
{
    let aggregates = aggregates.into_iter();
    let target = aggregates.clone().find(|a| a.user_id == user_id)?;
    let ahead = aggregates
        .filter(|other| compare(other, target) == Ordering::Less)
        .count();

    Some(RankedEntry {
        rank: ahead + 1,
        aggregate: target.clone(),
    })
}
