//! Time-window message search

use std::cmp::Ordering;

use chat_core::{DomainError, Message};
use chrono::{DateTime, Utc};

/// Most recent first; equal timestamps fall back to the later id
fn most_recent_first(a: &&Message, b: &&Message) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

fn within<'a, I>(messages: I, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&'a Message>
where
    I: IntoIterator<Item = &'a Message>,
{
    messages
        .into_iter()
        .filter(|m| m.is_within(start, end))
        .collect()
}

/// Up to `limit` messages created strictly inside `(start, end)`, most recent first
pub(crate) fn most_recent<'a, I>(
    messages: I,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    limit: usize,
) -> Vec<&'a Message>
where
    I: IntoIterator<Item = &'a Message>,
{
    let mut matched = within(messages, start, end);
    matched.sort_unstable_by(most_recent_first);
    matched.truncate(limit);
    matched
}

/// The `k`-th most recent message (1-based) created strictly inside `(start, end)`
pub(crate) fn kth_most_recent<'a, I>(
    messages: I,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    k: usize,
) -> Result<&'a Message, DomainError>
where
    I: IntoIterator<Item = &'a Message>,
{
    if k == 0 {
        return Err(DomainError::ZeroRank);
    }

    let mut matched = within(messages, start, end);
    if matched.len() < k {
        return Err(DomainError::NotEnoughResults {
            requested: k,
            available: matched.len(),
        });
    }

    let (_, kth, _) = matched.select_nth_unstable_by(k - 1, most_recent_first);
    Ok(*kth)
}
