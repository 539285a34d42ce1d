//! Generic partitioning of candidates by key.
//!
//! # Overview
//!
//! Every stage of the resolution pipeline has the same shape: compute a key
//! for each item, gather items with equal keys, and hand each multi-member
//! gathering to the next stage. [`process_dups`] is that shape, independent
//! of what the key is or what the next stage does.
//!
//! - Items whose key is unique never reach `proc`.
//! - Gathering is a stable sort, so items keep their input order inside a
//!   group.
//! - An input of exactly two items compares the two keys directly.
//!
//! [`keyed_par`] computes keys on a rayon pool, for keys that cost I/O;
//! [`process_keyed`] then groups the precomputed pairs. [`for_each_dup`] and
//! [`for_each_keyed`] are the same partitioning for stages that record their
//! results elsewhere.
//!
//! # Example
//!
//! ```
//! use rustdedup::duplicates::process_dups;
//!
//! let words = vec!["apple", "bob", "avocado", "bee", "cat"];
//! let groups: Vec<Vec<&str>> = process_dups(
//!     words,
//!     |w| Ok::<_, ()>(w.chars().next()),
//!     |group| Ok(vec![group]),
//! )
//! .unwrap();
//!
//! assert_eq!(groups, vec![vec!["apple", "avocado"], vec!["bob", "bee"]]);
//! ```

use rayon::prelude::*;
use rayon::ThreadPool;

/// Partition `items` by `by`, run `proc` on every group of two or more, and
/// concatenate the results in key order.
///
/// # Errors
///
/// The first error returned by `by` or `proc` is returned unchanged; no
/// further keys are computed and no further groups are processed.
pub fn process_dups<T, K, R, E, B, P>(items: Vec<T>, mut by: B, proc: P) -> Result<Vec<R>, E>
where
    K: Ord,
    B: FnMut(&T) -> Result<K, E>,
    P: FnMut(Vec<T>) -> Result<Vec<R>, E>,
{
    if items.len() < 2 {
        return Ok(Vec::new());
    }
    let keyed = items
        .into_iter()
        .map(|item| by(&item).map(|key| (key, item)))
        .collect::<Result<Vec<_>, E>>()?;
    process_keyed(keyed, proc)
}

/// Like [`process_dups`], for keys that were already computed.
///
/// # Errors
///
/// The first error returned by `proc`.
pub fn process_keyed<T, K, R, E, P>(keyed: Vec<(K, T)>, mut proc: P) -> Result<Vec<R>, E>
where
    K: Ord,
    P: FnMut(Vec<T>) -> Result<Vec<R>, E>,
{
    let mut results = Vec::new();
    for_each_keyed(keyed, |group| {
        results.extend(proc(group)?);
        Ok(())
    })?;
    Ok(results)
}

/// Partition `items` by `by` and hand every group of two or more to
/// `visit`, for stages that only have side effects.
///
/// Work already done by `visit` is not undone when a later group fails.
///
/// # Errors
///
/// The first error returned by `by` or `visit`.
pub fn for_each_dup<T, K, E, B, V>(items: Vec<T>, mut by: B, visit: V) -> Result<(), E>
where
    K: Ord,
    B: FnMut(&T) -> Result<K, E>,
    V: FnMut(Vec<T>) -> Result<(), E>,
{
    if items.len() < 2 {
        return Ok(());
    }
    let keyed = items
        .into_iter()
        .map(|item| by(&item).map(|key| (key, item)))
        .collect::<Result<Vec<_>, E>>()?;
    for_each_keyed(keyed, visit)
}

/// Like [`for_each_dup`], for keys that were already computed.
///
/// # Errors
///
/// The first error returned by `visit`.
pub fn for_each_keyed<T, K, E, V>(mut keyed: Vec<(K, T)>, mut visit: V) -> Result<(), E>
where
    K: Ord,
    V: FnMut(Vec<T>) -> Result<(), E>,
{
    match keyed.len() {
        0 | 1 => return Ok(()),
        2 => {
            if keyed[0].0 != keyed[1].0 {
                return Ok(());
            }
            return visit(keyed.into_iter().map(|(_, item)| item).collect());
        }
        _ => {}
    }

    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut iter = keyed.into_iter().peekable();
    while let Some((key, first)) = iter.next() {
        let mut group = vec![first];
        while let Some((_, item)) = iter.next_if(|(k, _)| *k == key) {
            group.push(item);
        }
        if group.len() > 1 {
            visit(group)?;
        }
    }
    Ok(())
}

/// Pair every item with its key, computing keys in parallel on `pool`.
///
/// The output preserves input order.
///
/// # Errors
///
/// One of the errors returned by `by`, if any.
pub fn keyed_par<T, K, E, B>(pool: &ThreadPool, items: Vec<T>, by: B) -> Result<Vec<(K, T)>, E>
where
    T: Send,
    K: Send,
    E: Send,
    B: Fn(&T) -> Result<K, E> + Sync,
{
    pool.install(|| {
        items
            .into_par_iter()
            .map(|item| by(&item).map(|key| (key, item)))
            .collect()
    })
}
