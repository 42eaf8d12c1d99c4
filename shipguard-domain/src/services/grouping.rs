use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::utils::minutes_between;

/// A run of items that fell inside one window, measured from `first`.
#[derive(Debug)]
pub struct WindowGroup<'a, T> {
    pub first: &'a T,
    pub members: Vec<&'a T>,
}

impl<'a, T> WindowGroup<'a, T> {
    fn open(item: &'a T) -> Self {
        Self {
            first: item,
            members: vec![item],
        }
    }
}

/// Groups consecutive items whose time lies within `window_minutes` of the
/// current group's first item and that `same_kind` accepts. Any other item
/// opens a new group. An item whose time (or whose group anchor's time)
/// cannot be read is left out.
pub fn group_within_window<'a, T, F, C>(
    items: &'a [T],
    window_minutes: f64,
    time_of: F,
    same_kind: C,
) -> Vec<WindowGroup<'a, T>>
where
    F: Fn(&T) -> Option<DateTime<FixedOffset>>,
    C: Fn(&T, &T) -> bool,
{
    let mut groups = Vec::new();
    let Some((head, rest)) = items.split_first() else {
        return groups;
    };

    let mut current = WindowGroup::open(head);
    for item in rest {
        let (Some(anchor), Some(at)) = (time_of(current.first), time_of(item)) else {
            debug!("skipping item with unreadable timestamp while grouping");
            continue;
        };
        if minutes_between(&at, &anchor) <= window_minutes && same_kind(current.first, item) {
            current.members.push(item);
        } else {
            groups.push(std::mem::replace(&mut current, WindowGroup::open(item)));
        }
    }
    groups.push(current);
    groups
}
