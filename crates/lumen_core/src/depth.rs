//! Paint-order helpers.
//!
//! A parent's children are painted first to last, so the last entry is the
//! one on top.

/// Moves `item` to the top of `order`.
///
/// Returns false if `item` is not a child of this parent.
pub fn bring_to_front<T: PartialEq>(order: &mut Vec<T>, item: &T) -> bool {
    let Some(index) = order.iter().position(|c| c == item) else {
        return false;
    };
    if index + 1 != order.len() {
        let child = order.remove(index);
        order.push(child);
    }
    true
}

/// Returns true if `item` is painted last.
#[must_use]
pub fn is_front<T: PartialEq>(order: &[T], item: &T) -> bool {
    order.last() == Some(item)
}
