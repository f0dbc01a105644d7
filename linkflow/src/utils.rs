//! Utilities.

use std::iter::IntoIterator;

/// Returns ceiling log2.
pub const fn clog2(value: usize) -> usize {
    if value == 0 {
        0
    } else {
        (::std::mem::size_of::<usize>() * 8) - (value - 1).leading_zeros() as usize
    }
}

/// Returns bit-represented value of an integer, least significant bit first.
pub fn u64_to_bitvec(n: usize, value: u64) -> Vec<bool> {
    (0..n).map(|i| if i >= 64 { false } else { (value & (1 << i)) != 0 }).collect::<Vec<_>>()
}

/// Combines all elements into one String, separated by `sep`. Returns `None` if all elements are `None`.
pub fn join_options<I>(sep: &str, iterable: I) -> Option<String>
where I: IntoIterator<Item = Option<String>> {
    let iterable = iterable.into_iter().flatten().collect::<Vec<_>>();
    if iterable.is_empty() {
        None
    } else {
        Some(iterable.join(sep))
    }
}

/// Priority multiplexer: evaluates to the value of the first arm whose condition holds.
///
/// ### Example
/// ```
/// # use linkflow::select;
/// let (busy, write) = (true, true);
/// let kind = select! {
///     busy => "stall",
///     write => "write",
///     default => "idle",
/// };
/// assert_eq!(kind, "stall");
/// ```
#[macro_export]
macro_rules! select {
    (
        default => $a:expr $(,)?
    ) => {
        $a
    };
    (
        $a:expr => $b:expr,
        $($c:tt)*
    ) => {
        if $a { $b } else { $crate::select!($($c)*) }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clog2_rounds_up() {
        assert_eq!(clog2(1), 0);
        assert_eq!(clog2(2), 1);
        assert_eq!(clog2(10), 4);
        assert_eq!(clog2(16), 4);
        assert_eq!(clog2(17), 5);
    }

    #[test]
    fn select_takes_first_matching_arm() {
        let pick = |a: bool, b: bool| {
            select! {
                a => 1,
                b => 2,
                default => 3,
            }
        };
        assert_eq!(pick(true, true), 1);
        assert_eq!(pick(false, true), 2);
        assert_eq!(pick(false, false), 3);
    }
}
