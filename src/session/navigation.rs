/// Step `current` by `delta` through a list of `len` entries, wrapping at both ends.
pub(super) fn wrap_index(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_index_steps_within_bounds() {
        assert_eq!(wrap_index(0, 3, 1), 1);
        assert_eq!(wrap_index(2, 3, -1), 1);
    }

    #[test]
    fn wrap_index_wraps_both_ends() {
        assert_eq!(wrap_index(2, 3, 1), 0);
        assert_eq!(wrap_index(0, 3, -1), 2);
    }

    #[test]
    fn wrap_index_handles_empty() {
        assert_eq!(wrap_index(0, 0, 1), 0);
        assert_eq!(wrap_index(0, 0, -1), 0);
    }
}
