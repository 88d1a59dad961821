/*++

Licensed under the Apache-2.0 license.

File Name:

    wait.rs

Abstract:

    File contains common functions to implement wait routines.

--*/

/// Polls `predicate` until it returns true or the poll budget is spent.
/// Returns whether the predicate was observed true.
pub fn until_or_timeout<F>(mut predicate: F, max_polls: u32) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..max_polls {
        if predicate() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_polls() {
        let mut calls = 0;
        assert!(until_or_timeout(
            || {
                calls += 1;
                calls == 3
            },
            5
        ));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_budget_expiry() {
        let mut calls = 0;
        assert!(!until_or_timeout(
            || {
                calls += 1;
                false
            },
            4
        ));
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_zero_budget_never_polls() {
        assert!(!until_or_timeout(|| panic!("must not poll"), 0));
    }
}
