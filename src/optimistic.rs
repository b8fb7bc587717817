// Optimistic mutation helper.
//
// The UI-facing pattern used across the marketplace: flip local state
// first so the caller sees the change immediately, then run the remote
// call, and undo the flip if the remote side refuses. Callers pass the
// state explicitly so apply/revert/commit never fight over a borrow.

/// Apply `apply` to `state`, then run `commit` against the updated state.
/// On commit failure, run `revert` and return the error unchanged.
pub fn with_optimistic_update<S, T, E>(
    state: &mut S,
    apply: impl FnOnce(&mut S),
    revert: impl FnOnce(&mut S),
    commit: impl FnOnce(&S) -> Result<T, E>,
) -> Result<T, E> {
    apply(state);
    match commit(state) {
        Ok(value) => Ok(value),
        Err(err) => {
            revert(state);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_commit_success_keeps_applied_state() {
        let mut set: HashSet<&str> = HashSet::new();
        let result: Result<usize, &str> = with_optimistic_update(
            &mut set,
            |s| {
                s.insert("P1");
            },
            |s| {
                s.remove("P1");
            },
            |s| Ok(s.len()),
        );
        assert_eq!(result, Ok(1));
        assert!(set.contains("P1"));
    }

    #[test]
    fn test_commit_failure_reverts() {
        let mut set: HashSet<&str> = HashSet::new();
        set.insert("P0");

        let result: Result<(), &str> = with_optimistic_update(
            &mut set,
            |s| {
                s.remove("P0");
            },
            |s| {
                s.insert("P0");
            },
            |_| Err("remote unavailable"),
        );

        assert_eq!(result, Err("remote unavailable"));
        assert!(set.contains("P0"), "failed commit must restore the flip");
    }
}
