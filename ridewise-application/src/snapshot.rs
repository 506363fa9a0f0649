use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One attraction's status in an already-fetched wait-time feed snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideStatus {
    pub name: String,
    pub active: bool,
    pub wait_time: Option<u64>,
}

/// Filters a cached park snapshot down to the rides a plan may use. Closed
/// rides are dropped; an open ride with no reported wait time counts as a
/// walk-on (wait 0).
pub fn active_rides(snapshot: &[RideStatus]) -> IndexMap<String, u64> {
    snapshot
        .iter()
        .filter(|status| status.active)
        .map(|status| (status.name.clone(), status.wait_time.unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn status(name: &str, active: bool, wait_time: Option<u64>) -> RideStatus {
        RideStatus {
            name: name.to_owned(),
            active,
            wait_time,
        }
    }

    #[rstest]
    #[case::closed_rides_are_dropped(
        vec![status("a", true, Some(10)), status("b", false, Some(5))],
        vec![("a", 10)]
    )]
    #[case::unknown_wait_counts_as_walk_on(
        vec![status("a", true, None), status("b", true, Some(25))],
        vec![("a", 0), ("b", 25)]
    )]
    #[case::empty_snapshot(vec![], vec![])]
    fn snapshot_filtering(
        #[case] snapshot: Vec<RideStatus>,
        #[case] expected: Vec<(&str, u64)>,
    ) {
        let rides = active_rides(&snapshot);

        let expected: IndexMap<String, u64> = expected
            .into_iter()
            .map(|(name, wait)| (name.to_owned(), wait))
            .collect();
        assert_eq!(rides, expected);
    }

    #[test]
    fn feed_order_is_preserved() {
        let snapshot = [
            status("z", true, Some(3)),
            status("m", false, None),
            status("a", true, Some(1)),
        ];

        let rides = active_rides(&snapshot);

        let names: Vec<&str> = rides.keys().map(String::as_str).collect();
        assert_eq!(names, ["z", "a"]);
    }
}
