use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Visitor preferences as collected at the boundary, before normalization.
///
/// `Budget` is the shape of the time budget: a single scalar when ride costs
/// are constant, one entry per time period when they vary.
///
/// An empty ride list and an absent one mean the same thing ("no
/// preference"), as do a zero and an absent count bound; [`Self::normalized`]
/// merges the two spellings so the planners never see a spurious constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RidePreferences<Budget = u64> {
    /// Rides that must be ridden at least once in total.
    pub required_rides: Option<Vec<String>>,
    /// Rides that must not be ridden at all.
    pub avoid_rides: Option<Vec<String>>,
    /// Minimum number of distinct rides with a positive total count.
    pub min_distinct_rides: Option<u32>,
    /// Maximum total count for any single ride.
    pub max_ride_repeats: Option<u32>,
    /// Time budget for the maximize-rides objective.
    pub max_time: Option<Budget>,
    /// Floor on the sum of all ride counts, for the minimize-time objective.
    pub min_total_rides: Option<u32>,
}

impl<Budget> RidePreferences<Budget> {
    /// Canonicalizes "empty" to "not set" and produces the immutable
    /// [`PreferenceSet`] the planners consume.
    pub fn normalized(self) -> PreferenceSet<Budget> {
        PreferenceSet {
            required_rides: self.required_rides.and_then(non_empty_set),
            avoid_rides: self.avoid_rides.and_then(non_empty_set),
            min_distinct_rides: self.min_distinct_rides.filter(|&count| count > 0),
            max_ride_repeats: self.max_ride_repeats.filter(|&count| count > 0),
            max_time: self.max_time,
            min_total_rides: self.min_total_rides,
        }
    }
}

fn non_empty_set(rides: Vec<String>) -> Option<FxHashSet<String>> {
    if rides.is_empty() {
        None
    } else {
        Some(rides.into_iter().collect())
    }
}

/// Normalized visitor preferences. Immutable; built via
/// [`RidePreferences::normalized`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceSet<Budget = u64> {
    required_rides: Option<FxHashSet<String>>,
    avoid_rides: Option<FxHashSet<String>>,
    min_distinct_rides: Option<u32>,
    max_ride_repeats: Option<u32>,
    max_time: Option<Budget>,
    min_total_rides: Option<u32>,
}

impl<Budget> PreferenceSet<Budget> {
    pub fn required_rides(&self) -> Option<&FxHashSet<String>> {
        self.required_rides.as_ref()
    }

    pub fn avoid_rides(&self) -> Option<&FxHashSet<String>> {
        self.avoid_rides.as_ref()
    }

    pub fn min_distinct_rides(&self) -> Option<u32> {
        self.min_distinct_rides
    }

    pub fn max_ride_repeats(&self) -> Option<u32> {
        self.max_ride_repeats
    }

    pub fn max_time(&self) -> Option<&Budget> {
        self.max_time.as_ref()
    }

    pub fn min_total_rides(&self) -> Option<u32> {
        self.min_total_rides
    }

    /// Whether `ride` must be ridden at least once.
    pub fn requires(&self, ride: &str) -> bool {
        self.required_rides
            .as_ref()
            .is_some_and(|rides| rides.contains(ride))
    }

    /// Whether `ride` must not be ridden at all.
    pub fn avoids(&self, ride: &str) -> bool {
        self.avoid_rides
            .as_ref()
            .is_some_and(|rides| rides.contains(ride))
    }

    /// Whether a ride is both required and avoided. Total: `false` whenever
    /// either side is unset.
    pub fn has_require_avoid_conflict(&self) -> bool {
        match (&self.required_rides, &self.avoid_rides) {
            (Some(required), Some(avoided)) => required.iter().any(|ride| avoided.contains(ride)),
            _ => false,
        }
    }
}
