use std::collections::BTreeSet;
use std::fmt;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter dimensions – one enum each, one explicit "no restriction" variant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YearFilter {
    All,
    Only(i32),
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => write!(f, "ALL"),
            YearFilter::Only(y) => write!(f, "{y}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DayTypeFilter {
    #[default]
    All,
    WorkingDay,
    NonWorkingDay,
}

impl DayTypeFilter {
    pub const OPTIONS: [DayTypeFilter; 3] = [
        DayTypeFilter::All,
        DayTypeFilter::WorkingDay,
        DayTypeFilter::NonWorkingDay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DayTypeFilter::All => "All",
            DayTypeFilter::WorkingDay => "Working Day",
            DayTypeFilter::NonWorkingDay => "Non-working Day",
        }
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – the full user selection
// ---------------------------------------------------------------------------

/// A user's filter selection. Applying it never touches the dataset; every
/// application yields a fresh [`FilteredView`].
///
/// An empty `seasons` set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub year: YearFilter,
    pub day_type: DayTypeFilter,
    pub seasons: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria that keep every record of `dataset`.
    pub fn unrestricted(dataset: &Dataset) -> Self {
        Self {
            year: YearFilter::All,
            day_type: DayTypeFilter::All,
            seasons: dataset.seasons().iter().cloned().collect(),
        }
    }

    /// Initial dashboard selection: the most recent year, every day type and
    /// every season.
    pub fn initial(dataset: &Dataset) -> Self {
        Self {
            year: dataset
                .years()
                .last()
                .copied()
                .map_or(YearFilter::All, YearFilter::Only),
            ..Self::unrestricted(dataset)
        }
    }

    /// The three independent predicates, in no particular order.
    pub fn predicates(&self) -> [RecordPredicate<'_>; 3] {
        [
            RecordPredicate::Year(self.year),
            RecordPredicate::DayType(self.day_type),
            RecordPredicate::Season(&self.seasons),
        ]
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.predicates().iter().all(|p| p.matches(record))
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "year={} day_type={} seasons={:?}",
            self.year,
            self.day_type.label(),
            self.seasons
        )
    }
}

/// A single filter dimension applied to one record.
#[derive(Debug, Clone, Copy)]
pub enum RecordPredicate<'a> {
    Year(YearFilter),
    DayType(DayTypeFilter),
    Season(&'a BTreeSet<String>),
}

impl RecordPredicate<'_> {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RecordPredicate::Year(YearFilter::All) => true,
            RecordPredicate::Year(YearFilter::Only(y)) => record.year == *y,
            RecordPredicate::DayType(DayTypeFilter::All) => true,
            RecordPredicate::DayType(DayTypeFilter::WorkingDay) => record.working_day,
            RecordPredicate::DayType(DayTypeFilter::NonWorkingDay) => !record.working_day,
            RecordPredicate::Season(seasons) => seasons.contains(&record.season),
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView – borrowed subset of the dataset
// ---------------------------------------------------------------------------

/// Rows of a [`Dataset`] that passed a filter, kept as indices in dataset
/// order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

/// Two views are equal when they select the same rows of the same dataset.
impl PartialEq for FilteredView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dataset, other.dataset) && self.indices == other.indices
    }
}

impl<'a> FilteredView<'a> {
    /// Every record, unfiltered.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn apply(dataset: &'a Dataset, criteria: &FilterCriteria) -> Self {
        Self {
            dataset,
            indices: filtered_indices(dataset, criteria),
        }
    }

    /// Narrow this view further by `criteria`.
    pub fn refine(&self, criteria: &FilterCriteria) -> Self {
        self.retain(|r| criteria.matches(r))
    }

    /// Narrow this view by a single predicate.
    pub fn restrict(&self, predicate: &RecordPredicate<'_>) -> Self {
        self.retain(|r| predicate.matches(r))
    }

    fn retain(&self, keep: impl Fn(&Record) -> bool) -> Self {
        let records = self.dataset.records();
        Self {
            dataset: self.dataset,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| keep(&records[i]))
                .collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Smallest and largest rental count in the view.
    pub fn count_range(&self) -> Option<(f64, f64)> {
        self.records().map(|r| r.count).fold(None, |acc, c| match acc {
            None => Some((c, c)),
            Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
        })
    }
}

/// Return indices of records that pass every predicate of `criteria`.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.seasons.is_empty() {
        return Vec::new();
    }
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Apply predicates one after another, in the given order.
pub fn apply_predicates<'a>(
    dataset: &'a Dataset,
    predicates: &[RecordPredicate<'_>],
) -> FilteredView<'a> {
    predicates
        .iter()
        .fold(FilteredView::all(dataset), |view, p| view.restrict(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{criteria_strategy, sample_dataset};
    use proptest::prelude::*;

    fn seasons(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_years_keeps_every_row() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            year: YearFilter::All,
            ..FilterCriteria::unrestricted(&ds)
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert_eq!(view.len(), ds.len());
        let years: BTreeSet<i32> = view.records().map(|r| r.year).collect();
        assert_eq!(years, BTreeSet::from([2011, 2012]));
    }

    #[test]
    fn working_day_keeps_only_flagged_rows() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            day_type: DayTypeFilter::WorkingDay,
            ..FilterCriteria::unrestricted(&ds)
        };
        let view = FilteredView::apply(&ds, &criteria);
        let expected = ds.records().iter().filter(|r| r.working_day).count();
        assert_eq!(view.len(), expected);
        assert!(view.records().all(|r| r.working_day));
    }

    #[test]
    fn non_working_day_keeps_only_unflagged_rows() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            day_type: DayTypeFilter::NonWorkingDay,
            ..FilterCriteria::unrestricted(&ds)
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert!(!view.is_empty());
        assert!(view.records().all(|r| !r.working_day));
    }

    #[test]
    fn unrestricted_criteria_is_a_no_op() {
        let ds = sample_dataset();
        let view = FilteredView::apply(&ds, &FilterCriteria::unrestricted(&ds));
        assert_eq!(view, FilteredView::all(&ds));
    }

    #[test]
    fn empty_season_set_matches_nothing() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            seasons: BTreeSet::new(),
            ..FilterCriteria::unrestricted(&ds)
        };
        assert!(FilteredView::apply(&ds, &criteria).is_empty());
    }

    #[test]
    fn single_year_and_season() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            year: YearFilter::Only(2012),
            day_type: DayTypeFilter::All,
            seasons: seasons(&["Summer"]),
        };
        let view = FilteredView::apply(&ds, &criteria);
        assert_eq!(view.len(), 7 * 24);
        assert!(view.records().all(|r| r.year == 2012 && r.season == "Summer"));
    }

    #[test]
    fn unknown_year_yields_empty_view() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            year: YearFilter::Only(1999),
            ..FilterCriteria::unrestricted(&ds)
        };
        assert!(FilteredView::apply(&ds, &criteria).is_empty());
        assert_eq!(FilteredView::apply(&ds, &criteria).count_range(), None);
    }

    #[test]
    fn initial_selection_is_latest_year() {
        let ds = sample_dataset();
        let initial = FilterCriteria::initial(&ds);
        assert_eq!(initial.year, YearFilter::Only(2012));
        assert_eq!(initial.day_type, DayTypeFilter::All);
        assert_eq!(initial.seasons.len(), 4);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(YearFilter::All.to_string(), "ALL");
        assert_eq!(YearFilter::Only(2011).to_string(), "2011");
        assert_eq!(DayTypeFilter::NonWorkingDay.label(), "Non-working Day");
    }

    const PERMUTATIONS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    proptest! {
        #[test]
        fn filtering_is_idempotent(criteria in criteria_strategy()) {
            let ds = sample_dataset();
            let once = FilteredView::apply(&ds, &criteria);
            let twice = once.refine(&criteria);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn predicate_order_does_not_matter(criteria in criteria_strategy()) {
            let ds = sample_dataset();
            let expected = FilteredView::apply(&ds, &criteria);
            let preds = criteria.predicates();
            for order in PERMUTATIONS {
                let ordered: Vec<RecordPredicate<'_>> = order.iter().map(|&i| preds[i]).collect();
                prop_assert_eq!(&apply_predicates(&ds, &ordered), &expected);
            }
        }
    }
}
