//! Title aggregation and statistics.
//!
//! This module computes the dashboard KPIs and frequency tables from an
//! immutable slice of titles. Every function is pure: calling it twice on
//! the same table yields the same result.

use crate::models::{DashboardSummary, FrequencyTable, Title};
use std::collections::{BTreeMap, HashMap};

/// Count titles per non-null `year_added`, ascending by year.
pub fn year_counts(titles: &[Title]) -> FrequencyTable<i32> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();

    for year in titles.iter().filter_map(|t| t.year_added) {
        *counts.entry(year).or_default() += 1;
    }

    FrequencyTable::from_counts(counts)
}

/// Count titles per non-null `month_added`, ascending by month.
pub fn month_counts(titles: &[Title]) -> FrequencyTable<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();

    for month in titles.iter().filter_map(|t| t.month_added) {
        *counts.entry(month).or_default() += 1;
    }

    FrequencyTable::from_counts(counts)
}

/// Year with the most titles added.
///
/// Ties go to the smallest year. `None` when no row has a date.
#[allow(dead_code)] // KPI accessor, summarize() covers the dashboard
pub fn peak_year(titles: &[Title]) -> Option<i32> {
    year_counts(titles).peak().copied()
}

/// Month with the most titles added.
///
/// Ties go to the smallest month. `None` when no row has a date.
#[allow(dead_code)] // KPI accessor, summarize() covers the dashboard
pub fn peak_month(titles: &[Title]) -> Option<u32> {
    month_counts(titles).peak().copied()
}

/// Title of the row with the most characters; the first such row wins ties.
pub fn longest_title(titles: &[Title]) -> Option<String> {
    let mut best: Option<(&Title, usize)> = None;

    for title in titles {
        let Some(length) = title.title_length else {
            continue;
        };
        match best {
            Some((_, longest)) if length <= longest => {}
            _ => best = Some((title, length)),
        }
    }

    best.and_then(|(t, _)| t.title.clone())
}

/// Count every cast member across the table.
///
/// Ordered by descending count; names with equal counts keep the order in
/// which they were first seen.
pub fn actor_frequency(titles: &[Title]) -> FrequencyTable<String> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for name in titles.iter().flat_map(|t| t.cast_members()) {
        match index.get(name.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(name.as_str(), counts.len());
                counts.push((name.clone(), 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    FrequencyTable::from_ordered(counts)
}

/// Most frequent cast member, or `None` when no row has a cast.
#[allow(dead_code)] // KPI accessor, summarize() covers the dashboard
pub fn top_actor(titles: &[Title]) -> Option<String> {
    actor_frequency(titles).peak().cloned()
}

/// Rows whose type equals `kind` and whose `year_added` equals `year`.
///
/// Rows without a `year_added` never match.
pub fn filter_titles<'a>(titles: &'a [Title], kind: &str, year: i32) -> Vec<&'a Title> {
    titles
        .iter()
        .filter(|t| t.kind.as_deref() == Some(kind) && t.year_added == Some(year))
        .collect()
}

/// Compute every dashboard KPI and table in one go.
pub fn summarize(titles: &[Title], top_actors: usize) -> DashboardSummary {
    let year_counts = year_counts(titles);
    let month_counts = month_counts(titles);
    let actors = actor_frequency(titles);

    DashboardSummary {
        total_titles: titles.len(),
        dated_titles: year_counts.total(),
        peak_year: year_counts.peak().copied(),
        peak_month: month_counts.peak().copied(),
        longest_title: longest_title(titles),
        top_actor: actors.peak().cloned(),
        top_actors: actors.top_n(top_actors),
        year_counts,
        month_counts,
    }
}
