//! Aggregation View: per-year salary statistics and per-year job-title counts.
//!
//! Everything here is a pure function of the record slice. Sorting is a
//! presentation concern layered on top via `sort_*`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::salary::SalaryRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearAggregate {
    pub year: i32,
    pub total_jobs: usize,
    pub total_salaries: f64,
    pub average_salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTitleAggregate {
    pub job_title: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearSortKey {
    Year,
    TotalJobs,
    AverageSalary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobTitleSortKey {
    JobTitle,
    Count,
}

/// Groups records by `work_year`. One entry per distinct year, ascending.
pub fn compute_year_aggregates(records: &[SalaryRecord]) -> Vec<YearAggregate> {
    let mut by_year: BTreeMap<i32, (usize, f64)> = BTreeMap::new();

    for record in records {
        let (count, total) = by_year.entry(record.work_year).or_insert((0, 0.0));
        *count += 1;
        *total += record.salary_in_usd;
    }

    by_year
        .into_iter()
        .map(|(year, (total_jobs, total_salaries))| YearAggregate {
            year,
            total_jobs,
            total_salaries,
            average_salary: average(total_salaries, total_jobs),
        })
        .collect()
}

/// Counts job titles within `year`, in first-seen order.
/// No selected year, or no records for it, yields an empty list.
pub fn compute_job_title_aggregates(
    records: &[SalaryRecord],
    year: Option<i32>,
) -> Vec<JobTitleAggregate> {
    let Some(year) = year else {
        return Vec::new();
    };

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut aggregates: Vec<JobTitleAggregate> = Vec::new();

    for record in records.iter().filter(|r| r.work_year == year) {
        match positions.get(record.job_title.as_str()) {
            Some(&idx) => aggregates[idx].count += 1,
            None => {
                positions.insert(record.job_title.as_str(), aggregates.len());
                aggregates.push(JobTitleAggregate {
                    job_title: record.job_title.clone(),
                    count: 1,
                });
            }
        }
    }

    aggregates
}

pub fn sort_year_aggregates(aggregates: &mut [YearAggregate], key: YearSortKey, order: SortOrder) {
    aggregates.sort_by(|a, b| {
        let ordering = match key {
            YearSortKey::Year => a.year.cmp(&b.year),
            YearSortKey::TotalJobs => a.total_jobs.cmp(&b.total_jobs),
            YearSortKey::AverageSalary => a.average_salary.total_cmp(&b.average_salary),
        };
        apply_order(ordering, order)
    });
}

pub fn sort_job_title_aggregates(
    aggregates: &mut [JobTitleAggregate],
    key: JobTitleSortKey,
    order: SortOrder,
) {
    aggregates.sort_by(|a, b| {
        let ordering = match key {
            JobTitleSortKey::JobTitle => a.job_title.cmp(&b.job_title),
            JobTitleSortKey::Count => a.count.cmp(&b.count),
        };
        apply_order(ordering, order)
    });
}

fn apply_order(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
