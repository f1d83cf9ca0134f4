//! Axum route handlers for the Aggregation View.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::dataset::aggregation::{
    compute_job_title_aggregates, sort_job_title_aggregates, sort_year_aggregates,
    JobTitleAggregate, JobTitleSortKey, SortOrder, YearAggregate, YearSortKey,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct YearSortQuery {
    pub sort: Option<YearSortKey>,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Deserialize)]
pub struct JobTitleSortQuery {
    pub sort: Option<JobTitleSortKey>,
    #[serde(default)]
    pub order: SortOrder,
}

/// GET /api/years
///
/// Year aggregates precomputed at load, ascending by year unless `sort` is given.
pub async fn handle_year_aggregates(
    State(state): State<AppState>,
    Query(query): Query<YearSortQuery>,
) -> Json<Vec<YearAggregate>> {
    let mut aggregates = state.dataset.year_aggregates().to_vec();
    if let Some(key) = query.sort {
        sort_year_aggregates(&mut aggregates, key, query.order);
    }
    Json(aggregates)
}

/// GET /api/years/:year/jobs
///
/// Job-title counts for one year. A year with no records yields an empty list.
pub async fn handle_job_title_aggregates(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<JobTitleSortQuery>,
) -> Json<Vec<JobTitleAggregate>> {
    let mut aggregates = compute_job_title_aggregates(state.dataset.records(), Some(year));
    if let Some(key) = query.sort {
        sort_job_title_aggregates(&mut aggregates, key, query.order);
    }
    Json(aggregates)
}
