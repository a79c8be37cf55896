use axum::{
    extract::{Query, State},
    Json,
};
use datalab_core::{RecordKind, RecordQuery};
use std::collections::BTreeMap;

use crate::{dto::SearchResponse, error::ApiResult, AppState};

/// `GET /search?q=retail&kind=dataset&type=Text`
///
/// `q` is the free-text query and `kind` narrows the record kind; every
/// other parameter is an exact metadata facet.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<SearchResponse>> {
    let mut query = RecordQuery::new(params.get("q").cloned().unwrap_or_default());

    for (key, value) in &params {
        match key.as_str() {
            "q" => {}
            "kind" => {
                if !value.trim().eq_ignore_ascii_case(datalab_core::ANY_FACET_VALUE) {
                    query = query.with_kind(value.parse::<RecordKind>()?);
                }
            }
            _ => query = query.with_facet(key.as_str(), value.as_str()),
        }
    }

    let records = state.records.records().await?;
    let data = query.apply(&records);
    tracing::debug!(query = %query.text, matched = data.len(), "Searched records");

    Ok(Json(SearchResponse {
        total: data.len(),
        query: query.text,
        data,
    }))
}
