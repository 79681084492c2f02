//! Store / retrieve / delete endpoints

use crate::wire::{split_key, Action, ErrorBody, KvRequest, RetrieveResponse};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct RetrieveQuery {
    key: Option<String>,
}

/// GET /?key=..
///
/// Unknown keys yield an empty value list. A missing or blank `key` is a 400
/// with an empty body.
pub async fn retrieve(
    State(state): State<AppState>,
    Query(query): Query<RetrieveQuery>,
) -> Response {
    let Some(raw_key) = query.key.filter(|k| !k.is_empty()) else {
        debug!("GET without key");
        return StatusCode::BAD_REQUEST.into_response();
    };

    let fields = split_key(&raw_key, &state.key_separator);
    let value = state.store.retrieve(&fields);
    debug!("Retrieved {} value(s) for key {:?}", value.len(), raw_key);

    (StatusCode::OK, Json(RetrieveResponse { key: raw_key, value })).into_response()
}

/// POST /
///
/// Body is parsed by hand so malformed JSON and missing fields get the
/// `{"reason": ..}` body instead of the extractor's default rejection.
pub async fn submit(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match KvRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected POST: {}", e);
            let body = ErrorBody {
                reason: e.to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match (request.action, request.key) {
        (Action::Create, Some(key)) => {
            let fields = split_key(&key, &state.key_separator);
            state.store.store(fields, request.value);
            StatusCode::CREATED.into_response()
        }
        (Action::Create, None) => {
            // parse() never yields a create without a key
            let body = ErrorBody {
                reason: "Missing mandatory field 'key'".to_string(),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        (Action::Delete, _) => {
            let removed_from = state.store.delete(&request.value);
            info!("Deleted {:?} from {} key(s)", request.value, removed_from);
            StatusCode::NO_CONTENT.into_response()
        }
    }
}
