//! Audit record collection.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use clicktrail_audit_types::{AuditRecord, CollectAck, ReceivedRecord, RecordError};
use clicktrail_common_log::timed;
use tracing::debug;

pub fn router() -> Router<AppState> {
    Router::new().route("/audit-log", post(collect))
}

/// Decode one record, stamp it with the receipt time and hand it to the sink.
/// Any body that does not decode, whatever its content type, is `invalid_record`.
async fn collect(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<CollectAck>> {
    let record: AuditRecord = serde_json::from_slice(&body).map_err(RecordError::Decode)?;
    let event_type = record.event_type();
    debug!(event_type = %event_type, user = %record.user_id, "audit record received");

    let received = ReceivedRecord::receive(record);
    timed!("sink_write", state.sink.write(&received).await)?;

    Ok(Json(CollectAck::received(event_type)))
}
