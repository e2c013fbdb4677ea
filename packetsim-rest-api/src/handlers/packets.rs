//! Fake packet endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use packetsim_core::{PacketRequest, PacketResult, PacketStatus};
use packetsim_web::RequestId;
use tracing::{debug, warn};

use crate::{context::PacketsContext, errors::RestResult};

/// `POST /fakePacket`
///
/// Every parsed request gets a `PacketResult`; the status code tells
/// callers which branch it took: 200 on success, 503 when the gate is
/// closed or the worker is shutting down, 500 when the workload failed.
/// Bodies that do not parse are answered with a 400 error envelope instead.
pub async fn process_fake_packet(
    State(ctx): State<PacketsContext>,
    request_id: RequestId,
    payload: Result<Json<PacketRequest>, JsonRejection>,
) -> RestResult<(StatusCode, Json<PacketResult>)> {
    let Json(request) = payload.inspect_err(|rejection| {
        warn!(
            "Malformed fakePacket request {}: {}",
            request_id,
            rejection.body_text()
        );
    })?;

    let result = ctx.service.process(request).await;
    debug!(
        "Request {} carried packet {} -> {:?}",
        request_id, result.packet_id, result.status
    );
    Ok((status_for(result.status), Json(result)))
}

fn status_for(status: PacketStatus) -> StatusCode {
    match status {
        PacketStatus::Success => StatusCode::OK,
        PacketStatus::Rejected => StatusCode::SERVICE_UNAVAILABLE,
        PacketStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
