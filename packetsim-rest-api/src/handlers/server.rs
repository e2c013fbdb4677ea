//! Gate control and load balancer health endpoints

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use packetsim_core::ServerHealth;
use tracing::{info, warn};

use crate::{
    context::ServerContext,
    errors::RestResult,
    models::{GateStatusResponse, ReasonQuery},
};

/// `GET /server/health`
pub async fn server_health(State(ctx): State<ServerContext>) -> Json<ServerHealth> {
    Json(ctx.reporter.report())
}

/// `POST /server/open?reason=..`
pub async fn open_server(
    State(ctx): State<ServerContext>,
    query: Result<Query<ReasonQuery>, QueryRejection>,
) -> RestResult<Json<GateStatusResponse>> {
    let Query(query) = query?;
    info!("Request to OPEN server. Reason: {:?}", query.reason);

    ctx.state.gate.open(query.reason);
    Ok(Json(ctx.state.gate.status().into()))
}

/// `POST /server/close?reason=..`
pub async fn close_server(
    State(ctx): State<ServerContext>,
    query: Result<Query<ReasonQuery>, QueryRejection>,
) -> RestResult<Json<GateStatusResponse>> {
    let Query(query) = query?;
    warn!("Request to CLOSE server. Reason: {:?}", query.reason);

    ctx.state.gate.close(query.reason);
    Ok(Json(ctx.state.gate.status().into()))
}

/// `GET /server/status`
pub async fn server_status(State(ctx): State<ServerContext>) -> Json<GateStatusResponse> {
    Json(ctx.state.gate.status().into())
}
