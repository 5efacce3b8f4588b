// src/handlers/reportes.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        permisos::{PermVerReportes, RequierePermiso},
    },
    models::reportes::{AvanceGestion, EdadCartera, PeriodoQuery, ResumenCartera, TendenciaCartera},
    services::{acceso::AlcanceCartera, periodos::resolver_periodo},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct EdadesQuery {
    // true = los ocho rangos finos, false/ausente = los cinco estándar
    pub detalle: Option<bool>,
}

// GET /api/reportes/resumen
#[utoipa::path(
    get,
    path = "/api/reportes/resumen",
    tag = "Reportes",
    responses(
        (status = 200, description = "Tarjetas de resumen de la cartera visible", body = ResumenCartera),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Sin el permiso 'reportes:ver'")
    ),
    security(("api_jwt" = []))
)]
pub async fn resumen(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    _perm: RequierePermiso<PermVerReportes>,
) -> Result<impl IntoResponse, AppError> {
    let alcance = AlcanceCartera::del_usuario(&usuario);
    let resumen = app_state.reporte_service.resumen(&alcance).await?;
    Ok((StatusCode::OK, Json(resumen)))
}

// GET /api/reportes/edades
#[utoipa::path(
    get,
    path = "/api/reportes/edades",
    tag = "Reportes",
    params(EdadesQuery),
    responses(
        (status = 200, description = "Partición de la cartera por días vencidos", body = Vec<EdadCartera>)
    ),
    security(("api_jwt" = []))
)]
pub async fn edades(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    _perm: RequierePermiso<PermVerReportes>,
    Query(query): Query<EdadesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let alcance = AlcanceCartera::del_usuario(&usuario);
    let edades =
        app_state.reporte_service.edades(&alcance, query.detalle.unwrap_or(false)).await?;
    Ok((StatusCode::OK, Json(edades)))
}

// GET /api/reportes/avance
#[utoipa::path(
    get,
    path = "/api/reportes/avance",
    tag = "Reportes",
    params(PeriodoQuery),
    responses(
        (status = 200, description = "Avance de gestión del período", body = AvanceGestion)
    ),
    security(("api_jwt" = []))
)]
pub async fn avance(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    _perm: RequierePermiso<PermVerReportes>,
    Query(query): Query<PeriodoQuery>,
) -> Result<impl IntoResponse, AppError> {
    let hoy = Utc::now().date_naive();
    let (desde, hasta) = resolver_periodo(
        query.periodo.as_deref().unwrap_or("Mes Actual"),
        hoy,
        query.desde,
        query.hasta,
    );

    let alcance = AlcanceCartera::del_usuario(&usuario);
    let avance = app_state.reporte_service.avance(&alcance, desde, hasta).await?;
    Ok((StatusCode::OK, Json(avance)))
}

// GET /api/reportes/tendencia
#[utoipa::path(
    get,
    path = "/api/reportes/tendencia",
    tag = "Reportes",
    params(PeriodoQuery),
    responses(
        (status = 200, description = "Serie diaria de la cartera (histórico diario)", body = Vec<TendenciaCartera>)
    ),
    security(("api_jwt" = []))
)]
pub async fn tendencia(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    _perm: RequierePermiso<PermVerReportes>,
    Query(query): Query<PeriodoQuery>,
) -> Result<impl IntoResponse, AppError> {
    let hoy = Utc::now().date_naive();
    let (desde, hasta) = resolver_periodo(
        query.periodo.as_deref().unwrap_or("Mes Actual"),
        hoy,
        query.desde,
        query.hasta,
    );

    let alcance = AlcanceCartera::del_usuario(&usuario);
    let serie = app_state.reporte_service.tendencia(&alcance, desde, hasta).await?;
    Ok((StatusCode::OK, Json(serie)))
}
