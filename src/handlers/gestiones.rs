// src/handlers/gestiones.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        permisos::{PermRegistrarGestiones, RequierePermiso},
    },
    models::gestion::{CrearGestionPayload, Gestion},
    services::{acceso::AlcanceCartera, periodos::resolver_periodo},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct GestionQuery {
    #[param(example = "Mes Actual")]
    pub periodo: Option<String>,
    #[param(value_type = Option<String>)]
    pub desde: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub hasta: Option<NaiveDate>,
    pub nit: Option<String>,
}

// POST /api/gestiones
#[utoipa::path(
    post,
    path = "/api/gestiones",
    tag = "Gestiones",
    request_body = CrearGestionPayload,
    responses(
        (status = 201, description = "Gestión registrada", body = Gestion),
        (status = 400, description = "Datos inválidos"),
        (status = 404, description = "Cliente fuera del alcance del usuario")
    ),
    security(("api_jwt" = []))
)]
pub async fn crear_gestion(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    _perm: RequierePermiso<PermRegistrarGestiones>,
    Json(payload): Json<CrearGestionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // Un comercial solo registra gestiones sobre clientes de su vendedor.
    match AlcanceCartera::del_usuario(&usuario) {
        AlcanceCartera::Total => {}
        AlcanceCartera::Vendedor(vendedor) => {
            let cliente = app_state
                .cliente_repo
                .buscar_por_nit(payload.nit.trim())
                .await?
                .ok_or(AppError::ClienteNoEncontrado)?;
            if cliente.vendedor.as_deref() != Some(vendedor.as_str()) {
                return Err(AppError::ClienteNoEncontrado);
            }
        }
        AlcanceCartera::Ninguno => return Err(AppError::ClienteNoEncontrado),
    }

    let hoy = Utc::now().date_naive();
    let gestion = app_state
        .gestion_repo
        .crear(&payload, usuario.id, &usuario.email, hoy)
        .await?;

    Ok((StatusCode::CREATED, Json(gestion)))
}

// GET /api/gestiones
#[utoipa::path(
    get,
    path = "/api/gestiones",
    tag = "Gestiones",
    params(GestionQuery),
    responses(
        (status = 200, description = "Gestiones del período, acotadas al alcance del usuario", body = Vec<Gestion>)
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_gestiones(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Query(query): Query<GestionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let hoy = Utc::now().date_naive();
    let (desde, hasta) = resolver_periodo(
        query.periodo.as_deref().unwrap_or("Mes Actual"),
        hoy,
        query.desde,
        query.hasta,
    );

    let alcance = AlcanceCartera::del_usuario(&usuario);
    let gestiones = app_state
        .gestion_repo
        .listar(&alcance, desde, hasta, query.nit.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(gestiones)))
}
