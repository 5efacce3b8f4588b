// src/handlers/usuarios.rs
//
// Administración de usuarios. Todas las rutas exigen el permiso
// 'usuarios:gestionar' (solo administradores).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::permisos::{PermGestionarUsuarios, RequierePermiso},
    models::auth::{ActualizarUsuarioPayload, CrearUsuarioPayload},
};

// GET /api/usuarios
pub async fn listar_usuarios(
    State(app_state): State<AppState>,
    _perm: RequierePermiso<PermGestionarUsuarios>,
) -> Result<impl IntoResponse, AppError> {
    let usuarios = app_state.usuario_service.listar().await?;
    Ok((StatusCode::OK, Json(usuarios)))
}

// POST /api/usuarios
pub async fn crear_usuario(
    State(app_state): State<AppState>,
    _perm: RequierePermiso<PermGestionarUsuarios>,
    Json(payload): Json<CrearUsuarioPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let usuario = app_state.usuario_service.crear(&payload).await?;
    Ok((StatusCode::CREATED, Json(usuario)))
}

// PUT /api/usuarios/{id}
pub async fn actualizar_usuario(
    State(app_state): State<AppState>,
    _perm: RequierePermiso<PermGestionarUsuarios>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActualizarUsuarioPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let usuario = app_state.usuario_service.actualizar(id, &payload).await?;
    Ok((StatusCode::OK, Json(usuario)))
}

// DELETE /api/usuarios/{id}
pub async fn eliminar_usuario(
    State(app_state): State<AppState>,
    _perm: RequierePermiso<PermGestionarUsuarios>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.usuario_service.eliminar(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
