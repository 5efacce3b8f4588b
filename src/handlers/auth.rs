use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AuthResponse, CambiarContrasenaPayload, LoginPayload, Usuario},
};

// Handler de login
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, usuario) =
        app_state.auth_service.login(&payload.email, &payload.password).await?;

    Ok(Json(AuthResponse { token, usuario }))
}

// Handler de la ruta protegida /me
pub async fn get_me(AuthenticatedUser(usuario): AuthenticatedUser) -> Json<Usuario> {
    Json(usuario)
}

// Cambio de contraseña del propio usuario
pub async fn cambiar_contrasena(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Json(payload): Json<CambiarContrasenaPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .usuario_service
        .cambiar_contrasena(&usuario, &payload.contrasena_actual, &payload.contrasena_nueva)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
