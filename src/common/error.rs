use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
// Todos los errores son terminales para la acción en curso: se convierten
// en un mensaje para el usuario y no hay reintentos automáticos.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("El correo ya existe")]
    CorreoYaExiste,

    #[error("Dominio de correo no permitido: {0}")]
    DominioNoPermitido(String),

    #[error("Contraseña débil: {0}")]
    ContrasenaDebil(&'static str),

    #[error("Credenciales inválidas")]
    CredencialesInvalidas,

    #[error("Token inválido")]
    TokenInvalido,

    #[error("Usuario inactivo")]
    UsuarioInactivo,

    #[error("Usuario no encontrado")]
    UsuarioNoEncontrado,

    #[error("Cliente no encontrado")]
    ClienteNoEncontrado,

    #[error("Permiso denegado: se requiere '{0}'")]
    PermisoDenegado(&'static str),

    #[error("No se puede eliminar el último administrador activo")]
    UltimoAdministrador,

    #[error("Importación inválida: {0}")]
    ImportacionInvalida(String),

    // Variante para errores de base de datos (sqlx)
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para cualquier otro error inesperado
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devuelve todos los detalles de la validación, campo por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::CorreoYaExiste => {
                (StatusCode::CONFLICT, "Este correo ya está en uso.".to_string())
            }
            AppError::DominioNoPermitido(dominio) => (
                StatusCode::BAD_REQUEST,
                format!("Solo se permiten correos del dominio @{}.", dominio),
            ),
            AppError::ContrasenaDebil(motivo) => (
                StatusCode::BAD_REQUEST,
                format!("La contraseña es muy débil: {}.", motivo),
            ),
            AppError::CredencialesInvalidas => (
                StatusCode::UNAUTHORIZED,
                "Correo o contraseña inválidos.".to_string(),
            ),
            AppError::TokenInvalido => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticación inválido o ausente.".to_string(),
            ),
            AppError::UsuarioInactivo => (
                StatusCode::FORBIDDEN,
                "El usuario está desactivado.".to_string(),
            ),
            AppError::UsuarioNoEncontrado => {
                (StatusCode::NOT_FOUND, "Usuario no encontrado.".to_string())
            }
            AppError::ClienteNoEncontrado => {
                (StatusCode::NOT_FOUND, "Cliente no encontrado.".to_string())
            }
            AppError::PermisoDenegado(permiso) => (
                StatusCode::FORBIDDEN,
                format!("Necesita el permiso '{}' para realizar esta acción.", permiso),
            ),
            AppError::UltimoAdministrador => (
                StatusCode::CONFLICT,
                "No se puede eliminar el último administrador activo.".to_string(),
            ),
            AppError::ImportacionInvalida(motivo) => (
                StatusCode::BAD_REQUEST,
                format!("El archivo no se pudo importar: {}.", motivo),
            ),

            // Todos los demás errores (DatabaseError, InternalServerError) son 500.
            // El `tracing` deja la traza detallada que `thiserror` nos da.
            ref e => {
                tracing::error!("Error interno del servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.".to_string(),
                )
            }
        };

        // Respuesta estándar para errores simples con un solo mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
