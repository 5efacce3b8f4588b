// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Los cuatro roles del sistema. El alcance de filas y el mapa de permisos
// viven en services::acceso; aquí solo la representación persistida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    Admin,
    Supervisor,
    Comercial,
    Consulta,
}

// Representa un usuario tal como viene de la base de datos
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // nunca sale en las respuestas
    pub password_hash: String,

    pub nombre_completo: String,
    pub rol: Rol,

    // Clave de visibilidad por filas para comercial/consulta
    pub vendedor_asignado: Option<String>,

    pub activo: bool,
    pub ultimo_acceso: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Datos para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "El correo proporcionado es inválido."))]
    pub email: String,
    #[validate(length(min = 8, message = "La contraseña debe tener mínimo 8 caracteres."))]
    pub password: String,
}

// Respuesta de autenticación con el token y el usuario
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub usuario: Usuario,
}

// Estructura de datos ("claims") dentro del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID del usuario
    pub exp: usize, // cuándo expira el token
    pub iat: usize, // cuándo fue emitido
}

// Alta de usuario (acción de administrador)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrearUsuarioPayload {
    #[validate(email(message = "El correo proporcionado es inválido."))]
    pub email: String,
    #[validate(length(min = 8, message = "La contraseña debe tener mínimo 8 caracteres."))]
    pub password: String,
    #[validate(length(min = 2, message = "El nombre debe tener mínimo 2 caracteres."))]
    pub nombre_completo: String,
    pub rol: Rol,
    pub vendedor_asignado: Option<String>,
}

// Edición de usuario. Los campos ausentes no se tocan.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarUsuarioPayload {
    #[validate(length(min = 2, message = "El nombre debe tener mínimo 2 caracteres."))]
    pub nombre_completo: Option<String>,
    pub rol: Option<Rol>,
    pub vendedor_asignado: Option<String>,
    pub activo: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CambiarContrasenaPayload {
    pub contrasena_actual: String,
    #[validate(length(min = 8, message = "La contraseña debe tener mínimo 8 caracteres."))]
    pub contrasena_nueva: String,
}
