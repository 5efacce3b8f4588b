// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UsuarioRepository,
    models::auth::{Claims, Usuario},
};

#[derive(Clone)]
pub struct AuthService {
    usuario_repo: UsuarioRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(usuario_repo: UsuarioRepository, jwt_secret: String) -> Self {
        Self { usuario_repo, jwt_secret }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(String, Usuario), AppError> {
        let usuario = self
            .usuario_repo
            .buscar_por_email(email)
            .await?
            .ok_or(AppError::CredencialesInvalidas)?;

        if !usuario.activo {
            return Err(AppError::UsuarioInactivo);
        }

        let password_clone = password.to_owned();
        let hash_clone = usuario.password_hash.clone();

        // La verificación de bcrypt es costosa: va a un hilo aparte
        let contrasena_valida =
            tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falla en la tarea de verificación: {}", e))??;

        if !contrasena_valida {
            return Err(AppError::CredencialesInvalidas);
        }

        self.usuario_repo.marcar_acceso(usuario.id, Utc::now()).await?;

        let token = self.crear_token(usuario.id)?;
        Ok((token, usuario))
    }

    pub async fn validar_token(&self, token: &str) -> Result<Usuario, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::TokenInvalido)?;

        let usuario = self
            .usuario_repo
            .buscar_por_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UsuarioNoEncontrado)?;

        if !usuario.activo {
            return Err(AppError::UsuarioInactivo);
        }

        Ok(usuario)
    }

    fn crear_token(&self, usuario_id: Uuid) -> Result<String, AppError> {
        let ahora = Utc::now();
        let expira = ahora + chrono::Duration::days(7);

        let claims = Claims {
            sub: usuario_id,
            exp: expira.timestamp() as usize,
            iat: ahora.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
