// src/db/usuario_repo.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Rol, Usuario},
};

// El repositorio de usuarios, responsable de toda interacción con la tabla
// 'usuarios'.
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: SqlitePool,
}

impl UsuarioRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn buscar_por_email(&self, email: &str) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            SELECT id, email, password_hash, nombre_completo, rol, vendedor_asignado,
                   activo, ultimo_acceso, created_at, updated_at
            FROM usuarios
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(usuario)
    }

    pub async fn buscar_por_id(&self, id: Uuid) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            SELECT id, email, password_hash, nombre_completo, rol, vendedor_asignado,
                   activo, ultimo_acceso, created_at, updated_at
            FROM usuarios
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(usuario)
    }

    pub async fn listar(&self) -> Result<Vec<Usuario>, AppError> {
        let usuarios = sqlx::query_as::<_, Usuario>(
            r#"
            SELECT id, email, password_hash, nombre_completo, rol, vendedor_asignado,
                   activo, ultimo_acceso, created_at, updated_at
            FROM usuarios
            ORDER BY email ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(usuarios)
    }

    // Crea un usuario nuevo. El correo duplicado se traduce a un error propio.
    pub async fn crear(
        &self,
        email: &str,
        password_hash: &str,
        nombre_completo: &str,
        rol: Rol,
        vendedor_asignado: Option<&str>,
    ) -> Result<Usuario, AppError> {
        let id = Uuid::new_v4();
        let ahora = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO usuarios (
                id, email, password_hash, nombre_completo, rol,
                vendedor_asignado, activo, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(nombre_completo)
        .bind(rol)
        .bind(vendedor_asignado)
        .bind(ahora)
        .bind(ahora)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::CorreoYaExiste;
                }
            }
            e.into()
        })?;

        self.buscar_por_id(id).await?.ok_or(AppError::UsuarioNoEncontrado)
    }

    // Persiste un usuario ya editado en memoria (el servicio hace el merge).
    pub async fn guardar(&self, usuario: &Usuario) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE usuarios
            SET nombre_completo = ?, rol = ?, vendedor_asignado = ?, activo = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&usuario.nombre_completo)
        .bind(usuario.rol)
        .bind(&usuario.vendedor_asignado)
        .bind(usuario.activo)
        .bind(Utc::now())
        .bind(usuario.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn actualizar_contrasena(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE usuarios SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn eliminar(&self, id: Uuid) -> Result<(), AppError> {
        let resultado = sqlx::query("DELETE FROM usuarios WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if resultado.rows_affected() == 0 {
            return Err(AppError::UsuarioNoEncontrado);
        }
        Ok(())
    }

    pub async fn marcar_acceso(&self, id: Uuid, momento: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE usuarios SET ultimo_acceso = ? WHERE id = ?")
            .bind(momento)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn contar_usuarios(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn contar_admins_activos(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM usuarios WHERE rol = 'admin' AND activo = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
