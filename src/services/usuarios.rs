// src/services/usuarios.rs
//
// Administración de usuarios: altas, edición, borrado y cambio de
// contraseña. Solo los administradores llegan aquí (ver middleware::permisos),
// salvo el cambio de contraseña propio.

use bcrypt::{hash, verify};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UsuarioRepository,
    models::auth::{ActualizarUsuarioPayload, CrearUsuarioPayload, Rol, Usuario},
};

// Política mínima de contraseñas del sistema.
pub fn validar_contrasena(contrasena: &str) -> Result<(), AppError> {
    if contrasena.chars().count() < 8 {
        return Err(AppError::ContrasenaDebil("debe tener mínimo 8 caracteres"));
    }
    if !contrasena.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::ContrasenaDebil("debe incluir al menos un número"));
    }
    if !contrasena.chars().any(|c| c.is_alphabetic()) {
        return Err(AppError::ContrasenaDebil("debe incluir al menos una letra"));
    }
    Ok(())
}

// Solo se aceptan correos del dominio de la empresa.
pub fn dominio_permitido(email: &str, dominio: &str) -> bool {
    match email.rsplit_once('@') {
        Some((_, d)) => d.eq_ignore_ascii_case(dominio),
        None => false,
    }
}

#[derive(Clone)]
pub struct UsuarioService {
    repo: UsuarioRepository,
    dominio_correo: String,
}

impl UsuarioService {
    pub fn new(repo: UsuarioRepository, dominio_correo: String) -> Self {
        Self { repo, dominio_correo }
    }

    pub async fn listar(&self) -> Result<Vec<Usuario>, AppError> {
        self.repo.listar().await
    }

    pub async fn crear(&self, payload: &CrearUsuarioPayload) -> Result<Usuario, AppError> {
        if !dominio_permitido(&payload.email, &self.dominio_correo) {
            return Err(AppError::DominioNoPermitido(self.dominio_correo.clone()));
        }
        validar_contrasena(&payload.password)?;

        let password_clone = payload.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falla en la tarea de hashing: {}", e))??;

        let vendedor = payload
            .vendedor_asignado
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());

        self.repo
            .crear(
                payload.email.trim(),
                &password_hash,
                payload.nombre_completo.trim(),
                payload.rol,
                vendedor,
            )
            .await
    }

    pub async fn actualizar(
        &self,
        id: Uuid,
        payload: &ActualizarUsuarioPayload,
    ) -> Result<Usuario, AppError> {
        let mut usuario =
            self.repo.buscar_por_id(id).await?.ok_or(AppError::UsuarioNoEncontrado)?;

        if let Some(nombre) = &payload.nombre_completo {
            usuario.nombre_completo = nombre.trim().to_string();
        }
        if let Some(rol) = payload.rol {
            usuario.rol = rol;
        }
        if let Some(vendedor) = &payload.vendedor_asignado {
            // cadena vacía = quitar la asignación
            let vendedor = vendedor.trim();
            usuario.vendedor_asignado =
                if vendedor.is_empty() { None } else { Some(vendedor.to_string()) };
        }
        if let Some(activo) = payload.activo {
            usuario.activo = activo;
        }

        self.repo.guardar(&usuario).await?;
        self.repo.buscar_por_id(id).await?.ok_or(AppError::UsuarioNoEncontrado)
    }

    // Borrado explícito de administrador. Nunca puede quedar el sistema sin
    // un administrador activo.
    pub async fn eliminar(&self, id: Uuid) -> Result<(), AppError> {
        let objetivo = self.repo.buscar_por_id(id).await?.ok_or(AppError::UsuarioNoEncontrado)?;

        if objetivo.rol == Rol::Admin
            && objetivo.activo
            && self.repo.contar_admins_activos().await? <= 1
        {
            return Err(AppError::UltimoAdministrador);
        }

        self.repo.eliminar(id).await
    }

    pub async fn cambiar_contrasena(
        &self,
        usuario: &Usuario,
        contrasena_actual: &str,
        contrasena_nueva: &str,
    ) -> Result<(), AppError> {
        let actual_clone = contrasena_actual.to_owned();
        let hash_clone = usuario.password_hash.clone();
        let coincide = tokio::task::spawn_blocking(move || verify(&actual_clone, &hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falla en la tarea de verificación: {}", e))??;

        if !coincide {
            return Err(AppError::CredencialesInvalidas);
        }

        validar_contrasena(contrasena_nueva)?;

        let nueva_clone = contrasena_nueva.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&nueva_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falla en la tarea de hashing: {}", e))??;

        self.repo.actualizar_contrasena(usuario.id, &password_hash).await
    }

    // Siembra el primer administrador cuando la tabla está vacía.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<bool, AppError> {
        if self.repo.contar_usuarios().await? > 0 {
            return Ok(false);
        }

        let payload = CrearUsuarioPayload {
            email: email.to_string(),
            password: password.to_string(),
            nombre_completo: "Administrador".to_string(),
            rol: Rol::Admin,
            vendedor_asignado: None,
        };
        self.crear(&payload).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sqlx::{
        SqlitePool,
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    };

    use super::*;

    async fn pool_pruebas() -> SqlitePool {
        let opciones =
            SqliteConnectOptions::from_str("sqlite::memory:").expect("opciones válidas");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opciones)
            .await
            .expect("pool en memoria");
        sqlx::migrate!().run(&pool).await.expect("migraciones");
        pool
    }

    fn servicio(pool: &SqlitePool) -> UsuarioService {
        UsuarioService::new(
            UsuarioRepository::new(pool.clone()),
            "papelandina.com.co".to_string(),
        )
    }

    fn alta(email: &str, rol: Rol) -> CrearUsuarioPayload {
        CrearUsuarioPayload {
            email: email.to_string(),
            password: "Clave123".to_string(),
            nombre_completo: "Usuario de Prueba".to_string(),
            rol,
            vendedor_asignado: None,
        }
    }

    #[tokio::test]
    async fn no_se_elimina_el_ultimo_admin_activo() {
        let pool = pool_pruebas().await;
        let servicio = servicio(&pool);

        let admin =
            servicio.crear(&alta("admin@papelandina.com.co", Rol::Admin)).await.expect("admin");
        let consulta = servicio
            .crear(&alta("consulta@papelandina.com.co", Rol::Consulta))
            .await
            .expect("consulta");

        // con un solo admin activo, el borrado se rechaza
        assert!(matches!(
            servicio.eliminar(admin.id).await,
            Err(AppError::UltimoAdministrador)
        ));

        // un usuario sin rol admin sí se puede borrar
        servicio.eliminar(consulta.id).await.expect("borrado");

        // con un segundo admin activo, el primero ya puede salir
        let otro =
            servicio.crear(&alta("admin2@papelandina.com.co", Rol::Admin)).await.expect("admin2");
        servicio.eliminar(admin.id).await.expect("borrado de admin");
        assert!(matches!(
            servicio.eliminar(otro.id).await,
            Err(AppError::UltimoAdministrador)
        ));
    }

    #[tokio::test]
    async fn el_alta_valida_dominio_y_correo_duplicado() {
        let pool = pool_pruebas().await;
        let servicio = servicio(&pool);

        assert!(matches!(
            servicio.crear(&alta("ana@gmail.com", Rol::Consulta)).await,
            Err(AppError::DominioNoPermitido(_))
        ));

        servicio.crear(&alta("ana@papelandina.com.co", Rol::Consulta)).await.expect("alta");
        assert!(matches!(
            servicio.crear(&alta("ana@papelandina.com.co", Rol::Consulta)).await,
            Err(AppError::CorreoYaExiste)
        ));
    }

    #[test]
    fn politica_de_contrasenas() {
        assert!(validar_contrasena("Clave123").is_ok());
        assert!(matches!(validar_contrasena("corta1"), Err(AppError::ContrasenaDebil(_))));
        assert!(matches!(validar_contrasena("sinnumeros"), Err(AppError::ContrasenaDebil(_))));
        assert!(matches!(validar_contrasena("12345678"), Err(AppError::ContrasenaDebil(_))));
    }

    #[test]
    fn dominio_de_correo() {
        assert!(dominio_permitido("ana@papelandina.com.co", "papelandina.com.co"));
        assert!(dominio_permitido("ana@PAPELANDINA.COM.CO", "papelandina.com.co"));
        assert!(!dominio_permitido("ana@gmail.com", "papelandina.com.co"));
        assert!(!dominio_permitido("sin-arroba", "papelandina.com.co"));
    }
}
