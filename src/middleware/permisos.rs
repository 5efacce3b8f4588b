// src/middleware/permisos.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::auth::Usuario,
    services::acceso::Permiso,
};

/// 1. El trait que define qué permiso exige un endpoint
pub trait PermisoDef: Send + Sync + 'static {
    fn permiso() -> Permiso;
}

/// 2. El extractor (guardián). La verificación es pertenencia al mapa
/// estático rol → permisos, sin tocar la base de datos.
pub struct RequierePermiso<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequierePermiso<T>
where
    T: PermisoDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let usuario = parts.extensions.get::<Usuario>().ok_or(AppError::TokenInvalido)?;

        let requerido = T::permiso();
        if !usuario.rol.tiene_permiso(requerido) {
            return Err(AppError::PermisoDenegado(requerido.slug()));
        }

        Ok(RequierePermiso(PhantomData))
    }
}

// ---
// DEFINICIÓN DE LOS PERMISOS (TIPOS)
// ---

pub struct PermGestionarUsuarios;
impl PermisoDef for PermGestionarUsuarios {
    fn permiso() -> Permiso {
        Permiso::GestionarUsuarios
    }
}

pub struct PermImportarCartera;
impl PermisoDef for PermImportarCartera {
    fn permiso() -> Permiso {
        Permiso::ImportarCartera
    }
}

pub struct PermExportarCartera;
impl PermisoDef for PermExportarCartera {
    fn permiso() -> Permiso {
        Permiso::ExportarCartera
    }
}

pub struct PermVerReportes;
impl PermisoDef for PermVerReportes {
    fn permiso() -> Permiso {
        Permiso::VerReportes
    }
}

pub struct PermRegistrarGestiones;
impl PermisoDef for PermRegistrarGestiones {
    fn permiso() -> Permiso {
        Permiso::RegistrarGestiones
    }
}
