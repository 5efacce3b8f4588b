pub mod auth;
pub mod permisos;
