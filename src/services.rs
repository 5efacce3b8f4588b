pub mod acceso;
pub mod auth;
pub mod importacion;
pub mod periodos;
pub mod reportes;
pub mod usuarios;
