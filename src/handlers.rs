pub mod auth;
pub mod cartera;
pub mod gestiones;
pub mod reportes;
pub mod usuarios;
