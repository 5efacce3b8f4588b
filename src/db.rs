pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
pub mod cliente_repo;
pub use cliente_repo::ClienteRepository;
pub mod cartera_repo;
pub use cartera_repo::CarteraRepository;
pub mod gestion_repo;
pub use gestion_repo::GestionRepository;
pub mod reporte_repo;
pub use reporte_repo::ReporteRepository;
