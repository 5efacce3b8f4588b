// src/services/acceso.rs
//
// Reglas de visibilidad por rol y mapa de permisos. Todo es puro: las
// funciones de consulta reciben el alcance como argumento explícito en vez
// de leer un usuario "ambiente".

use crate::models::auth::{Rol, Usuario};

// Capacidades nombradas del sistema. La verificación es pertenencia a un
// conjunto estático por rol, sin efectos secundarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permiso {
    GestionarUsuarios,
    ImportarCartera,
    ExportarCartera,
    VerReportes,
    RegistrarGestiones,
}

impl Permiso {
    pub fn slug(&self) -> &'static str {
        match self {
            Permiso::GestionarUsuarios => "usuarios:gestionar",
            Permiso::ImportarCartera => "cartera:importar",
            Permiso::ExportarCartera => "cartera:exportar",
            Permiso::VerReportes => "reportes:ver",
            Permiso::RegistrarGestiones => "gestiones:registrar",
        }
    }
}

impl Rol {
    pub fn permisos(self) -> &'static [Permiso] {
        use Permiso::*;
        match self {
            Rol::Admin => &[
                GestionarUsuarios,
                ImportarCartera,
                ExportarCartera,
                VerReportes,
                RegistrarGestiones,
            ],
            Rol::Supervisor => &[ImportarCartera, ExportarCartera, VerReportes, RegistrarGestiones],
            Rol::Comercial => &[ExportarCartera, VerReportes, RegistrarGestiones],
            Rol::Consulta => &[VerReportes],
        }
    }

    pub fn tiene_permiso(self, permiso: Permiso) -> bool {
        self.permisos().contains(&permiso)
    }
}

// Qué filas de cartera/clientes puede ver un usuario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlcanceCartera {
    // admin y supervisor: sin restricción
    Total,
    // comercial y consulta: solo las filas de su vendedor asignado
    Vendedor(String),
    // comercial/consulta sin vendedor asignado: cero filas
    Ninguno,
}

impl AlcanceCartera {
    pub fn para(rol: Rol, vendedor_asignado: Option<&str>) -> Self {
        match rol {
            Rol::Admin | Rol::Supervisor => AlcanceCartera::Total,
            Rol::Comercial | Rol::Consulta => match vendedor_asignado {
                Some(v) if !v.trim().is_empty() => AlcanceCartera::Vendedor(v.to_string()),
                _ => AlcanceCartera::Ninguno,
            },
        }
    }

    pub fn del_usuario(usuario: &Usuario) -> Self {
        Self::para(usuario.rol, usuario.vendedor_asignado.as_deref())
    }

    // Un admin/supervisor puede acotar la consulta a un vendedor puntual;
    // para los demás roles el alcance propio siempre gana.
    pub fn restringir(self, vendedor: Option<String>) -> Self {
        match (self, vendedor) {
            (AlcanceCartera::Total, Some(v)) if !v.trim().is_empty() => {
                AlcanceCartera::Vendedor(v)
            }
            (alcance, _) => alcance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_y_supervisor_ven_todo() {
        assert_eq!(AlcanceCartera::para(Rol::Admin, None), AlcanceCartera::Total);
        assert_eq!(
            AlcanceCartera::para(Rol::Supervisor, Some("Juan Pérez")),
            AlcanceCartera::Total
        );
    }

    #[test]
    fn comercial_ve_solo_su_vendedor() {
        assert_eq!(
            AlcanceCartera::para(Rol::Comercial, Some("Juan Pérez")),
            AlcanceCartera::Vendedor("Juan Pérez".to_string())
        );
    }

    // Decisión documentada: sin vendedor asignado el alcance es vacío,
    // nunca "temporalmente todo".
    #[test]
    fn consulta_sin_vendedor_no_ve_filas() {
        assert_eq!(AlcanceCartera::para(Rol::Consulta, None), AlcanceCartera::Ninguno);
        assert_eq!(AlcanceCartera::para(Rol::Comercial, Some("  ")), AlcanceCartera::Ninguno);
    }

    #[test]
    fn restringir_solo_aplica_al_alcance_total() {
        assert_eq!(
            AlcanceCartera::Total.restringir(Some("Ana".into())),
            AlcanceCartera::Vendedor("Ana".to_string())
        );
        assert_eq!(
            AlcanceCartera::Vendedor("Juan".to_string()).restringir(Some("Ana".into())),
            AlcanceCartera::Vendedor("Juan".to_string())
        );
        assert_eq!(AlcanceCartera::Ninguno.restringir(Some("Ana".into())), AlcanceCartera::Ninguno);
    }

    #[test]
    fn mapa_de_permisos_por_rol() {
        assert!(Rol::Admin.tiene_permiso(Permiso::GestionarUsuarios));
        assert!(!Rol::Supervisor.tiene_permiso(Permiso::GestionarUsuarios));
        assert!(Rol::Supervisor.tiene_permiso(Permiso::ImportarCartera));
        assert!(Rol::Comercial.tiene_permiso(Permiso::RegistrarGestiones));
        assert!(!Rol::Consulta.tiene_permiso(Permiso::RegistrarGestiones));
        assert!(Rol::Consulta.tiene_permiso(Permiso::VerReportes));
        assert!(!Rol::Comercial.tiene_permiso(Permiso::ImportarCartera));
    }
}
