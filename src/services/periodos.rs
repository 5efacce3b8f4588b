// src/services/periodos.rs
//
// Convierte un período con nombre ("Mes Actual", "Trimestre Actual", ...)
// en un rango concreto [desde, hasta]. Fechas de calendario, sin zonas
// horarias.

use chrono::{Datelike, Duration, NaiveDate};

fn primer_dia_mes(fecha: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(fecha.year(), fecha.month(), 1).unwrap_or(fecha)
}

fn primer_dia_trimestre(fecha: NaiveDate) -> NaiveDate {
    // trimestre = ⌊(mes − 1) / 3⌋
    let mes = (fecha.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(fecha.year(), mes, 1).unwrap_or(fecha)
}

/// Resuelve el nombre de un período a un rango [desde, hasta].
///
/// Un nombre no reconocido equivale a "Mes Actual" (comportamiento
/// documentado, no un error). "Personalizado" usa los límites recibidos;
/// si faltan o vienen invertidos se cae también en "Mes Actual".
pub fn resolver_periodo(
    nombre: &str,
    hoy: NaiveDate,
    desde: Option<NaiveDate>,
    hasta: Option<NaiveDate>,
) -> (NaiveDate, NaiveDate) {
    match nombre {
        "Mes Anterior" => {
            let fin = primer_dia_mes(hoy).pred_opt().unwrap_or(hoy);
            (primer_dia_mes(fin), fin)
        }
        "Últimos 7 días" => (hoy - Duration::days(7), hoy),
        "Últimos 30 días" => (hoy - Duration::days(30), hoy),
        "Trimestre Actual" => (primer_dia_trimestre(hoy), hoy),
        "Personalizado" => match (desde, hasta) {
            (Some(d), Some(h)) if d <= h => (d, h),
            _ => (primer_dia_mes(hoy), hoy),
        },
        // "Mes Actual" y cualquier nombre desconocido
        _ => (primer_dia_mes(hoy), hoy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("fecha válida")
    }

    #[test]
    fn mes_actual() {
        let hoy = f(2025, 6, 15);
        assert_eq!(resolver_periodo("Mes Actual", hoy, None, None), (f(2025, 6, 1), hoy));
    }

    #[test]
    fn mes_anterior_respeta_fin_de_mes() {
        let hoy = f(2025, 3, 10);
        assert_eq!(
            resolver_periodo("Mes Anterior", hoy, None, None),
            (f(2025, 2, 1), f(2025, 2, 28))
        );
        // enero retrocede de año
        let hoy = f(2025, 1, 5);
        assert_eq!(
            resolver_periodo("Mes Anterior", hoy, None, None),
            (f(2024, 12, 1), f(2024, 12, 31))
        );
    }

    #[test]
    fn ultimos_dias() {
        let hoy = f(2025, 6, 15);
        assert_eq!(
            resolver_periodo("Últimos 7 días", hoy, None, None),
            (f(2025, 6, 8), hoy)
        );
        assert_eq!(
            resolver_periodo("Últimos 30 días", hoy, None, None),
            (f(2025, 5, 16), hoy)
        );
    }

    #[test]
    fn trimestre_actual() {
        // mes 8 → trimestre jul-sep
        let hoy = f(2025, 8, 20);
        assert_eq!(
            resolver_periodo("Trimestre Actual", hoy, None, None),
            (f(2025, 7, 1), hoy)
        );
        let hoy = f(2025, 12, 31);
        assert_eq!(
            resolver_periodo("Trimestre Actual", hoy, None, None),
            (f(2025, 10, 1), hoy)
        );
        let hoy = f(2025, 1, 1);
        assert_eq!(
            resolver_periodo("Trimestre Actual", hoy, None, None),
            (f(2025, 1, 1), hoy)
        );
    }

    #[test]
    fn personalizado_usa_limites_validos() {
        let hoy = f(2025, 6, 15);
        assert_eq!(
            resolver_periodo("Personalizado", hoy, Some(f(2025, 4, 1)), Some(f(2025, 4, 30))),
            (f(2025, 4, 1), f(2025, 4, 30))
        );
    }

    #[test]
    fn personalizado_invertido_o_incompleto_cae_en_mes_actual() {
        let hoy = f(2025, 6, 15);
        let esperado = (f(2025, 6, 1), hoy);
        assert_eq!(
            resolver_periodo("Personalizado", hoy, Some(f(2025, 5, 10)), Some(f(2025, 5, 1))),
            esperado
        );
        assert_eq!(resolver_periodo("Personalizado", hoy, Some(f(2025, 5, 10)), None), esperado);
        assert_eq!(resolver_periodo("Personalizado", hoy, None, None), esperado);
    }

    #[test]
    fn nombre_desconocido_equivale_a_mes_actual() {
        let hoy = f(2025, 6, 15);
        assert_eq!(
            resolver_periodo("Semana Pasada", hoy, None, None),
            (f(2025, 6, 1), hoy)
        );
    }
}
