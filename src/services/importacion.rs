// src/services/importacion.rs
//
// Importación del archivo de cartera. El archivo reemplaza la foto actual
// completa (borrar todo y reinsertar) y upserta clientes y vendedores;
// todo ocurre dentro de una sola transacción: un archivo malo hace rollback
// y deja la cartera anterior intacta.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{CarteraRepository, ClienteRepository},
    models::{cartera::FilaImportada, reportes::ResultadoImportacion},
};

// Campos que sabemos mapear desde los encabezados del archivo. Columnas no
// reconocidas se ignoran; columnas esperadas ausentes se toleran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Columna {
    Nit,
    RazonSocial,
    Factura,
    Valor,
    FechaFactura,
    FechaVencimiento,
    CondicionPago,
    DiasVencidos,
    Vendedor,
    CentroOperacion,
    Telefono,
    Celular,
    Direccion,
    Email,
    Ciudad,
    Cupo,
}

// Normaliza un encabezado: minúsculas, sin tildes, sin puntos ni espacios
// repetidos. "C.O." y "centro operación" terminan en la misma llave.
fn normalizar_encabezado(encabezado: &str) -> String {
    let mut limpio = String::with_capacity(encabezado.len());
    for c in encabezado.trim().chars() {
        let c = match c {
            'á' | 'Á' => 'a',
            'é' | 'É' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'Ó' => 'o',
            'ú' | 'Ú' | 'ü' | 'Ü' => 'u',
            'ñ' | 'Ñ' => 'n',
            '.' | '\u{feff}' => continue,
            c => c,
        };
        limpio.extend(c.to_lowercase());
    }
    limpio.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn reconocer_columna(encabezado: &str) -> Option<Columna> {
    match normalizar_encabezado(encabezado).as_str() {
        "nit" | "identificacion" | "numero identificacion" => Some(Columna::Nit),
        "razon social" | "cliente" | "nombre cliente" => Some(Columna::RazonSocial),
        "factura" | "numero factura" | "no factura" | "documento" => Some(Columna::Factura),
        "valor" | "saldo" | "valor factura" | "saldo factura" => Some(Columna::Valor),
        "fecha factura" | "fecha emision" | "fecha" => Some(Columna::FechaFactura),
        "fecha vencimiento" | "vencimiento" | "vence" => Some(Columna::FechaVencimiento),
        "condicion pago" | "condicion" | "plazo" => Some(Columna::CondicionPago),
        "dias vencidos" | "dias vencido" | "dias mora" => Some(Columna::DiasVencidos),
        "vendedor" | "nombre vendedor" => Some(Columna::Vendedor),
        "co" | "centro operacion" | "centro de operacion" => Some(Columna::CentroOperacion),
        "telefono" => Some(Columna::Telefono),
        "celular" => Some(Columna::Celular),
        "direccion" => Some(Columna::Direccion),
        "email" | "correo" | "correo electronico" => Some(Columna::Email),
        "ciudad" => Some(Columna::Ciudad),
        "cupo" | "estado cupo" => Some(Columna::Cupo),
        _ => None,
    }
}

// Acepta los formatos de fecha que traen los archivos reales.
fn parsear_fecha(texto: &str) -> Option<NaiveDate> {
    let texto = texto.trim();
    for formato in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"] {
        if let Ok(fecha) = NaiveDate::parse_from_str(texto, formato) {
            return Some(fecha);
        }
    }
    None
}

// Valores monetarios en formato local: "$ 1.234.567,89" → 1234567.89.
// Con punto y coma presentes, el punto es separador de miles; un solo punto
// sin coma se interpreta como separador decimal.
fn parsear_valor(texto: &str) -> f64 {
    let limpio: String =
        texto.chars().filter(|c| !c.is_whitespace() && *c != '$').collect();
    if limpio.is_empty() {
        return 0.0;
    }

    let normalizado = if limpio.contains(',') {
        limpio.replace('.', "").replace(',', ".")
    } else if limpio.matches('.').count() > 1 {
        limpio.replace('.', "")
    } else {
        limpio
    };

    normalizado.parse::<f64>().unwrap_or(0.0)
}

fn parsear_cupo(texto: &str) -> Option<bool> {
    match normalizar_encabezado(texto).as_str() {
        "si" | "activo" | "1" | "true" => Some(true),
        "no" | "bloqueado" | "inactivo" | "0" | "false" => Some(false),
        _ => None,
    }
}

fn celda_no_vacia(texto: &str) -> Option<String> {
    let texto = texto.trim();
    if texto.is_empty() { None } else { Some(texto.to_string()) }
}

// Interpreta el contenido completo del archivo. Filas sin NIT o sin número
// de factura se descartan (mapeo de mejor esfuerzo, no un error).
pub fn parsear_cartera_csv(contenido: &str, hoy: NaiveDate) -> Result<Vec<FilaImportada>, AppError> {
    let mut lector = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contenido.as_bytes());

    let encabezados = lector
        .headers()
        .map_err(|e| AppError::ImportacionInvalida(format!("encabezados ilegibles ({})", e)))?
        .clone();

    let columnas: Vec<Option<Columna>> =
        encabezados.iter().map(reconocer_columna).collect();
    if !columnas.iter().any(|c| matches!(c, Some(Columna::Nit))) {
        return Err(AppError::ImportacionInvalida(
            "no se encontró la columna NIT".to_string(),
        ));
    }

    let mut filas = Vec::new();
    for (num, registro) in lector.records().enumerate() {
        let registro = registro.map_err(|e| {
            AppError::ImportacionInvalida(format!("fila {} ilegible ({})", num + 2, e))
        })?;

        let mut fila = FilaImportada::default();
        let mut dias_explicitos = false;

        for (indice, celda) in registro.iter().enumerate() {
            let Some(Some(columna)) = columnas.get(indice) else { continue };
            match columna {
                Columna::Nit => fila.nit = celda.trim().to_string(),
                Columna::RazonSocial => fila.razon_social = celda.trim().to_string(),
                Columna::Factura => fila.factura = celda.trim().to_string(),
                Columna::Valor => fila.valor = parsear_valor(celda),
                Columna::FechaFactura => fila.fecha_factura = parsear_fecha(celda),
                Columna::FechaVencimiento => fila.fecha_vencimiento = parsear_fecha(celda),
                Columna::CondicionPago => fila.condicion_pago = celda_no_vacia(celda),
                Columna::DiasVencidos => {
                    if let Ok(dias) = celda.trim().parse::<i64>() {
                        fila.dias_vencidos = dias;
                        dias_explicitos = true;
                    }
                }
                Columna::Vendedor => fila.vendedor = celda_no_vacia(celda),
                Columna::CentroOperacion => fila.centro_operacion = celda_no_vacia(celda),
                Columna::Telefono => fila.telefono = celda_no_vacia(celda),
                Columna::Celular => fila.celular = celda_no_vacia(celda),
                Columna::Direccion => fila.direccion = celda_no_vacia(celda),
                Columna::Email => fila.email = celda_no_vacia(celda),
                Columna::Ciudad => fila.ciudad = celda_no_vacia(celda),
                Columna::Cupo => fila.cupo_activo = parsear_cupo(celda),
            }
        }

        if fila.nit.is_empty() || fila.factura.is_empty() {
            continue;
        }

        // dias_vencidos viene denormalizado del archivo; si falta, se deriva
        // de la fecha de vencimiento.
        if !dias_explicitos {
            if let Some(vencimiento) = fila.fecha_vencimiento {
                fila.dias_vencidos = (hoy - vencimiento).num_days();
            }
        }

        filas.push(fila);
    }

    Ok(filas)
}

#[derive(Clone)]
pub struct ImportacionService {
    pool: SqlitePool,
    cartera_repo: CarteraRepository,
    cliente_repo: ClienteRepository,
}

impl ImportacionService {
    pub fn new(
        pool: SqlitePool,
        cartera_repo: CarteraRepository,
        cliente_repo: ClienteRepository,
    ) -> Self {
        Self { pool, cartera_repo, cliente_repo }
    }

    pub async fn importar_cartera(
        &self,
        contenido: &str,
        hoy: NaiveDate,
    ) -> Result<ResultadoImportacion, AppError> {
        // Se interpreta el archivo completo antes de tocar la base de datos.
        let filas = parsear_cartera_csv(contenido, hoy)?;
        if filas.is_empty() {
            return Err(AppError::ImportacionInvalida(
                "el archivo no contiene filas con NIT y factura".to_string(),
            ));
        }

        let ahora = Utc::now();
        let mut tx = self.pool.begin().await?;

        let facturas_insertadas =
            self.cartera_repo.reemplazar_actual(&mut *tx, &filas, ahora).await?;

        // Un upsert por cliente y por vendedor, no por factura.
        let mut nits_vistos: HashSet<&str> = HashSet::new();
        let mut vendedores_vistos: HashSet<&str> = HashSet::new();
        for fila in &filas {
            if nits_vistos.insert(fila.nit.as_str()) {
                self.cliente_repo.upsert_desde_importacion(&mut *tx, fila, ahora).await?;
            }
            if let Some(vendedor) = fila.vendedor.as_deref() {
                if vendedores_vistos.insert(vendedor) {
                    self.cliente_repo.upsert_vendedor(&mut *tx, vendedor).await?;
                }
            }
        }

        self.cartera_repo.registrar_historico(&mut *tx, &filas, hoy).await?;

        tx.commit().await?;

        let clientes_actualizados = nits_vistos.len();
        let vendedores_actualizados = vendedores_vistos.len();
        tracing::info!(
            "📥 Cartera importada: {} facturas, {} clientes",
            facturas_insertadas,
            clientes_actualizados
        );

        Ok(ResultadoImportacion {
            mensaje: format!(
                "Se importaron {} facturas de {} clientes.",
                facturas_insertadas, clientes_actualizados
            ),
            facturas_insertadas,
            clientes_actualizados,
            vendedores_actualizados,
            fecha_corte: hoy,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use super::*;
    use crate::services::acceso::AlcanceCartera;

    fn hoy() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("fecha válida")
    }

    #[test]
    fn mapea_encabezados_con_tildes_y_puntos() {
        assert_eq!(reconocer_columna("Razón Social"), Some(Columna::RazonSocial));
        assert_eq!(reconocer_columna("  DÍAS VENCIDOS "), Some(Columna::DiasVencidos));
        assert_eq!(reconocer_columna("C.O."), Some(Columna::CentroOperacion));
        assert_eq!(reconocer_columna("Columna Rara"), None);
    }

    #[test]
    fn parsea_valores_en_formato_local() {
        assert_eq!(parsear_valor("$ 1.234.567,89"), 1234567.89);
        assert_eq!(parsear_valor("1.234.567"), 1234567.0);
        assert_eq!(parsear_valor("1234.56"), 1234.56);
        assert_eq!(parsear_valor("no-numerico"), 0.0);
        assert_eq!(parsear_valor(""), 0.0);
    }

    #[test]
    fn parsea_fechas_en_varios_formatos() {
        let esperada = NaiveDate::from_ymd_opt(2025, 3, 9);
        assert_eq!(parsear_fecha("2025-03-09"), esperada);
        assert_eq!(parsear_fecha("09/03/2025"), esperada);
        assert_eq!(parsear_fecha("09-03-2025"), esperada);
        assert_eq!(parsear_fecha("marzo 9"), None);
    }

    #[test]
    fn tolera_columnas_desconocidas_y_filas_incompletas() {
        let csv = "NIT,Razón Social,Factura,Valor,Columna Rara,Vendedor\n\
                   900100200,Papeles del Norte,F-001,\"1.500.000\",dato,Juan Pérez\n\
                   ,Sin Nit,F-002,100,x,Ana\n\
                   900100201,Sin Factura,,100,x,Ana\n";
        let filas = parsear_cartera_csv(csv, hoy()).expect("archivo válido");
        assert_eq!(filas.len(), 1);
        assert_eq!(filas[0].nit, "900100200");
        assert_eq!(filas[0].valor, 1_500_000.0);
        assert_eq!(filas[0].vendedor.as_deref(), Some("Juan Pérez"));
    }

    #[test]
    fn deriva_dias_vencidos_de_la_fecha_de_vencimiento() {
        let csv = "NIT,Factura,Valor,Fecha Vencimiento\n\
                   900100200,F-001,100,2025-06-05\n\
                   900100200,F-002,100,2025-06-25\n";
        let filas = parsear_cartera_csv(csv, hoy()).expect("archivo válido");
        assert_eq!(filas[0].dias_vencidos, 10);
        assert_eq!(filas[1].dias_vencidos, -10);
    }

    #[test]
    fn sin_columna_nit_es_error() {
        let csv = "Cualquier Cosa,Factura\n1,2\n";
        assert!(matches!(
            parsear_cartera_csv(csv, hoy()),
            Err(AppError::ImportacionInvalida(_))
        ));
    }

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

    fn servicio(pool: &SqlitePool) -> ImportacionService {
        ImportacionService::new(
            pool.clone(),
            CarteraRepository::new(pool.clone()),
            ClienteRepository::new(pool.clone()),
        )
    }

    // Semántica de reemplazo: tras importar A y luego B, solo quedan las
    // filas de B, nunca la unión.
    #[tokio::test]
    async fn importar_reemplaza_la_foto_completa() {
        let pool = pool_pruebas().await;
        let servicio = servicio(&pool);
        let cartera = CarteraRepository::new(pool.clone());

        let archivo_a = "NIT,Razón Social,Factura,Valor,Días Vencidos,Vendedor\n\
                         900100200,Papeles del Norte,A-1,100,5,Juan Pérez\n\
                         900100201,Cartones Andinos,A-2,200,0,Ana Gómez\n";
        let archivo_b = "NIT,Razón Social,Factura,Valor,Días Vencidos,Vendedor\n\
                         900100202,Impresos del Sur,B-1,300,45,Juan Pérez\n";

        let resultado = servicio.importar_cartera(archivo_a, hoy()).await.expect("importa A");
        assert_eq!(resultado.facturas_insertadas, 2);
        assert_eq!(resultado.clientes_actualizados, 2);

        servicio.importar_cartera(archivo_b, hoy()).await.expect("importa B");

        let facturas =
            cartera.listar_actual(&AlcanceCartera::Total, false).await.expect("listado");
        assert_eq!(facturas.len(), 1);
        assert_eq!(facturas[0].factura, "B-1");

        // los clientes de A sobreviven como dimensión, la cartera no
        let clientes = ClienteRepository::new(pool.clone())
            .listar(&AlcanceCartera::Total)
            .await
            .expect("clientes");
        assert_eq!(clientes.len(), 3);
    }

    // Un archivo malo no puede dejar la cartera vacía: el rollback de la
    // transacción conserva la foto anterior.
    #[tokio::test]
    async fn un_archivo_invalido_no_borra_la_cartera() {
        let pool = pool_pruebas().await;
        let servicio = servicio(&pool);
        let cartera = CarteraRepository::new(pool.clone());

        let archivo_a = "NIT,Factura,Valor\n900100200,A-1,100\n";
        servicio.importar_cartera(archivo_a, hoy()).await.expect("importa A");

        let sin_nit = "Columna,Factura\n1,2\n";
        assert!(servicio.importar_cartera(sin_nit, hoy()).await.is_err());

        let vacio = "NIT,Factura,Valor\n";
        assert!(servicio.importar_cartera(vacio, hoy()).await.is_err());

        let facturas =
            cartera.listar_actual(&AlcanceCartera::Total, false).await.expect("listado");
        assert_eq!(facturas.len(), 1);
    }

    // El histórico diario se upserta por (fecha, nit, factura): reimportar
    // el mismo día no duplica la serie.
    #[tokio::test]
    async fn reimportar_el_mismo_dia_no_duplica_el_historico_diario() {
        let pool = pool_pruebas().await;
        let servicio = servicio(&pool);

        let archivo = "NIT,Factura,Valor,Días Vencidos\n900100200,A-1,100,5\n";
        servicio.importar_cartera(archivo, hoy()).await.expect("primera importación");
        let archivo = "NIT,Factura,Valor,Días Vencidos\n900100200,A-1,150,5\n";
        servicio.importar_cartera(archivo, hoy()).await.expect("segunda importación");

        let (filas, valor): (i64, f64) = sqlx::query_as::<_, (i64, f64)>(
            "SELECT COUNT(*), COALESCE(SUM(valor), 0.0) FROM cartera_historico_diario",
        )
        .fetch_one(&pool)
        .await
        .expect("conteo");
        assert_eq!(filas, 1);
        assert_eq!(valor, 150.0);

        // el histórico plano sí es append-only
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cartera_historico")
                .fetch_one(&pool)
                .await
                .expect("conteo");
        assert_eq!(total, 2);
    }
}
