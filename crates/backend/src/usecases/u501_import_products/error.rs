use contracts::usecases::u501_import_products::FileSelectionError;
use thiserror::Error;

/// Problems with the uploaded file or the submitted batch.
///
/// Every variant is the caller's fault and is answered with HTTP 400; the
/// message is sent verbatim as `detail`.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No se recibió ningún archivo")]
    MissingFile,

    #[error(transparent)]
    InvalidFile(#[from] FileSelectionError),

    #[error("Error al recibir el archivo: {0}")]
    Upload(String),

    #[error("No se pudo leer el archivo CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("No se pudo leer la planilla: {0}")]
    Spreadsheet(String),

    #[error("Faltan columnas obligatorias: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("El archivo no contiene productos")]
    EmptyFile,

    #[error("No hay productos para importar")]
    EmptyBatch,
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::Spreadsheet(err.to_string())
    }
}
