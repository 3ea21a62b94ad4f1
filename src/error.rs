use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[cfg(feature = "csv-source")]
    #[error("csv source error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "geojson-source")]
    #[error("geojson source error: {0}")]
    GeoJson(#[from] geojson::Error),
}
