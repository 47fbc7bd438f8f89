use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    #[error("invalid UTM zone: {0} (expected 1-60)")]
    InvalidZone(u8),

    #[error("unsupported WKT: {0}")]
    UnsupportedWkt(String),

    #[error("unsupported projection: {0}")]
    UnsupportedProjection(String),

    #[error("corrupt geometry: {0}")]
    CorruptGeometry(String),
}

pub type Result<T> = std::result::Result<T, Error>;
