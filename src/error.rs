use thiserror::Error;

/// Error type for dive log ingestion and validation.
///
/// The analysis operations themselves cannot fail; everything here is raised
/// while a [`Dive`](crate::models::Dive) or its inputs are being validated.
#[derive(Error, Debug, uniffi::Error)]
#[uniffi(flat_error)]
pub enum DiveLogError {
    #[error("failed to read dive log: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode dive log: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("invalid start date {value:?}: {source}")]
    InvalidStartDate {
        value: String,
        source: chrono::ParseError,
    },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("invalid gas mix: o2 {o2}, he {he}")]
    InvalidGasMix { o2: f64, he: f64 },

    #[error("sample {index} at offset {offset}s precedes previous sample at {previous}s")]
    OutOfOrderSample {
        index: usize,
        previous: u32,
        offset: u32,
    },
}
