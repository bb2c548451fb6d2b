pub mod cfu;

// Re-exports
pub use cfu::convert::{convert_cfu, Conversion, ConversionStats, DEFAULT_DELIMITER};
pub use cfu::parsing::header::Header;
pub use cfu::parsing::lines::{LineReader, RawRecord};
pub use cfu::scdl::ScdlRecord;
