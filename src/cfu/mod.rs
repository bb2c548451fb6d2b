pub mod convert;
pub mod parsing;
pub mod scdl;
pub mod tables;

pub use convert::{convert_cfu, Conversion, ConversionStats};
pub use scdl::{map_to_scdl, ScdlRecord};
