pub mod decompression;
pub mod human_format;
pub mod url;

pub use decompression::{CompressionFormat, DecompressionService};
pub use human_format::{format_duration, format_response_time};
pub use url::{AddressFamily, UrlUtils};
