pub mod eodhd;
pub mod fred;
pub mod util;

pub use eodhd::EodhdProvider;
pub use fred::FredProvider;
