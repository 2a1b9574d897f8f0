pub mod property;
pub mod search;
pub mod zip;

pub use property::*;
pub use search::*;
pub use zip::*;
