pub mod search;
pub mod status;

pub use search::*;
pub use status::*;
