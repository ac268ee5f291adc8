mod debounce;
mod domains;
mod error;
mod search;
mod terminal;
mod utils;
mod viewport;

pub use debounce::*;
pub use domains::*;
pub use error::*;
pub use search::*;
pub use terminal::*;
pub use utils::*;
pub use viewport::*;
