mod routes;
mod startup;
mod utils;

pub use routes::*;
pub use startup::*;
pub use utils::*;
