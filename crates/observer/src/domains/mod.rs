mod conditions;
mod forecast;
mod places;

pub use conditions::*;
pub use forecast::*;
pub use places::*;
