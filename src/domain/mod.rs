mod clock;
mod layout;
mod relative_time;
mod search;
mod types;

pub use clock::*;
pub use layout::*;
pub use relative_time::*;
pub use search::*;
pub use types::*;
