mod conversation;
mod paper;
mod recommendation;
mod search;
mod session;

pub use conversation::*;
pub use paper::*;
pub use recommendation::*;
pub use search::*;
pub use session::*;
