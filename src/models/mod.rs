mod channel;
mod livetv;

pub use channel::*;
pub use livetv::*;
