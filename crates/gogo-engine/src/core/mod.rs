pub use self::{board::*, coord::*, stone::*};

pub(crate) mod board;
pub(crate) mod coord;
pub(crate) mod stone;
