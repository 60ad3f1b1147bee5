mod cluster;
mod similarity;
mod traits;

pub use cluster::*;
pub use similarity::*;
pub use traits::*;
