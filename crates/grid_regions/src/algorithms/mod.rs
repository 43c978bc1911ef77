pub mod binarize;
pub mod lines;
pub mod grid;
pub mod extraction;
pub mod detection;
pub mod crop;

pub use binarize::*;
pub use lines::*;
pub use grid::*;
pub use extraction::*;
pub use detection::*;
pub use crop::*;
