pub mod artifacts;
pub mod pages;

pub use artifacts::*;
pub use pages::*;
