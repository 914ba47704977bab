pub mod binarize;
pub mod extraction;
pub mod statistics;
pub mod filtering;
pub mod geometry;
pub mod fingerprint;
pub mod analysis;
pub mod grouping;

pub use binarize::*;
pub use extraction::*;
pub use statistics::*;
pub use filtering::*;
pub use geometry::*;
pub use analysis::*;
pub use grouping::*;
