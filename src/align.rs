pub mod similarity;
pub mod warp;
