pub mod batch;
pub mod timelapse;
