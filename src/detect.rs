pub mod landmarker;
pub mod onnx;
