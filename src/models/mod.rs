pub mod bedrock;
pub mod common;
pub mod gemini;
pub mod image;
pub mod plan;

pub use bedrock::*;
pub use common::*;
pub use gemini::*;
pub use image::*;
pub use plan::*;
