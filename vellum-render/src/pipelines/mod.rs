//! wgpu render pipelines: coverage accumulation (encode) and packed
//! texture resolve (decode).

pub mod decode;
pub mod encode;

pub use decode::DecodePipeline;
pub use encode::EncodePipeline;
