pub mod color_scale;
pub mod config;
pub mod figure;
