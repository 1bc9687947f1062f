pub mod blurrer_factory;
pub mod cpu_frame_blurrer;
mod gaussian;
