pub mod edit_config;
pub mod edit_error;
pub mod edit_planner;
pub mod frame_rate;
pub mod operation;
pub mod operation_normalizer;
pub mod operation_optimizer;
pub mod segment;
pub mod segment_builder;
pub mod timestamp;
