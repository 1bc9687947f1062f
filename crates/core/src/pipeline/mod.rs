pub mod edit_video_use_case;
pub mod infrastructure;
pub mod pipeline_executor;
pub mod segment_schedule;

#[cfg(test)]
pub(crate) mod test_stubs;
