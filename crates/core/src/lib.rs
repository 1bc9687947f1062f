//! Timeline editing engine that cuts or blurs moderated intervals of a
//! video while keeping its audio in sync.
//!
//! Each bounded context keeps its pure logic and ports in `domain` and
//! its FFmpeg/CPU adapters in `infrastructure`.

pub mod audio;
pub mod blurring;
pub mod editing;
pub mod pipeline;
pub mod shared;
pub mod video;
