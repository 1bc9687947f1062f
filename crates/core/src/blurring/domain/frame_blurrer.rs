use crate::shared::frame::Frame;

/// Obscures a whole frame in place. Used for every frame of a
/// transform segment.
///
/// Implementations may keep scratch buffers, so each pipeline worker owns
/// its own instance.
pub trait FrameBlurrer: Send {
    fn blur(&self, frame: &mut Frame) -> Result<(), Box<dyn std::error::Error>>;
}
