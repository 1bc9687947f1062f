use std::cell::RefCell;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::constants::DEFAULT_BLUR_KERNEL;
use crate::shared::frame::Frame;

use super::gaussian::GaussianBlur;

/// Full-frame separable Gaussian blur on the CPU.
pub struct CpuFrameBlurrer {
    blur: GaussianBlur,
    temp: RefCell<Vec<f32>>,
}

impl CpuFrameBlurrer {
    pub fn new(kernel_size: usize) -> Self {
        Self {
            blur: GaussianBlur::new(kernel_size),
            temp: RefCell::new(Vec::new()),
        }
    }

    pub fn kernel_size(&self) -> usize {
        self.blur.kernel_size()
    }
}

impl Default for CpuFrameBlurrer {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_KERNEL)
    }
}

impl FrameBlurrer for CpuFrameBlurrer {
    fn blur(&self, frame: &mut Frame) -> Result<(), Box<dyn std::error::Error>> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let channels = frame.channels() as usize;
        if width == 0 || height == 0 {
            return Ok(());
        }

        let mut temp = self.temp.borrow_mut();
        self.blur
            .apply(frame.data_mut(), width, height, channels, &mut temp);
        Ok(())
    }
}
