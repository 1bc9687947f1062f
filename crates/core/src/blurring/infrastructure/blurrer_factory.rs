use crate::blurring::domain::frame_blurrer::FrameBlurrer;

use super::cpu_frame_blurrer::CpuFrameBlurrer;

/// One blurrer per pipeline worker; instances hold scratch buffers and are
/// not shared.
pub fn create_blurrers(kernel_size: usize, count: usize) -> Vec<Box<dyn FrameBlurrer>> {
    let count = count.max(1);
    let blurrers: Vec<CpuFrameBlurrer> = (0..count)
        .map(|_| CpuFrameBlurrer::new(kernel_size))
        .collect();

    let effective = blurrers
        .first()
        .map_or(kernel_size, CpuFrameBlurrer::kernel_size);
    if effective != kernel_size {
        log::warn!("Blur kernel {kernel_size} is not odd; using {effective}");
    }
    log::info!("Using CPU backend for full-frame blur (kernel_size={effective}, workers={count})");

    blurrers
        .into_iter()
        .map(|b| Box::new(b) as Box<dyn FrameBlurrer>)
        .collect()
}
