/// Precompute a normalized 1D Gaussian kernel.
///
/// `kernel_size` must be odd and >= 1. Sigma is `kernel_size / 6.0`, the
/// usual choice when only a kernel width is given.
pub fn gaussian_kernel_1d(kernel_size: usize) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    let sigma = kernel_size as f64 / 6.0;
    let half = (kernel_size / 2) as f64;
    let weights: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|&w| (w / sum) as f32).collect()
}

/// A Gaussian blur of fixed width, ready to apply to many images.
///
/// Kernels wider than 50 px are applied on an area-downscaled copy with a
/// proportionally narrower kernel, then upscaled back. The result is close
/// to the full-width blur at a fraction of the cost.
pub struct GaussianBlur {
    kernel: Vec<f32>,
    small_kernel: Vec<f32>,
    scale: usize,
}

impl GaussianBlur {
    pub fn new(kernel_size: usize) -> Self {
        let kernel_size = kernel_size.max(1) | 1;
        let scale = (kernel_size / 50).max(1);
        let small_size = (kernel_size / scale) | 1;
        Self {
            kernel: gaussian_kernel_1d(kernel_size),
            small_kernel: gaussian_kernel_1d(small_size),
            scale,
        }
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel.len()
    }

    /// Blur an interleaved `width x height x channels` image in place.
    /// `temp` is scratch space reused across calls.
    pub fn apply(
        &self,
        data: &mut [u8],
        width: usize,
        height: usize,
        channels: usize,
        temp: &mut Vec<f32>,
    ) {
        if self.scale <= 1 || width < self.scale * 2 || height < self.scale * 2 {
            separable_blur(data, width, height, channels, &self.kernel, temp);
            return;
        }

        let (mut small, sw, sh) = downscale(data, width, height, channels, self.scale);
        separable_blur(&mut small, sw, sh, channels, &self.small_kernel, temp);
        let restored = upscale(&small, sw, sh, channels, width, height);
        data[..restored.len()].copy_from_slice(&restored);
    }
}

/// Horizontal then vertical convolution with edge clamping.
fn separable_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
    temp: &mut Vec<f32>,
) {
    if kernel.len() <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = (kernel.len() / 2) as isize;
    let clamp = |v: isize, len: usize| v.clamp(0, len as isize - 1) as usize;

    temp.clear();
    temp.resize(width * height * channels, 0.0);

    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            for c in 0..channels {
                let sum: f32 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, &w)| {
                        let sx = clamp(x as isize + k as isize - half, width);
                        data[(row + sx) * channels + c] as f32 * w
                    })
                    .sum();
                temp[(row + x) * channels + c] = sum;
            }
        }
    }

    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let sum: f32 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, &w)| {
                        let sy = clamp(y as isize + k as isize - half, height);
                        temp[(sy * width + x) * channels + c] * w
                    })
                    .sum();
                data[(y * width + x) * channels + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Area-average downscale by an integer factor.
fn downscale(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    scale: usize,
) -> (Vec<u8>, usize, usize) {
    let out_w = width / scale;
    let out_h = height / scale;
    let mut out = vec![0u8; out_w * out_h * channels];
    let area = (scale * scale) as u32;

    for y in 0..out_h {
        for x in 0..out_w {
            for c in 0..channels {
                let mut sum = 0u32;
                for dy in 0..scale {
                    let sy = y * scale + dy;
                    for dx in 0..scale {
                        let sx = x * scale + dx;
                        sum += data[(sy * width + sx) * channels + c] as u32;
                    }
                }
                out[(y * out_w + x) * channels + c] = (sum / area) as u8;
            }
        }
    }

    (out, out_w, out_h)
}

/// Bilinear upscale to an exact target size.
fn upscale(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    target_w: usize,
    target_h: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; target_w * target_h * channels];
    let x_ratio = (width as f32 - 1.0) / (target_w as f32 - 1.0).max(1.0);
    let y_ratio = (height as f32 - 1.0) / (target_h as f32 - 1.0).max(1.0);

    for y in 0..target_h {
        let src_y = y as f32 * y_ratio;
        let y0 = (src_y.floor() as usize).min(height - 1);
        let y1 = (y0 + 1).min(height - 1);
        let fy = src_y - y0 as f32;

        for x in 0..target_w {
            let src_x = x as f32 * x_ratio;
            let x0 = (src_x.floor() as usize).min(width - 1);
            let x1 = (x0 + 1).min(width - 1);
            let fx = src_x - x0 as f32;

            for c in 0..channels {
                let px = |yy: usize, xx: usize| data[(yy * width + xx) * channels + c] as f32;
                let top = px(y0, x0) * (1.0 - fx) + px(y0, x1) * fx;
                let bottom = px(y1, x0) * (1.0 - fx) + px(y1, x1) * fx;
                let val = top * (1.0 - fy) + bottom * fy;
                out[(y * target_w + x) * channels + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}
