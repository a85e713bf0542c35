use llf_core::LumaBuffer;
use llf_ops::laplacian::to_laplacian;
use llf_ops::{GaussianPyramid, LaplacianPyramid, DEFAULT_MIN_SIZE};

fn smooth(width: u32, height: u32) -> LumaBuffer {
    LumaBuffer::from_fn(width, height, |x, y| {
        let fx = x as f32 / width as f32 * std::f32::consts::TAU;
        let fy = y as f32 / height as f32 * std::f32::consts::PI;
        (128.0 + 60.0 * fx.sin() * fy.cos()).round() as u8
    })
    .unwrap()
}

fn max_abs_diff(a: &LumaBuffer, b: &LumaBuffer) -> u8 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

#[test]
fn gaussian_collapse_returns_input() {
    for (w, h) in [(64, 64), (37, 53), (5, 200)] {
        let src = smooth(w, h);
        let pyr = GaussianPyramid::build(src.clone(), DEFAULT_MIN_SIZE).unwrap();
        assert_eq!(pyr.collapse(), src);
    }
}

#[test]
fn laplacian_roundtrip_within_rounding_bound() {
    for (w, h) in [(64, 64), (37, 53), (100, 7), (3, 3)] {
        let src = smooth(w, h);
        let gaussian = GaussianPyramid::build(src.clone(), DEFAULT_MIN_SIZE).unwrap();
        let restored = to_laplacian(&gaussian).unwrap().collapse().unwrap();
        assert!(max_abs_diff(&restored, &src) <= 2, "{w}x{h}");
    }
}

#[test]
fn laplacian_roundtrip_exact_without_clipping() {
    let src = LumaBuffer::from_fn(57, 31, |x, y| (x * 3 + y * 2) as u8).unwrap();
    let gaussian = GaussianPyramid::build(src.clone(), DEFAULT_MIN_SIZE).unwrap();
    let laplacian = LaplacianPyramid::from_gaussian(&gaussian).unwrap();
    assert_eq!(laplacian.collapse().unwrap(), src);
}

#[test]
fn level_count_is_deterministic() {
    for min_size in [1, 2, 4, 8] {
        let a = GaussianPyramid::build(smooth(120, 90), min_size).unwrap();
        let b = GaussianPyramid::build(LumaBuffer::filled(120, 90, 0).unwrap(), min_size).unwrap();
        assert_eq!(a.level_count(), b.level_count());
        assert_eq!(
            a.level_count(),
            GaussianPyramid::level_count_for(120, 90, min_size).unwrap()
        );
        let (w, h) = a.coarsest().dimensions();
        assert!(w > min_size && h > min_size || a.level_count() == 1);
    }
}
