use llf_ops::{CurveParams, ToneCurve};

fn params(radius: f32, nr: f32, detail: f32, edge: f32) -> CurveParams {
    CurveParams {
        detail_radius: radius,
        noise_reduction: nr,
        detail_strength: detail,
        edge_strength: edge,
    }
}

#[test]
fn zero_strengths_give_identity_for_every_reference() {
    for r in 0..=255u8 {
        let curve = ToneCurve::build(r, &params(12.5, 3.0, 0.0, 0.0)).unwrap();
        assert!(curve.is_identity(), "reference {r}");
    }
}

#[test]
fn reference_is_fixed_point() {
    for r in (0..=255u8).step_by(17) {
        for nr in [0.0, 1.0, 5.0] {
            for (d, e) in [(100.0, -100.0), (-100.0, 100.0), (50.0, 50.0)] {
                let curve = ToneCurve::build(r, &params(30.0, nr, d, e)).unwrap();
                assert_eq!(curve.map(r), r);
            }
        }
    }
}

#[test]
fn noise_reduction_never_amplifies_beyond_curve() {
    let r = 120u8;
    let plain = ToneCurve::build(r, &params(16.0, 0.0, 100.0, 0.0)).unwrap();
    let reduced = ToneCurve::build(r, &params(16.0, 8.0, 100.0, 0.0)).unwrap();
    for x in 112..=128u8 {
        let d = (x as i32 - r as i32).abs();
        let dp = (plain.map(x) as i32 - r as i32).abs();
        let dr = (reduced.map(x) as i32 - r as i32).abs();
        assert!(dr >= d && dr <= dp, "x={x}: d={d} reduced={dr} plain={dp}");
    }
}

#[test]
fn curves_are_monotonic() {
    for r in [0u8, 90, 255] {
        for (d, e) in [(100.0, 100.0), (-100.0, -100.0), (0.0, -60.0)] {
            let curve = ToneCurve::build(r, &params(25.0, 2.0, d, e)).unwrap();
            assert!(curve.lut().windows(2).all(|p| p[0] <= p[1]), "r={r} d={d} e={e}");
        }
    }
}
