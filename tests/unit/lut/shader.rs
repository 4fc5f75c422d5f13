use super::*;
use crate::lut::parse::parse_cube;

fn cube(n: usize, f: impl Fn(f32, f32, f32) -> [f32; 3]) -> String {
    let mut s = format!("LUT_3D_SIZE {n}\n");
    let d = (n - 1) as f32;
    for b in 0..n {
        for g in 0..n {
            for r in 0..n {
                let [or, og, ob] = f(r as f32 / d, g as f32 / d, b as f32 / d);
                s.push_str(&format!("{or} {og} {ob}\n"));
            }
        }
    }
    s
}

fn shader_for(text: &str) -> LutShader {
    let atlas = LutAtlas::build(&parse_cube(text).unwrap()).unwrap();
    LutShader::compile(Arc::new(atlas), &ShaderCaps::default()).unwrap()
}

fn close(a: [f32; 3], b: [f32; 3], eps: f32) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= eps)
}

#[test]
fn identity_lut_is_near_identity() {
    let shader = shader_for(&cube(17, |r, g, b| [r, g, b]));
    for rgb in [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.3, 0.6, 0.9], [0.51, 0.02, 0.77]] {
        assert!(close(shader.sample(rgb), rgb, 2.0 / 255.0), "{rgb:?}");
    }
}

#[test]
fn inversion_lut_interpolates_between_slices() {
    let shader = shader_for(&cube(2, |r, g, b| [1.0 - r, 1.0 - g, 1.0 - b]));
    let out = shader.sample([0.25, 0.5, 0.75]);
    assert!(close(out, [0.75, 0.5, 0.25], 1.0 / 255.0), "{out:?}");
}

#[test]
fn shade_blends_by_intensity_and_keeps_alpha() {
    let shader = shader_for(&cube(2, |_, _, _| [1.0, 0.0, 0.0]));
    let src = [0.0, 0.0, 1.0, 0.4];
    assert_eq!(shader.shade(src, 0.0), src);
    let half = shader.shade(src, 0.5);
    assert!((half[0] - 0.5).abs() < 1e-3);
    assert!((half[2] - 0.5).abs() < 1e-3);
    assert_eq!(half[3], 0.4);
    let full = shader.shade(src, 1.0);
    assert!(close([full[0], full[1], full[2]], [1.0, 0.0, 0.0], 1e-3));
}

#[test]
fn domain_is_normalised_before_lookup() {
    let text = format!(
        "DOMAIN_MIN 0 0 0\nDOMAIN_MAX 2 2 2\n{}",
        cube(9, |r, g, b| [r, g, b])
    );
    let parsed = parse_cube(&text).unwrap();
    let atlas = Arc::new(LutAtlas::build(&parsed).unwrap());
    let shader = LutShader::compile_with_domain(
        atlas,
        parsed.domain_min,
        parsed.domain_max,
        &ShaderCaps::default(),
    )
    .unwrap();
    assert!(close(shader.sample([1.0, 1.0, 1.0]), [0.5, 0.5, 0.5], 2.0 / 255.0));
}

#[test]
fn compile_respects_caps() {
    let lut = parse_cube(&cube(33, |r, g, b| [r, g, b])).unwrap();
    let atlas = Arc::new(LutAtlas::build(&lut).unwrap());
    assert!(LutShader::compile(atlas.clone(), &ShaderCaps::unsupported()).is_err());
    let tiny = ShaderCaps {
        shaders_supported: true,
        max_texture_width: 1024,
    };
    assert!(LutShader::compile(atlas.clone(), &tiny).is_err());
    let shader = LutShader::compile(atlas, &ShaderCaps::default()).unwrap();
    assert_eq!(shader.grid_size(), 33);
}
