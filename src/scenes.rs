use crate::core::gfx::{
    AttributeArray, DrawMode, SamplerBinding, Scene, ShaderPair, SurfaceKind,
};
use std::str::FromStr;

/// Which demo scene to run; selected from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    OffscreenQuad,
    OnscreenTriangle,
}

impl SceneKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OffscreenQuad => "offscreen",
            Self::OnscreenTriangle => "onscreen",
        }
    }
}

impl FromStr for SceneKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offscreen" | "quad" | "pbuffer" => Ok(Self::OffscreenQuad),
            "onscreen" | "triangle" | "window" => Ok(Self::OnscreenTriangle),
            _ => Err(format!("'{s}' is not a valid scene")),
        }
    }
}

pub fn scene_for(kind: SceneKind) -> Scene {
    match kind {
        SceneKind::OffscreenQuad => textured_quad(),
        SceneKind::OnscreenTriangle => triangle(),
    }
}

const OFFSCREEN_TARGET_WIDTH: u32 = 1024;
const OFFSCREEN_TARGET_HEIGHT: u32 = 768;

// Full-surface quad with matching texture coordinates, 2 floats per vertex.
const QUAD_POSITIONS: [f32; 8] = [
    1.0, -1.0, //
    1.0, 1.0, //
    -1.0, -1.0, //
    -1.0, 1.0,
];
const QUAD_TEX_COORDS: [f32; 8] = [
    1.0, 1.0, //
    1.0, 0.0, //
    0.0, 1.0, //
    0.0, 0.0,
];

// Triangle in normalized device coordinates.
const TRIANGLE_POSITIONS: [f32; 6] = [
    0.0, 0.5, //
    -0.5, -0.5, //
    0.5, -0.5,
];

const CLEAR_GRAY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

const QUAD_ATTRIBUTES: [AttributeArray; 2] = [
    AttributeArray {
        name: "a_Position",
        components: 2,
        data: &QUAD_POSITIONS,
    },
    AttributeArray {
        name: "a_TexCoord",
        components: 2,
        data: &QUAD_TEX_COORDS,
    },
];

const QUAD_SAMPLERS: [SamplerBinding; 1] = [SamplerBinding {
    name: "tex",
    unit: 0,
}];

const TRIANGLE_ATTRIBUTES: [AttributeArray; 1] = [AttributeArray {
    name: "vPosition",
    components: 2,
    data: &TRIANGLE_POSITIONS,
}];

/// Pbuffer-backed scene: builds an offscreen render target and a
/// textured-quad pipeline, then stops with the program unbound and no draw
/// call issued.
pub fn textured_quad() -> Scene {
    Scene {
        name: "textured_quad",
        surface: SurfaceKind::Offscreen {
            target_width: OFFSCREEN_TARGET_WIDTH,
            target_height: OFFSCREEN_TARGET_HEIGHT,
        },
        shaders: ShaderPair {
            vertex: include_str!("core/gfx/shaders/quad.vert"),
            fragment: include_str!("core/gfx/shaders/quad.frag"),
        },
        attributes: &QUAD_ATTRIBUTES,
        samplers: &QUAD_SAMPLERS,
        draw: DrawMode::SetupOnly,
    }
}

/// Window-backed scene: clears to gray and rasterizes one triangle into the
/// back buffer. The frame is never swapped to the screen.
pub fn triangle() -> Scene {
    Scene {
        name: "triangle",
        surface: SurfaceKind::Onscreen,
        shaders: ShaderPair {
            vertex: include_str!("core/gfx/shaders/triangle.vert"),
            fragment: include_str!("core/gfx/shaders/triangle.frag"),
        },
        attributes: &TRIANGLE_ATTRIBUTES,
        samplers: &[],
        draw: DrawMode::Triangles {
            count: 3,
            clear_color: CLEAR_GRAY,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{SceneKind, textured_quad, triangle};
    use crate::core::gfx::{DrawMode, SurfaceKind};
    use std::str::FromStr;

    #[test]
    fn scene_kind_parses_both_scenes_and_their_aliases() {
        assert_eq!(SceneKind::from_str("offscreen"), Ok(SceneKind::OffscreenQuad));
        assert_eq!(SceneKind::from_str("QUAD"), Ok(SceneKind::OffscreenQuad));
        assert_eq!(SceneKind::from_str("onscreen"), Ok(SceneKind::OnscreenTriangle));
        assert_eq!(SceneKind::from_str("Triangle"), Ok(SceneKind::OnscreenTriangle));
        assert!(SceneKind::from_str("cube").is_err());
    }

    #[test]
    fn quad_scene_is_setup_only_with_a_sampler_on_unit_zero() {
        let scene = textured_quad();
        assert_eq!(scene.draw, DrawMode::SetupOnly, "no draw call is issued");
        assert_eq!(
            scene.surface,
            SurfaceKind::Offscreen {
                target_width: 1024,
                target_height: 768
            }
        );
        assert_eq!(scene.samplers.len(), 1);
        assert_eq!(scene.samplers[0].name, "tex");
        assert_eq!(scene.samplers[0].unit, 0);
    }

    #[test]
    fn quad_scene_attributes_are_four_packed_vec2s_each() {
        let scene = textured_quad();
        assert_eq!(scene.attributes.len(), 2);
        for attr in scene.attributes {
            assert_eq!(attr.components, 2);
            assert_eq!(
                attr.data.len(),
                8,
                "attribute '{}' should hold 4 two-component vertices",
                attr.name
            );
        }
        assert!(scene.shaders.vertex.contains("a_Position"));
        assert!(scene.shaders.vertex.contains("a_TexCoord"));
        assert!(scene.shaders.fragment.contains("tex"));
    }

    #[test]
    fn triangle_scene_draws_three_fixed_ndc_vertices() {
        let scene = triangle();
        let DrawMode::Triangles { count, clear_color } = scene.draw else {
            panic!("triangle scene must carry a triangle draw");
        };
        assert_eq!(count, 3);
        assert_eq!(clear_color, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(scene.surface, SurfaceKind::Onscreen);
        assert_eq!(scene.attributes.len(), 1);
        assert_eq!(scene.attributes[0].name, "vPosition");
        assert_eq!(
            scene.attributes[0].data,
            &[0.0, 0.5, -0.5, -0.5, 0.5, -0.5][..],
            "vertices are (0,0.5), (-0.5,-0.5), (0.5,-0.5)"
        );
        assert!(scene.samplers.is_empty());
        assert!(scene.shaders.vertex.contains("vPosition"));
    }
}
