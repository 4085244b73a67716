mod context;
mod offscreen;
mod pipeline;

pub use context::{DisplayVersionError, MIN_DISPLAY_VERSION};
pub use pipeline::{PipelineError, ShaderStage};

use glow::HasContext;
use log::info;
use std::{error::Error, sync::Arc};
use winit::window::Window;

// --- Public Data Contract ---

/// Embedded GLSL sources for one program. Passed in explicitly so scenes own
/// their shader text instead of reading process-wide globals.
#[derive(Clone, Copy, Debug)]
pub struct ShaderPair {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

/// A named vertex attribute fed from a plain float slice, tightly packed.
/// The backend uploads the slice into a buffer object at bind time; the
/// public shape stays "name plus flat float array".
#[derive(Clone, Copy, Debug)]
pub struct AttributeArray {
    pub name: &'static str,
    pub components: i32,
    pub data: &'static [f32],
}

/// A named sampler uniform pinned to a texture unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerBinding {
    pub name: &'static str,
    pub unit: i32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawMode {
    /// Build the full pipeline, then leave no program bound and issue no
    /// draw call.
    SetupOnly,
    /// Clear the color buffer and rasterize `count` vertices as triangles.
    /// The frame lands in the back buffer and is deliberately never
    /// presented.
    Triangles { count: i32, clear_color: [f32; 4] },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Pbuffer surface plus an explicit framebuffer object of the given
    /// size as the nominal render target.
    Offscreen {
        target_width: u32,
        target_height: u32,
    },
    /// Surface bound to the native window.
    Onscreen,
}

/// Everything that distinguishes one demo scene from another: surface kind,
/// shader pair, attribute data, sampler bindings and draw mode.
pub struct Scene {
    pub name: &'static str,
    pub surface: SurfaceKind,
    pub shaders: ShaderPair,
    pub attributes: &'static [AttributeArray],
    pub samplers: &'static [SamplerBinding],
    pub draw: DrawMode,
}

/// Live GPU resources for a scene that has completed its setup (and, for
/// drawing scenes, its single draw call).
pub struct SceneRun {
    state: context::GlState,
    target: Option<offscreen::OffscreenTarget>,
    program: glow::Program,
    buffers: Vec<glow::Buffer>,
}

impl SceneRun {
    /// Releases every GL handle the scene created. The display connection
    /// itself lives until process exit.
    pub fn cleanup(&mut self) {
        info!("Cleaning up scene resources...");
        let gl = &self.state.gl;
        unsafe {
            for vbo in self.buffers.drain(..) {
                gl.delete_buffer(vbo);
            }
            gl.delete_program(self.program);
        }
        if let Some(target) = self.target.take() {
            target.cleanup(gl);
        }
        info!("Scene resources cleaned up.");
    }
}

/// Runs one scene against the given window: display + surface + context
/// setup, optional offscreen target, shader pipeline, attribute binding,
/// then the scene's draw mode. The context is made current before any GL
/// call; that ordering is load-bearing.
pub fn run_scene(window: Arc<Window>, scene: &Scene) -> Result<SceneRun, Box<dyn Error>> {
    info!("Running scene '{}'...", scene.name);
    let state = context::init(window, scene.surface)?;

    let target = match scene.surface {
        SurfaceKind::Offscreen {
            target_width,
            target_height,
        } => Some(offscreen::OffscreenTarget::new(
            &state.gl,
            target_width,
            target_height,
        )?),
        SurfaceKind::Onscreen => None,
    };

    let program = pipeline::build_program(&state.gl, &scene.shaders)?;
    state.release_shader_compiler();

    let buffers = pipeline::bind_attributes(&state.gl, program, scene.attributes)?;
    pipeline::apply_samplers(&state.gl, program, scene.samplers);

    match scene.draw {
        DrawMode::SetupOnly => {
            // Pipeline demonstrated; clear the binding and stop short of
            // any draw call.
            unsafe { state.gl.use_program(None) };
            info!("Scene '{}' set up; no draw call issued.", scene.name);
        }
        DrawMode::Triangles { count, clear_color } => {
            unsafe {
                let gl = &state.gl;
                gl.use_program(Some(program));
                let [r, g, b, a] = clear_color;
                gl.clear_color(r, g, b, a);
                gl.clear(glow::COLOR_BUFFER_BIT);
                gl.draw_arrays(glow::TRIANGLES, 0, count);
            }
            // No buffer swap: the rasterized frame stays in the back buffer.
            info!(
                "Scene '{}' drew {count} vertices; frame not presented.",
                scene.name
            );
        }
    }

    Ok(SceneRun {
        state,
        target,
        program,
        buffers,
    })
}
