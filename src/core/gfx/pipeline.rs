use crate::core::gfx::{AttributeArray, SamplerBinding, ShaderPair};
use glow::HasContext;
use log::warn;
use std::{error::Error, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    const fn gl_type(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

/// Compile or link failure carrying the driver's diagnostic log. Whether
/// this terminates the process is the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Compile { stage: ShaderStage, log: String },
    Link { log: String },
}

impl PipelineError {
    pub fn diagnostic_log(&self) -> &str {
        match self {
            Self::Compile { log, .. } | Self::Link { log } => log,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile { stage, log } => {
                write!(f, "{} shader failed to compile: {log}", stage.as_str())
            }
            Self::Link { log } => write!(f, "program failed to link: {log}"),
        }
    }
}

impl Error for PipelineError {}

fn compile(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::Shader, PipelineError> {
    unsafe {
        let shader = match gl.create_shader(stage.gl_type()) {
            Ok(shader) => shader,
            Err(log) => return Err(PipelineError::Compile { stage, log }),
        };
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(PipelineError::Compile { stage, log });
        }
        Ok(shader)
    }
}

/// Compiles both stages and links them into a program. Shaders are detached
/// and deleted once linking has settled either way.
pub fn build_program(
    gl: &glow::Context,
    shaders: &ShaderPair,
) -> Result<glow::Program, PipelineError> {
    unsafe {
        let vert = compile(gl, ShaderStage::Vertex, shaders.vertex)?;
        let frag = match compile(gl, ShaderStage::Fragment, shaders.fragment) {
            Ok(shader) => shader,
            Err(e) => {
                gl.delete_shader(vert);
                return Err(e);
            }
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(log) => {
                gl.delete_shader(vert);
                gl.delete_shader(frag);
                return Err(PipelineError::Link { log });
            }
        };

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.detach_shader(program, vert);
            gl.detach_shader(program, frag);
            gl.delete_shader(vert);
            gl.delete_shader(frag);
            gl.delete_program(program);
            return Err(PipelineError::Link { log });
        }
        gl.detach_shader(program, vert);
        gl.detach_shader(program, frag);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        Ok(program)
    }
}

/// Uploads each attribute slice into a STATIC_DRAW buffer object and points
/// the named program attribute at it: float components, tightly packed, not
/// normalized. Returns the created buffers for later cleanup.
pub fn bind_attributes(
    gl: &glow::Context,
    program: glow::Program,
    attributes: &[AttributeArray],
) -> Result<Vec<glow::Buffer>, Box<dyn Error>> {
    let mut buffers = Vec::with_capacity(attributes.len());
    unsafe {
        for attr in attributes {
            let location = gl
                .get_attrib_location(program, attr.name)
                .ok_or_else(|| format!("attribute '{}' not found in program", attr.name))?;
            let vbo = gl.create_buffer()?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(attr.data),
                glow::STATIC_DRAW,
            );
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_f32(location, attr.components, glow::FLOAT, false, 0, 0);
            buffers.push(vbo);
        }
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
    }
    Ok(buffers)
}

/// Sets named sampler uniforms to their texture units. The program is left
/// bound afterwards; the scene's draw mode decides whether to keep or clear
/// that binding.
pub fn apply_samplers(gl: &glow::Context, program: glow::Program, samplers: &[SamplerBinding]) {
    unsafe {
        gl.use_program(Some(program));
        for sampler in samplers {
            match gl.get_uniform_location(program, sampler.name) {
                Some(location) => gl.uniform_1_i32(Some(&location), sampler.unit),
                None => warn!("Sampler uniform '{}' not found in program.", sampler.name),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PipelineError, ShaderStage};

    #[test]
    fn stage_maps_to_the_matching_gl_shader_type() {
        assert_eq!(ShaderStage::Vertex.gl_type(), glow::VERTEX_SHADER);
        assert_eq!(ShaderStage::Fragment.gl_type(), glow::FRAGMENT_SHADER);
    }

    #[test]
    fn compile_error_names_the_stage_and_carries_the_log() {
        let err = PipelineError::Compile {
            stage: ShaderStage::Fragment,
            log: "0:3: 'foo' : undeclared identifier".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("fragment shader failed to compile"), "got: {msg}");
        assert!(
            err.diagnostic_log().contains("undeclared identifier"),
            "diagnostic log should be carried verbatim"
        );
    }

    #[test]
    fn link_error_formats_distinctly_from_compile_errors() {
        let err = PipelineError::Link {
            log: "attribute mismatch".to_string(),
        };
        assert!(err.to_string().starts_with("program failed to link"));
        assert_eq!(err.diagnostic_log(), "attribute mismatch");
    }
}
