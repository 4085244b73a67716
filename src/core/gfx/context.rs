use crate::core::gfx::SurfaceKind;
use glutin::{
    config::{Api, ColorBufferType, ConfigSurfaceTypes, ConfigTemplateBuilder},
    context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version},
    display::{Display, DisplayApiPreference},
    prelude::*,
    surface::{PbufferSurface, Surface, SurfaceAttributesBuilder, WindowSurface},
};
use log::{error, info, warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::{error::Error, ffi::CStr, fmt, num::NonZeroU32, sync::Arc};
use winit::window::Window;

/// Minimum display (EGL) version the demos require.
pub const MIN_DISPLAY_VERSION: (u32, u32) = (1, 4);

type ReleaseShaderCompilerFn = extern "system" fn();

/// The one rendering surface a scene draws into.
enum DemoSurface {
    Window(Surface<WindowSurface>),
    Pbuffer(Surface<PbufferSurface>),
}

/// A current GLES 2.0 context plus the glow function table loaded from it.
/// The window, surface and context are held so the GPU-side objects stay
/// alive for as long as the scene does.
pub struct GlState {
    pub gl: glow::Context,
    _surface: DemoSurface,
    _context: PossiblyCurrentContext,
    _window: Arc<Window>,
    release_shader_compiler: Option<ReleaseShaderCompilerFn>,
}

impl GlState {
    /// Driver hint that no further shader compilation will happen in this
    /// process. Loaded by proc address since glow does not expose it.
    pub fn release_shader_compiler(&self) {
        match self.release_shader_compiler {
            Some(f) => f(),
            None => warn!("glReleaseShaderCompiler not available; skipping compiler release."),
        }
    }
}

/// The display reported a version older than [`MIN_DISPLAY_VERSION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayVersionError {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for DisplayVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min_major, min_minor) = MIN_DISPLAY_VERSION;
        write!(
            f,
            "display version {}.{} is below the required {min_major}.{min_minor}",
            self.major, self.minor
        )
    }
}

impl Error for DisplayVersionError {}

/// Extracts the first `major.minor` pair from a driver version string
/// (e.g. "1.5" or "EGL 1.5 Mesa 24.0").
pub fn parse_display_version(s: &str) -> Option<(u32, u32)> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let dot = rest.find('.')?;
    let major = rest[..dot].parse::<u32>().ok()?;
    let minor_digits: &str = {
        let tail = &rest[dot + 1..];
        let end = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        &tail[..end]
    };
    let minor = minor_digits.parse::<u32>().ok()?;
    Some((major, minor))
}

/// Whether a reported version satisfies the 1.4 minimum, compared
/// lexicographically on (major, minor).
pub const fn meets_minimum_version(major: u32, minor: u32) -> bool {
    major > MIN_DISPLAY_VERSION.0
        || (major == MIN_DISPLAY_VERSION.0 && minor >= MIN_DISPLAY_VERSION.1)
}

/// Creates the GL display, picks the first matching GLES2/RGB888/depth24
/// config, builds the requested surface plus a version-2.0 context, and
/// makes both current for the calling thread.
pub fn init(window: Arc<Window>, kind: SurfaceKind) -> Result<GlState, Box<dyn Error>> {
    let display_handle = window.display_handle()?.as_raw();

    #[cfg(target_os = "windows")]
    let preference = {
        info!("Using WGL for the GL display.");
        DisplayApiPreference::Wgl(None)
    };

    #[cfg(target_os = "macos")]
    let preference = {
        info!("Using CGL for the GL display.");
        DisplayApiPreference::Cgl
    };

    #[cfg(all(unix, not(target_os = "macos")))]
    let preference = {
        info!("Using EGL for the GL display.");
        DisplayApiPreference::Egl
    };

    // Without a display there is nothing to retry or fall back to;
    // terminate abnormally.
    let display = match unsafe { Display::new(display_handle, preference) } {
        Ok(display) => display,
        Err(e) => {
            error!("Failed to acquire GL display: {e}");
            std::process::abort();
        }
    };

    let version = display.version_string();
    info!("GL display version: {version}");
    if let Some((major, minor)) = parse_display_version(&version)
        && !meets_minimum_version(major, minor)
    {
        return Err(Box::new(DisplayVersionError { major, minor }));
    }

    let surface_type = match kind {
        SurfaceKind::Offscreen { .. } => ConfigSurfaceTypes::PBUFFER,
        SurfaceKind::Onscreen => ConfigSurfaceTypes::WINDOW,
    };
    let template = ConfigTemplateBuilder::new()
        .with_api(Api::GLES2)
        .with_surface_type(surface_type)
        .with_buffer_type(ColorBufferType::Rgb {
            r_size: 8,
            g_size: 8,
            b_size: 8,
        })
        .with_depth_size(24)
        .build();

    // First match wins; there is no fallback template.
    let config = unsafe { display.find_configs(template)? }
        .next()
        .ok_or("No GL config matches GLES2 / RGB888 / 24-bit depth")?;

    let raw_window_handle = window.window_handle()?.as_raw();
    let surface = match kind {
        SurfaceKind::Onscreen => {
            let (width, height): (u32, u32) = window.inner_size().into();
            let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
                raw_window_handle,
                NonZeroU32::new(width).ok_or("window width is zero")?,
                NonZeroU32::new(height).ok_or("window height is zero")?,
            );
            DemoSurface::Window(unsafe { display.create_window_surface(&config, &attrs)? })
        }
        SurfaceKind::Offscreen { .. } => {
            // The pbuffer only satisfies make-current; rendering targets the
            // explicit framebuffer object. Minimum legal size is enough.
            let attrs = SurfaceAttributesBuilder::<PbufferSurface>::new()
                .build(NonZeroU32::MIN, NonZeroU32::MIN);
            DemoSurface::Pbuffer(unsafe { display.create_pbuffer_surface(&config, &attrs)? })
        }
    };

    // GLES 2.0, no share context. Making it current must precede every GL
    // call below and in the rest of the scene.
    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(Some(Version::new(2, 0))))
        .build(Some(raw_window_handle));
    let not_current = unsafe { display.create_context(&config, &context_attributes)? };
    let context = match &surface {
        DemoSurface::Window(s) => not_current.make_current(s)?,
        DemoSurface::Pbuffer(s) => not_current.make_current(s)?,
    };

    let gl =
        unsafe { glow::Context::from_loader_function_cstr(|s: &CStr| display.get_proc_address(s)) };

    let release_shader_compiler = {
        let proc = display.get_proc_address(c"glReleaseShaderCompiler");
        if proc.is_null() {
            None
        } else {
            let f: ReleaseShaderCompilerFn = unsafe { std::mem::transmute(proc) };
            Some(f)
        }
    };

    info!("GLES 2.0 context created and made current.");
    Ok(GlState {
        gl,
        _surface: surface,
        _context: context,
        _window: window,
        release_shader_compiler,
    })
}

#[cfg(test)]
mod tests {
    use super::{DisplayVersionError, meets_minimum_version, parse_display_version};

    #[test]
    fn version_parses_from_bare_and_decorated_strings() {
        assert_eq!(parse_display_version("1.5"), Some((1, 5)));
        assert_eq!(parse_display_version("EGL 1.4"), Some((1, 4)));
        assert_eq!(
            parse_display_version("EGL 1.5 Mesa 24.0.9"),
            Some((1, 5)),
            "only the first major.minor pair should be read"
        );
        assert_eq!(parse_display_version("no digits here"), None);
        assert_eq!(parse_display_version("15"), None);
    }

    #[test]
    fn minimum_version_is_a_lexicographic_bound() {
        assert!(meets_minimum_version(1, 4));
        assert!(meets_minimum_version(1, 5));
        assert!(meets_minimum_version(2, 0), "2.0 outranks 1.4");
        assert!(!meets_minimum_version(1, 3));
        assert!(!meets_minimum_version(0, 9), "0.9 must fail even though its minor is >= 4");
    }

    #[test]
    fn version_error_reports_both_versions() {
        let err = DisplayVersionError { major: 1, minor: 3 };
        let msg = err.to_string();
        assert!(msg.contains("1.3"), "got: {msg}");
        assert!(msg.contains("1.4"), "got: {msg}");
    }
}
