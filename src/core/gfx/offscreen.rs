use glow::HasContext;
use log::{info, warn};
use std::error::Error;

/// A framebuffer object with an RGB565 color renderbuffer at attachment 0.
/// The offscreen scene demonstrates the setup only; nothing draws into or
/// reads back from the target.
pub struct OffscreenTarget {
    framebuffer: glow::Framebuffer,
    renderbuffer: glow::Renderbuffer,
}

impl OffscreenTarget {
    pub fn new(gl: &glow::Context, width: u32, height: u32) -> Result<Self, Box<dyn Error>> {
        unsafe {
            let framebuffer = gl.create_framebuffer()?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));

            let renderbuffer = gl.create_renderbuffer()?;
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));
            gl.renderbuffer_storage(glow::RENDERBUFFER, glow::RGB565, width as i32, height as i32);
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::RENDERBUFFER,
                Some(renderbuffer),
            );

            // Incompleteness is reported but, unlike every other failure
            // here, not fatal.
            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status == glow::FRAMEBUFFER_COMPLETE {
                info!("Offscreen framebuffer complete ({width}x{height}, RGB565).");
            } else {
                warn!(
                    "Offscreen framebuffer incomplete after attaching color renderbuffer: {status:#x}"
                );
            }

            Ok(Self {
                framebuffer,
                renderbuffer,
            })
        }
    }

    pub fn cleanup(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.delete_renderbuffer(self.renderbuffer);
            gl.delete_framebuffer(self.framebuffer);
        }
    }
}
