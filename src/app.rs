use crate::config;
use crate::core::gfx::{self, DisplayVersionError, DrawMode, PipelineError, Scene, SceneRun};
use crate::scenes;
use log::{error, info};
use std::{error::Error, sync::Arc, thread, time::Duration};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

// Fixed window placement for both scenes.
const WINDOW_POSITION: PhysicalPosition<i32> = PhysicalPosition::new(100, 100);

struct App {
    scene: Scene,
    window_size: (u32, u32),
    run: Option<SceneRun>,
}

impl App {
    fn init_and_run(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let window_attributes = Window::default_attributes()
            .with_title(format!("glhello - {}", self.scene.name))
            .with_inner_size(PhysicalSize::new(self.window_size.0, self.window_size.1))
            .with_position(WINDOW_POSITION)
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        self.run = Some(gfx::run_scene(window, &self.scene)?);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.run.is_some() {
            return;
        }
        if let Err(e) = self.init_and_run(event_loop) {
            exit_for_error(&*e);
        }
        match self.scene.draw {
            DrawMode::SetupOnly => {
                if let Some(run) = self.run.as_mut() {
                    run.cleanup();
                }
                event_loop.exit();
            }
            DrawMode::Triangles { .. } => {
                // Keep-alive with no event processing. The drawn frame sits
                // in the back buffer for as long as the process lives.
                info!("Idling; interrupt the process to quit.");
                loop {
                    thread::sleep(Duration::from_secs(1));
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
        }
    }
}

fn exit_for_error(e: &(dyn Error + 'static)) -> ! {
    if let Some(version) = e.downcast_ref::<DisplayVersionError>() {
        error!("{version}");
        std::process::exit(-1);
    }
    if let Some(pipeline) = e.downcast_ref::<PipelineError>() {
        // Print the driver diagnostic, then terminate; there is no fallback
        // pipeline to retry with.
        error!("{pipeline}");
        std::process::exit(1);
    }
    error!("Failed to run scene: {e}");
    std::process::exit(1);
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::get();
    let scene = scenes::scene_for(config.scene);
    info!("Selected scene: {}", scene.name);

    let event_loop = EventLoop::new()?;
    let mut app = App {
        scene,
        window_size: (config.display_width, config.display_height),
        run: None,
    };
    event_loop.run_app(&mut app)?;
    Ok(())
}
