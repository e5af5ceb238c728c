use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::config::FollowerConfig;
use crate::follower::Follower;
use crate::platform::SystemPointer;
use crate::sink::LogSink;
use crate::sprite::SpriteSheet;
use crate::tray::{TrayCommand, TrayIcon, TraySink};
use crate::view::EnlargedView;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Event loop failed: {0}")]
    EventLoop(#[from] EventLoopError),
}

/// Top-level application state.
struct App {
    config: FollowerConfig,
    follower: Follower,
    pointer: SystemPointer,

    // Display sinks the app also talks to directly
    tray: Option<Rc<RefCell<TrayIcon>>>,
    view: Rc<RefCell<EnlargedView>>,

    /// Origin of the follower's timer clock.
    started: Instant,
}

impl App {
    fn new(config: FollowerConfig) -> Self {
        let sheet = SpriteSheet::new(config.sheet_width, config.sheet_height);
        let view = EnlargedView::new(sheet, config.enlarged_size, config.enlarged_window_size);
        Self {
            follower: Follower::new(&config),
            pointer: SystemPointer,
            tray: None,
            view: Rc::new(RefCell::new(view)),
            started: Instant::now(),
            config,
        }
    }

    fn handle_tray(&mut self, event_loop: &ActiveEventLoop) {
        let Some(tray) = &self.tray else {
            return;
        };
        let command = tray.borrow_mut().poll();
        match command {
            TrayCommand::None => {}
            TrayCommand::ToggleEnlargedView => {
                if let Err(e) = self.view.borrow_mut().toggle(event_loop) {
                    log::error!("Could not open enlarged view: {e}");
                }
            }
            TrayCommand::Quit => {
                log::info!("Quit requested from tray");
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        if self.tray.is_some() {
            return;
        }

        let tray = Rc::new(RefCell::new(TrayIcon::new()));
        let sheet = SpriteSheet::new(self.config.sheet_width, self.config.sheet_height);

        self.follower.attach_sink(Box::new(LogSink));
        self.follower.attach_sink(Box::new(TraySink::new(
            tray.clone(),
            sheet,
            self.config.icon_size,
        )));
        self.follower.attach_sink(Box::new(self.view.clone()));
        self.tray = Some(tray);

        // Timer clock starts now, not at construction.
        self.started = Instant::now();
        self.follower.start(&mut self.pointer);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.started.elapsed();
        self.follower.pump(now, &mut self.pointer);

        self.handle_tray(event_loop);

        match self.follower.next_deadline() {
            Some(deadline) => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(self.started + deadline))
            }
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            let mut view = self.view.borrow_mut();
            if view.window_id() == Some(window_id) {
                view.close();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.follower.stop();
        self.view.borrow_mut().close();
        if let Some(tray) = self.tray.take() {
            tray.borrow_mut().remove();
        }
        log::info!("Sprite Follower shut down");
    }
}

/// Entry point: load config, create the event loop and run.
pub fn run() -> Result<(), AppError> {
    let config = FollowerConfig::load();
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
