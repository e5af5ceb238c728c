mod anim;
mod app;
mod config;
mod follower;
mod motion;
mod platform;
mod sink;
mod sprite;
mod timer;
mod tray;
mod view;

fn main() {
    env_logger::init();
    log::info!("Sprite Follower starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
