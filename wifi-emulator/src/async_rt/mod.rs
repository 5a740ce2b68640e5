pub mod cancellation;

pub use tokio::spawn;
pub use tokio::task::JoinHandle;
pub use tokio::time;

/// Creates the single-threaded runtime used to drive an emulation run
///
/// With `paused` set, the clock only advances when every task is waiting on a timer, so runs
/// finish as fast as possible and are fully deterministic
pub fn new_rt(paused: bool) -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(paused)
        .build()
}
