//! Live-reload coordination: the asynchronous signal flag and the
//! transient on-screen notice that follows a successful reload.

use std::sync::atomic::{AtomicBool, Ordering};

/// Frame rate the viewer paces itself against.
pub const TARGET_FPS: u32 = 30;

// Written from the signal handler, drained at the top of each frame. All
// real work is deferred to the main loop.
static RELOAD_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Flag a reload. The only work the signal handler performs.
pub fn request_reload() {
    RELOAD_REQUESTED.store(true, Ordering::Relaxed);
}

/// Drain the pending reload request, if any.
pub fn take_reload_request() -> bool {
    RELOAD_REQUESTED.swap(false, Ordering::Relaxed)
}

/// Route SIGUSR1 to [`request_reload`].
#[cfg(unix)]
pub fn install_signal_handler() {
    extern "C" fn on_sigusr1(_signum: libc::c_int) {
        request_reload();
    }

    let handler = on_sigusr1 as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGUSR1, handler as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
pub fn install_signal_handler() {}

/// Frame-tick countdown for the "document reloaded" overlay.
#[derive(Debug, Clone, Copy)]
pub struct ReloadNotice {
    frames_left: u32,
}

impl ReloadNotice {
    /// How long the notice stays up: five seconds at the target rate.
    pub const DURATION_FRAMES: u32 = 5 * TARGET_FPS;

    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_left: Self::DURATION_FRAMES,
        }
    }

    #[must_use]
    pub fn active(&self) -> bool {
        self.frames_left > 0
    }

    /// Advance one frame. Returns whether the notice is still active.
    pub fn tick(&mut self) -> bool {
        self.frames_left = self.frames_left.saturating_sub(1);
        self.active()
    }
}

impl Default for ReloadNotice {
    fn default() -> Self {
        Self::new()
    }
}
