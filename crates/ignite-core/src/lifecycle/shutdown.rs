//! Process-wide shutdown hook.
//!
//! At most one callback is ever registered per process, and it runs at most
//! once. The binary calls [`run_shutdown_hook`] on exit.
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

type Callback = Box<dyn FnOnce() + Send>;

static REGISTERED: AtomicBool = AtomicBool::new(false);
static CALLBACK: Mutex<Option<Callback>> = Mutex::new(None);

pub struct ShutdownHook;

impl ShutdownHook {
    /// Installs `callback` unless a hook was already registered.
    /// Returns whether this call installed it.
    pub fn register_once<F>(callback: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if REGISTERED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Shutdown hook already registered");
            return false;
        }
        *CALLBACK.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Box::new(callback));
        true
    }

    pub fn is_registered() -> bool {
        REGISTERED.load(Ordering::Acquire)
    }

    /// Runs the callback if one is pending. Returns whether it ran.
    pub fn run() -> bool {
        let callback = CALLBACK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match callback {
            Some(callback) => {
                log::debug!("Running shutdown hook");
                callback();
                true
            }
            None => false,
        }
    }
}

pub fn run_shutdown_hook() -> bool {
    ShutdownHook::run()
}
