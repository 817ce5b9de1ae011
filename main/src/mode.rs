//! The process-wide switch between checked and optimized operation.
//!
//! In [`Mode::Optimized`] applying a contract returns the function unchanged and the invariant
//! hook builds classes without touching their methods, so no checks are performed and no
//! overhead is paid. Callers must be aware that contracts are not enforced in that mode.
//!
//! The default mode follows `debug_assertions`. Enabling the `optimized` feature pins the mode to
//! [`Mode::Optimized`] for the whole build.

/// How contracts are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Contracts are applied and checked.
    Checked,
    /// Contracts are stripped.
    Optimized,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "optimized")] {
        /// Returns the current mode.
        pub fn mode() -> Mode {
            Mode::Optimized
        }

        /// Sets the current mode.
        ///
        /// This has no effect, because the `optimized` feature is enabled.
        pub fn set_mode(mode: Mode) {
            tracing::debug!(?mode, "ignoring mode change, checks are compiled out");
        }
    } else {
        use std::sync::atomic::{AtomicU8, Ordering};

        const UNSET: u8 = 0;
        const CHECKED: u8 = 1;
        const OPTIMIZED: u8 = 2;

        static MODE: AtomicU8 = AtomicU8::new(UNSET);

        /// Returns the current mode.
        pub fn mode() -> Mode {
            match MODE.load(Ordering::Relaxed) {
                CHECKED => Mode::Checked,
                OPTIMIZED => Mode::Optimized,
                _ if cfg!(debug_assertions) => Mode::Checked,
                _ => Mode::Optimized,
            }
        }

        /// Sets the current mode.
        ///
        /// Only contracts applied after this call are affected for the runtime engine. Checks
        /// generated by the attribute macros consult the mode on every call.
        pub fn set_mode(mode: Mode) {
            let raw = match mode {
                Mode::Checked => CHECKED,
                Mode::Optimized => OPTIMIZED,
            };
            MODE.store(raw, Ordering::Relaxed);
        }
    }
}

/// Returns `true` if contracts are currently checked.
#[inline]
pub fn checks_enabled() -> bool {
    mode() == Mode::Checked
}
