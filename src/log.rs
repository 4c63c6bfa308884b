//! Logging shim: `tracing` when the feature is enabled, no-ops otherwise.

cfg_if::cfg_if! {
    if #[cfg(feature = "tracing")] {
        pub(crate) use tracing::debug;
        pub(crate) use tracing::warn;
    } else {
        macro_rules! debug {
            ($($arg:tt)*) => {};
        }

        macro_rules! warn {
            ($($arg:tt)*) => {};
        }

        pub(crate) use debug;
        pub(crate) use warn;
    }
}
