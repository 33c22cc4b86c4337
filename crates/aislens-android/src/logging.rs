/// Logcat tag for every record emitted by the library.
pub const TAG: &str = "aislens";

/// Routes `tracing` output to logcat on Android (through `tracing`'s `log` bridge) and to stderr
/// elsewhere. Repeated calls are no-ops.
pub fn init() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag(TAG),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = tracing_subscriber::fmt::try_init();
    }
}
