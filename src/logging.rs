use log::Level;


/// Installs the global logger.
///
/// Logs go to the browser console on wasm and to stderr everywhere else.
/// Calling this more than once keeps the first logger.
pub fn init(level: Level) {
    #[cfg(target_arch = "wasm32")]
    {
        if console_log::init_with_level(level).is_err() {
            log::debug!("Logger was already installed");
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let installed = env_logger::Builder::new()
            .filter_level(level.to_level_filter())
            .is_test(cfg!(test))
            .try_init();

        if installed.is_err() {
            log::debug!("Logger was already installed");
        }
    }
}
