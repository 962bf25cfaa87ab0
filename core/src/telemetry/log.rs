use log::info;

/// Thin wrapper over the `log` facade that tags each record with the kernel
/// it came from.
pub struct LogManager {
    scope: &'static str,
}

impl LogManager {
    pub fn scoped(scope: &'static str) -> Self {
        Self { scope }
    }

    pub fn record(&self, message: &str) {
        info!("{} {}", self.scope, message);
    }
}
