/// The process-wide cancellation token: a single atomic flag set by the
/// supervisor's signal-dispatch thread and observed cooperatively by
/// every worker at block boundaries. Modelled as a cheaply `Clone`able
/// handle around a shared `AtomicBool` rather than a bare global.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
