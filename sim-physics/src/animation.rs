//! The per-frame contract between a host loop and a simulation.

/// Something driven once per host frame with the elapsed wall-clock time.
pub trait Animation {
    /// Feed one frame of elapsed time, in seconds. Returns how many fixed
    /// steps were taken.
    fn advance(&mut self, dt: f64) -> usize;

    /// Rebuild the state from the current parameters and clear history.
    fn restart(&mut self);

    /// Flip between running and paused. Returns the new paused flag.
    fn toggle_pause(&mut self) -> bool;

    /// True while frames are ignored, whether paused by hand or frozen
    /// after a numerical failure.
    fn is_paused(&self) -> bool;
}
