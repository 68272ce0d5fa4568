/// Blocking waits for deferred evaluations.
mod blocking;
/// Push-based sources fed through an [`Emitter`].
mod emitter;
/// Tokio runtime driver for consumption futures.
mod tokio_driver;
/// Sources backed by Tokio channels.
mod tokio_receiver_source;

pub use emitter::Emitter;
pub use tokio_driver::TokioDriver;
