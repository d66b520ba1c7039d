//! Process-wide shutdown fan-out. One `()` message on the channel asks every
//! listener (signal handler, running engine) to wind down.
use tokio::sync::broadcast;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;
