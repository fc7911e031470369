use std::{sync::Arc, thread};

use config::CameraBinding;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use tracing::{debug, info};

use crate::{Result, mover::Mover};

/// Where matched moves run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// On the key-delivery thread, blocking it until the camera answers.
    Inline,
    /// On one worker thread fed by a bounded queue. Moves run in match order;
    /// matches arriving while the queue is full are reported and dropped.
    Worker {
        /// Queue capacity.
        capacity: usize,
    },
}

impl Default for DispatchMode {
    fn default() -> Self {
        Self::Worker { capacity: 8 }
    }
}

pub(crate) enum Dispatcher {
    Inline(Arc<Mover>),
    Worker {
        mover: Arc<Mover>,
        tx: Sender<CameraBinding>,
        queue: Receiver<CameraBinding>,
    },
}

impl Dispatcher {
    pub(crate) fn new(mode: DispatchMode, mover: Arc<Mover>) -> Result<Self> {
        match mode {
            DispatchMode::Inline => Ok(Self::Inline(mover)),
            DispatchMode::Worker { capacity } => {
                let (tx, rx) = bounded::<CameraBinding>(capacity.max(1));
                let queue = rx.clone();
                let worker = mover.clone();
                thread::Builder::new()
                    .name("movemycam-mover".into())
                    .spawn(move || {
                        while let Ok(binding) = rx.recv() {
                            worker.move_to_preset(&binding);
                        }
                        debug!("mover_worker_exit");
                    })?;
                Ok(Self::Worker { mover, tx, queue })
            }
        }
    }

    pub(crate) fn dispatch(&self, binding: &CameraBinding) {
        match self {
            Self::Inline(mover) => {
                mover.move_to_preset(binding);
            }
            Self::Worker { mover, tx, .. } => match tx.try_send(binding.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(b)) => mover.report_dropped(&b, "move queue full"),
                Err(TrySendError::Disconnected(b)) => mover.report_dropped(&b, "mover stopped"),
            },
        }
    }

    /// Drop queued moves that have not started. A move already running finishes.
    pub(crate) fn discard_pending(&self) -> usize {
        match self {
            Self::Inline(_) => 0,
            Self::Worker { queue, .. } => {
                let discarded = queue.try_iter().count();
                if discarded > 0 {
                    info!(discarded, "pending_moves_discarded");
                }
                discarded
            }
        }
    }
}
