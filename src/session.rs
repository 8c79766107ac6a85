use std::{fmt, future::Future, num::NonZeroUsize, sync::Arc};

use futures::StreamExt;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::{
    data::{Sample, SampleStore},
    endpoint::Endpoint,
    error::{ClientErr, Result},
    model::ModelClient,
    progress::ProgressSink,
    service::TrainingService,
};

/// Lifecycle states of the client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Evaluating,
    Training,
    Connecting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Evaluating => "evaluating",
            Phase::Training => "training",
            Phase::Connecting => "connecting",
        };
        write!(f, "{s}")
    }
}

/// Releases the session back to `Idle` when the operation ends, success
/// or failure.
struct PhaseGuard {
    phase: Arc<Mutex<Phase>>,
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        *self.phase.lock() = Phase::Idle;
    }
}

/// Sequences evaluate/train/connect operations against a long-lived local
/// model and a remote training service.
///
/// At most one operation runs at a time; requests made while busy are
/// rejected with `SessionBusy`, never queued. Accepted operations run on a
/// spawned task so the invoking context never blocks, and every accepted
/// operation produces exactly one terminal report through the sink after
/// the session has returned to `Idle`. Failures inside an operation are
/// caught at this boundary and reported, never re-raised.
pub struct SessionController<M, S>
where
    M: ModelClient,
    S: TrainingService<M>,
{
    store: Arc<Mutex<SampleStore<M::Features, M::Label>>>,
    model: Arc<tokio::sync::Mutex<M>>,
    service: Arc<S>,
    phase: Arc<Mutex<Phase>>,
    sink: Arc<dyn ProgressSink>,
    evaluated: watch::Sender<bool>,
}

impl<M, S> SessionController<M, S>
where
    M: ModelClient,
    S: TrainingService<M>,
{
    /// Creates an idle controller with an empty sample store.
    ///
    /// # Args
    /// * `model` - The on-device model runtime.
    /// * `service` - The transport to the coordinating server.
    /// * `sink` - Where progress and outcome messages go.
    pub fn new(model: M, service: S, sink: Arc<dyn ProgressSink>) -> Self {
        let (evaluated, _) = watch::channel(false);
        Self {
            store: Arc::new(Mutex::new(SampleStore::new())),
            model: Arc::new(tokio::sync::Mutex::new(model)),
            service: Arc::new(service),
            phase: Arc::new(Mutex::new(Phase::Idle)),
            sink,
            evaluated,
        }
    }

    /// Current lifecycle state.
    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    /// Appends one example to the designated sequence of the store.
    pub fn add_sample(&self, features: M::Features, label: M::Label, training: bool) {
        self.store.lock().add(features, label, training);
    }

    /// Bulk-loads a prepared dataset into the designated sequence.
    pub fn load_samples<I>(&self, samples: I, training: bool)
    where
        I: IntoIterator<Item = Sample<M::Features, M::Label>>,
    {
        let mut store = self.store.lock();
        for sample in samples {
            store.add(sample.features, sample.label, training);
        }
    }

    /// Returns `(training, test)` sample counts.
    pub fn sample_counts(&self) -> (usize, usize) {
        let store = self.store.lock();
        (store.training_count(), store.test_count())
    }

    /// Clears both sample sequences.
    ///
    /// # Errors
    /// Returns `SessionBusy` while an operation is active; clearing under
    /// a running delegate would pull samples out from under it.
    pub fn reset_samples(&self) -> Result<()> {
        let phase = self.phase.lock();
        if *phase != Phase::Idle {
            return Err(ClientErr::SessionBusy { phase: *phase });
        }
        self.store.lock().reset();
        Ok(())
    }

    /// Subscription that flips to `true` the first time an evaluation
    /// completes successfully.
    pub fn on_evaluate_complete(&self) -> watch::Receiver<bool> {
        self.evaluated.subscribe()
    }

    /// Evaluates the model over the test samples in the background.
    ///
    /// An empty test set is allowed; the degenerate loss is whatever the
    /// model returns for it.
    ///
    /// # Errors
    /// Returns `SessionBusy` if another operation is active. Once accepted
    /// the call never fails; the outcome arrives through the sink.
    pub fn evaluate(&self) -> Result<()> {
        let guard = self.begin(Phase::Evaluating)?;
        let samples = self.store.lock().test_samples().to_vec();
        let model = Arc::clone(&self.model);
        let evaluated = self.evaluated.clone();

        info!(samples = samples.len(); "starting evaluation");
        self.sink.report("Evaluating...");
        self.spawn_op(guard, "evaluate", async move {
            let evaluation = model.lock().await.evaluate(&samples).await?;
            debug!(
                loss = evaluation.loss as f64, accuracy = evaluation.accuracy as f64;
                "evaluation finished"
            );
            let _ = evaluated.send(true);
            Ok(format!("Evaluation loss is {:?}.", evaluation.loss))
        });

        Ok(())
    }

    /// Trains the model over the training samples in the background,
    /// reporting each epoch's loss as it becomes available.
    ///
    /// # Errors
    /// Returns `NoTrainingSamples` on an empty training set and
    /// `SessionBusy` if another operation is active, both before any state
    /// change. Once accepted the call never fails; epoch losses and the
    /// outcome arrive through the sink.
    pub fn train(&self, epochs: NonZeroUsize) -> Result<()> {
        if self.store.lock().training_count() == 0 {
            return Err(ClientErr::NoTrainingSamples);
        }

        let guard = self.begin(Phase::Training)?;
        let samples = self.store.lock().training_samples().to_vec();
        let model = Arc::clone(&self.model);
        let sink = Arc::clone(&self.sink);

        info!(epochs = epochs.get(), samples = samples.len(); "starting local training");
        self.sink.report("Started training.");
        self.spawn_op(guard, "train", async move {
            let mut model = model.lock().await;
            let mut losses = model.fit(epochs, &samples);
            let mut epoch = 0usize;

            // Stream each loss out as soon as the model yields it; the
            // first error aborts the remaining epochs.
            while let Some(step) = losses.next().await {
                let loss = step?;
                epoch += 1;
                debug!(epoch = epoch; "epoch finished");
                sink.report(&format!("Epoch {epoch} loss is {loss:?}."));
            }

            Ok("Training successful.".to_owned())
        });

        Ok(())
    }

    /// Connects to the coordinating server and lets it drive train and
    /// evaluate rounds against the local model, forwarding every remote
    /// progress event to the sink.
    ///
    /// # Errors
    /// Returns `InvalidEndpoint` for a malformed `host:port` string and
    /// `SessionBusy` if another operation is active, both before any state
    /// change and without touching the service. Once accepted the call
    /// never fails; the outcome arrives through the sink.
    pub fn connect_and_train(&self, endpoint: &str) -> Result<()> {
        let endpoint = Endpoint::parse(endpoint)?;
        let guard = self.begin(Phase::Connecting)?;
        let model = Arc::clone(&self.model);
        let service = Arc::clone(&self.service);
        let sink = Arc::clone(&self.sink);

        info!("connecting to {endpoint}");
        self.sink.report(&format!("Connecting to {endpoint}..."));
        self.spawn_op(guard, "connect", async move {
            let mut events = service.connect(&endpoint, model).await?;
            sink.report("Connected to the training server.");

            while let Some(event) = events.next().await {
                match event {
                    Ok(message) => sink.report(&message),
                    Err(err) => {
                        warn!("remote session against {endpoint} broke down: {err}");
                        return Ok(format!("Remote session failed: {err}"));
                    }
                }
            }

            Ok("Remote session finished.".to_owned())
        });

        Ok(())
    }

    /// Claims the session for `next`, or rejects if one is active.
    fn begin(&self, next: Phase) -> Result<PhaseGuard> {
        let mut phase = self.phase.lock();
        if *phase != Phase::Idle {
            return Err(ClientErr::SessionBusy { phase: *phase });
        }
        *phase = next;
        Ok(PhaseGuard {
            phase: Arc::clone(&self.phase),
        })
    }

    /// Runs `work` on a spawned task and converts its result into the
    /// operation's single terminal report.
    ///
    /// This is the one place failures are caught; no operation re-raises
    /// into the invoking context. The terminal report goes out only after
    /// the guard has released the session back to `Idle`, so an observer
    /// that sees the outcome also sees an idle session.
    fn spawn_op<W>(&self, guard: PhaseGuard, label: &'static str, work: W)
    where
        W: Future<Output = Result<String>> + Send + 'static,
    {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let outcome = match work.await {
                Ok(message) => message,
                Err(err) => {
                    error!("{label} failed: {err}");
                    format!("Failed to {label}: {err}")
                }
            };
            drop(guard);
            sink.report(&outcome);
        });
    }
}
