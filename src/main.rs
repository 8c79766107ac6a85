use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use log::info;
use tokio::{sync::Mutex, time::Instant};

use fed_client::{
    ChannelSink, Endpoint, Evaluation, FloatMatrix, ModelClient, Phase, RemoteEvents, Result,
    Sample, SampleSpec, SessionController, TrainingService, model, random_samples,
};

/// Stub model runtime: no real numerics, just deterministic losses pushed
/// through the adaptation bundle so the whole pipeline is exercised.
struct StubModel {
    spec: SampleSpec<FloatMatrix, Vec<f32>>,
}

impl StubModel {
    fn new() -> Self {
        Self {
            spec: SampleSpec {
                feature_adapter: |m| m.iter().flatten().copied().collect(),
                label_adapter: |l| l.clone(),
                output_shaper: |n| vec![vec![0.0; 1]; n],
                loss_fn: model::negative_log_likelihood_loss,
                accuracy_fn: model::placeholder_accuracy,
            },
        }
    }
}

#[async_trait]
impl ModelClient for StubModel {
    type Features = FloatMatrix;
    type Label = Vec<f32>;

    async fn evaluate(&self, samples: &[Sample<FloatMatrix, Vec<f32>>]) -> Result<Evaluation> {
        let spec = self.spec;
        let inputs: Vec<Vec<f32>> = samples
            .iter()
            .map(|s| (spec.feature_adapter)(&s.features))
            .collect();
        let expected: Vec<Vec<f32>> = samples.iter().map(|s| (spec.label_adapter)(&s.label)).collect();

        // Predict the mean of each adapted input, just to have numbers.
        let mut predicted = (spec.output_shaper)(samples.len());
        for (out, input) in predicted.iter_mut().zip(&inputs) {
            let mean = input.iter().sum::<f32>() / input.len().max(1) as f32;
            out.fill(mean);
        }

        Ok(Evaluation {
            loss: (spec.loss_fn)(&expected, &predicted),
            accuracy: (spec.accuracy_fn)(&expected, &predicted),
        })
    }

    fn fit<'a>(
        &'a mut self,
        epochs: NonZeroUsize,
        samples: &'a [Sample<FloatMatrix, Vec<f32>>],
    ) -> BoxStream<'a, Result<f32>> {
        let base = samples.len().max(1) as f32;
        let losses: Vec<Result<f32>> = (1..=epochs.get())
            .map(|epoch| Ok(base.ln() / epoch as f32))
            .collect();
        stream::iter(losses).boxed()
    }
}

/// Stub transport: pretends the server drove two rounds and hung up.
struct LoopbackService;

#[async_trait]
impl TrainingService<StubModel> for LoopbackService {
    async fn connect(
        &self,
        endpoint: &Endpoint,
        _model: Arc<Mutex<StubModel>>,
    ) -> Result<RemoteEvents> {
        info!("loopback connect to {endpoint}");
        let events = vec![
            Ok("Round 1: fit requested by server.".to_owned()),
            Ok("Round 1: evaluate requested by server.".to_owned()),
            Ok("Round 2: fit requested by server.".to_owned()),
            Ok("Round 2: evaluate requested by server.".to_owned()),
        ];
        Ok(stream::iter(events).boxed())
    }
}

async fn wait_idle(controller: &SessionController<StubModel, LoopbackService>) {
    while controller.phase() != Phase::Idle {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    // Let the terminal report land before the next operation starts.
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let (sink, mut reports) = ChannelSink::channel();
    let controller = SessionController::new(StubModel::new(), LoopbackService, Arc::new(sink));

    let started = Instant::now();
    let printer = tokio::spawn(async move {
        while let Some(message) = reports.recv().await {
            println!("[{:>7.3}s] {message}", started.elapsed().as_secs_f64());
        }
    });

    controller.load_samples(random_samples(100, 7, 8, 1), true);
    controller.load_samples(random_samples(100, 7, 8, 1), false);
    let (training, test) = controller.sample_counts();
    info!(training = training, test = test; "store populated");

    controller.evaluate()?;
    wait_idle(&controller).await;

    controller.train(NonZeroUsize::new(3).unwrap())?;
    wait_idle(&controller).await;

    controller.connect_and_train("127.0.0.1:8080")?;
    wait_idle(&controller).await;

    drop(controller);
    let _ = printer.await;
    Ok(())
}
