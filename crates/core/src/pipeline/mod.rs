use crate::config::DEFAULT_TICK_INTERVAL_MS;
use crate::emotion::{
    detect_emotion, BehavioralData, DetectionError, EmotionClassifier, FaceDetector,
    PhysiologicalData, VideoFrame,
};
use crate::history::EmotionHistoryStore;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    DeviceAccess(String),
    #[error("model initialisation failed: {0}")]
    ModelInit(String),
    #[error("frame capture failed: {0}")]
    Frame(String),
    #[error(transparent)]
    Detection(#[from] DetectionError),
}

/// The camera.
pub trait FrameSource: Send {
    fn open(&mut self) -> BoxFuture<'_, Result<(), CaptureError>>;
    fn next_frame(&mut self) -> BoxFuture<'_, Result<VideoFrame, CaptureError>>;
    fn release(&mut self);
}

/// Behavioral and physiological context attached to each observation.
pub trait ContextSource: Send + Sync {
    fn snapshot(&self) -> (BehavioralData, PhysiologicalData);
}

/// Context that never changes.
#[derive(Clone, Debug, Default)]
pub struct StaticContext {
    pub behavioral: BehavioralData,
    pub physiological: PhysiologicalData,
}

impl ContextSource for StaticContext {
    fn snapshot(&self) -> (BehavioralData, PhysiologicalData) {
        (self.behavioral.clone(), self.physiological)
    }
}

#[derive(Clone, Debug)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Captures frames, classifies them and appends one record per successful tick.
pub struct CapturePipeline<F, D, C, X> {
    source: F,
    detector: D,
    classifier: C,
    context: X,
    tick_interval: Duration,
    running: Arc<AtomicBool>,
}

impl<F, D, C, X> CapturePipeline<F, D, C, X>
where
    F: FrameSource,
    D: FaceDetector,
    C: EmotionClassifier,
    X: ContextSource,
{
    pub fn new(source: F, detector: D, classifier: C, context: X) -> Self {
        Self {
            source,
            detector,
            classifier,
            context,
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Zero means the next tick starts as soon as the runtime gets back to us.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.running.clone())
    }

    /// Runs until stopped. Returns the number of records appended.
    ///
    /// Once opened, the camera is released on every exit path, including when
    /// the returned future is dropped before completion.
    pub async fn run(&mut self, store: Arc<Mutex<EmotionHistoryStore>>) -> Result<u64, CaptureError> {
        let Self {
            source,
            detector,
            classifier,
            context,
            tick_interval,
            running,
        } = self;

        source.open().await?;
        let camera = OpenCamera(source);
        tracing::info!(tick_ms = tick_interval.as_millis() as u64, "capture started");

        let mut recorded = 0u64;
        let result = loop {
            if !running.load(Ordering::SeqCst) {
                break Ok(recorded);
            }

            match tick(&mut *camera.0, &*detector, &*classifier, &*context, &store).await {
                Ok(()) => recorded += 1,
                Err(CaptureError::Detection(DetectionError::ModelUnavailable(msg))) => {
                    break Err(CaptureError::ModelInit(msg));
                }
                Err(e) => tracing::warn!(error = %e, "capture tick failed"),
            }

            if tick_interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(*tick_interval).await;
            }
        };
        drop(camera);

        match &result {
            Ok(recorded) => tracing::info!(recorded, "capture stopped"),
            Err(e) => tracing::error!(error = %e, "capture aborted"),
        }
        result
    }
}

/// Releases an opened camera when dropped.
struct OpenCamera<'a, F: FrameSource>(&'a mut F);

impl<F: FrameSource> Drop for OpenCamera<'_, F> {
    fn drop(&mut self) {
        self.0.release();
        tracing::debug!("camera released");
    }
}

async fn tick<F, D, C, X>(
    camera: &mut F,
    detector: &D,
    classifier: &C,
    context: &X,
    store: &Mutex<EmotionHistoryStore>,
) -> Result<(), CaptureError>
where
    F: FrameSource,
    D: FaceDetector,
    C: EmotionClassifier,
    X: ContextSource,
{
    let frame = camera.next_frame().await?;
    let (classification, landmarks) = detect_emotion(detector, classifier, &frame).await?;
    let (behavioral, physiological) = context.snapshot();

    // never held across an await
    let mut store = store.lock().unwrap_or_else(|e| e.into_inner());
    let id = store.add_record(
        classification.emotion,
        classification.confidence,
        landmarks,
        behavioral,
        physiological,
        None,
    );
    tracing::debug!(
        %id,
        emotion = %classification.emotion,
        confidence = classification.confidence,
        "emotion recorded"
    );
    Ok(())
}
