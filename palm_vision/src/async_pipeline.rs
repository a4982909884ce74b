// THEORY:
// The `PipelineWorker` puts a `SegmentationPipeline` behind a channel so that a
// capture loop, a UI and a test harness can all talk to one engine without
// sharing it.
//
// Key architectural principles:
// 1.  **Actor Ownership**: A single tokio task owns the pipeline. Every request is a
//     message, and every answer comes back on its own oneshot channel.
// 2.  **Recalibration Between Frames**: Messages are handled strictly one at a
//     time, in arrival order. A recalibration therefore always lands between two
//     frames and never while a frame is being segmented against the old models.
// 3.  **Backpressure**: The request channel is bounded. A producer that outruns the
//     engine waits instead of queueing frames without limit.
// 4.  **Clean Shutdown**: `shutdown` stops the task and hands the pipeline back.
//     Dropping the worker asks the task to stop on a best-effort basis.
// 5.  **Frames Off the Runtime**: Segmentation is CPU-bound, so each frame runs on
//     tokio's blocking pool. The actor task only shuttles the pipeline there and back.

use crate::error::{Error, Result};
use crate::pipeline::{DisplayOptions, FrameReport, Hsv, SegmentationPipeline};
use image::RgbImage;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Message type for the pipeline actor
enum PipelineMessage {
    Process(RgbImage, oneshot::Sender<FrameReport>),
    Recalibrate(Vec<Hsv>, oneshot::Sender<Result<()>>),
    Adjust(Adjustment, oneshot::Sender<Result<()>>),
    Shutdown,
}

/// A live setting change, applied between frames.
enum Adjustment {
    Threshold(f32),
    Display(DisplayOptions),
}

/// Handle to a segmentation pipeline running on its own task.
pub struct PipelineWorker {
    sender: mpsc::Sender<PipelineMessage>,
    /// Yields `None` if a frame panicked and took the pipeline with it.
    handle: Option<JoinHandle<Option<SegmentationPipeline>>>,
}

impl PipelineWorker {
    /// Moves `pipeline` onto a new task. Must be called from within a tokio runtime.
    pub fn spawn(pipeline: SegmentationPipeline, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<PipelineMessage>(capacity.max(1));

        let handle = tokio::spawn(async move {
            let mut pipeline = pipeline;
            while let Some(message) = receiver.recv().await {
                match message {
                    PipelineMessage::Process(frame, reply) => {
                        let job = tokio::task::spawn_blocking(move || {
                            let report = pipeline.process_frame(&frame);
                            (pipeline, report)
                        });
                        match job.await {
                            Ok((returned, report)) => {
                                pipeline = returned;
                                let _ = reply.send(report);
                            }
                            Err(e) => {
                                error!(error = %e, "frame processing failed; pipeline worker stopped");
                                return None;
                            }
                        }
                    }
                    PipelineMessage::Recalibrate(samples, reply) => {
                        let _ = reply.send(pipeline.recalibrate(&samples));
                    }
                    PipelineMessage::Adjust(Adjustment::Threshold(threshold), reply) => {
                        let _ = reply.send(pipeline.set_threshold(threshold));
                    }
                    PipelineMessage::Adjust(Adjustment::Display(display), reply) => {
                        pipeline.set_display(display);
                        let _ = reply.send(Ok(()));
                    }
                    PipelineMessage::Shutdown => break,
                }
            }
            debug!("pipeline worker stopped");
            Some(pipeline)
        });

        Self {
            sender,
            handle: Some(handle),
        }
    }

    pub async fn process_frame(&self, frame: RgbImage) -> Result<FrameReport> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(PipelineMessage::Process(frame, reply))
            .await
            .map_err(|_| Error::WorkerClosed)?;
        response.await.map_err(|_| Error::WorkerClosed)
    }

    /// Swaps in a classifier calibrated on `samples` once the frames queued ahead
    /// of it are done.
    pub async fn recalibrate(&self, samples: Vec<Hsv>) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(PipelineMessage::Recalibrate(samples, reply))
            .await
            .map_err(|_| Error::WorkerClosed)?;
        response.await.map_err(|_| Error::WorkerClosed)?
    }

    /// Changes the skin threshold for the frames queued after this call.
    pub async fn set_threshold(&self, threshold: f32) -> Result<()> {
        self.adjust(Adjustment::Threshold(threshold)).await
    }

    /// Changes the debug recoloring for the frames queued after this call.
    pub async fn set_display(&self, display: DisplayOptions) -> Result<()> {
        self.adjust(Adjustment::Display(display)).await
    }

    async fn adjust(&self, adjustment: Adjustment) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(PipelineMessage::Adjust(adjustment, reply))
            .await
            .map_err(|_| Error::WorkerClosed)?;
        response.await.map_err(|_| Error::WorkerClosed)?
    }

    /// Stops the worker after the queued requests and returns the pipeline.
    pub async fn shutdown(mut self) -> Result<SegmentationPipeline> {
        let handle = self.handle.take().ok_or(Error::WorkerClosed)?;
        self.sender
            .send(PipelineMessage::Shutdown)
            .await
            .map_err(|_| Error::WorkerClosed)?;
        handle.await.ok().flatten().ok_or(Error::WorkerClosed)
    }
}

impl Drop for PipelineWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.sender.try_send(PipelineMessage::Shutdown);
        }
    }
}
