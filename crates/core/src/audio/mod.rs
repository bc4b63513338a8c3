mod pitch;

use crate::config::AudioConfig;
use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, task::JoinHandle};

pub use pitch::{dominant_lag, estimate_intensity, estimate_pitch};

/// One fixed-size block of mono samples from the microphone collaborator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AudioBlock {
    pub sequence: u64,
    pub samples: Vec<f32>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AudioFeatures {
    pub sequence: u64,
    pub pitch: f32,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct PitchEstimator {
    config: AudioConfig,
}

impl PitchEstimator {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> AudioConfig {
        self.config
    }

    pub fn process(&self, block: &AudioBlock) -> AudioFeatures {
        if block.samples.len() != self.config.block_size {
            tracing::debug!(
                sequence = block.sequence,
                len = block.samples.len(),
                expected = self.config.block_size,
                "audio block size differs from configured size"
            );
        }
        AudioFeatures {
            sequence: block.sequence,
            pitch: estimate_pitch(&block.samples, self.config.sample_rate_hz),
            intensity: estimate_intensity(&block.samples),
        }
    }

    /// Runs the estimator on its own task, one result per incoming block.
    ///
    /// Nothing is carried across blocks. Results are sent without backpressure.
    /// The task ends when the block sender is dropped or the result receiver
    /// goes away.
    pub fn spawn(
        self,
        mut blocks: mpsc::Receiver<AudioBlock>,
    ) -> (mpsc::UnboundedReceiver<AudioFeatures>, JoinHandle<u64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut processed = 0u64;
            while let Some(block) = blocks.recv().await {
                let features = self.process(&block);
                processed += 1;
                if tx.send(features).is_err() {
                    tracing::debug!(processed, "audio feature consumer dropped");
                    break;
                }
            }
            tracing::debug!(processed, "audio estimator stopped");
            processed
        });
        (rx, handle)
    }
}

/// Splits a sample stream into numbered blocks. The tail block may be short.
pub fn split_blocks(samples: &[f32], block_size: usize) -> Vec<AudioBlock> {
    samples
        .chunks(block_size.max(1))
        .enumerate()
        .map(|(i, chunk)| AudioBlock {
            sequence: i as u64,
            samples: chunk.to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> PitchEstimator {
        PitchEstimator::new(AudioConfig::new(16_000, 256).expect("valid"))
    }

    #[test]
    fn split_blocks_numbers_sequentially() {
        let samples = vec![0.1; 600];
        let blocks = split_blocks(&samples, 256);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].sequence, 2);
        assert_eq!(blocks[2].samples.len(), 88);
    }

    #[tokio::test]
    async fn worker_emits_one_result_per_block() {
        let (tx, rx) = mpsc::channel(4);
        let (mut results, handle) = estimator().spawn(rx);

        let sender = tokio::spawn(async move {
            for block in split_blocks(&vec![0.5; 256 * 5], 256) {
                tx.send(block).await.expect("worker alive");
            }
        });

        let mut seen = Vec::new();
        while let Some(features) = results.recv().await {
            seen.push(features);
        }
        sender.await.unwrap();

        assert_eq!(handle.await.unwrap(), 5);
        assert_eq!(
            seen.iter().map(|f| f.sequence).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
        assert!(seen.iter().all(|f| (f.intensity - 0.5).abs() < 1e-6));
    }

    #[tokio::test]
    async fn worker_stops_when_consumer_drops() {
        let (tx, rx) = mpsc::channel(4);
        let (results, handle) = estimator().spawn(rx);
        drop(results);

        tx.send(AudioBlock {
            sequence: 0,
            samples: vec![0.0; 256],
        })
        .await
        .expect("worker alive");

        assert_eq!(handle.await.unwrap(), 1);
    }

    #[test]
    fn short_block_still_processed() {
        let features = estimator().process(&AudioBlock {
            sequence: 7,
            samples: vec![1.0; 10],
        });
        assert_eq!(features.sequence, 7);
        assert!((features.intensity - 1.0).abs() < 1e-6);
    }
}
