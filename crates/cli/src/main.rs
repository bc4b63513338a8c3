#![deny(warnings)]

use anyhow::Context;
use bytes::Bytes;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use wellness_core::audio::{split_blocks, PitchEstimator};
use wellness_core::chat::{CannedResponder, VoiceChatSession};
use wellness_core::config::{
    resolve_speech_config, AppConfig, AudioConfig, Env, HistoryConfig, SensorConfig, StdEnv,
    DEFAULT_AUDIO_SAMPLE_RATE_HZ, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_RECORDS,
    DEFAULT_SUMMARY_INTERVAL_SECS,
};
use wellness_core::diary::format_diary;
use wellness_core::history::{EmotionHistoryStore, EmotionRecord, ManualClock, DIARY_TREND_LEN};
use wellness_core::speech::{AudioPayload, GoogleSpeechClient};
use wellness_core::summary::{generate_summary, EmotionSummary};
use wellness_core::validator::{check_quality, validate, MultimodalSnapshot};

/// Blocks queued ahead of the estimator worker.
const PITCH_QUEUE_DEPTH: usize = 16;

#[derive(Parser, Debug)]
#[command(name = "wellness")]
#[command(about = "Emotion history, diary and multimodal validation tools")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RECORDS)]
    max_records: usize,

    #[arg(long, global = true, default_value_t = DEFAULT_SUMMARY_INTERVAL_SECS)]
    summary_interval_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a JSON array of emotion records.
    Summary {
        #[arg(long)]
        input: PathBuf,
        /// Restrict to one local calendar day (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Render the diary entry for a JSON array of emotion records.
    Diary {
        #[arg(long)]
        input: PathBuf,
    },
    /// Cross-check a multimodal snapshot.
    Validate {
        #[arg(long)]
        input: PathBuf,
        /// Also run the per-sensor quality checks.
        #[arg(long)]
        quality: bool,
        #[arg(long)]
        no_video: bool,
        #[arg(long)]
        no_audio: bool,
        #[arg(long)]
        physiological: bool,
    },
    /// Estimate pitch and intensity per block of raw little-endian f32 samples.
    Pitch {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = DEFAULT_AUDIO_SAMPLE_RATE_HZ)]
        sample_rate: u32,
        #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,
    },
    /// Transcribe a 16-bit little-endian PCM recording and reply to it.
    Chat {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let cfg = build_config(&args, &env)?;
    tracing::debug!(
        max_records = cfg.history.max_records,
        summary_interval_secs = cfg.history.summary_interval.as_secs(),
        "config loaded"
    );

    match args.command {
        Command::Summary { input, date } => {
            let store = load_store(&input, &cfg)?;
            let summary = match date {
                Some(d) => store.summary_by_date(d),
                None => loaded_summary(&store),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Diary { input } => {
            let store = load_store(&input, &cfg)?;
            println!("{}", loaded_diary(&store));
        }
        Command::Validate { input, quality, .. } => {
            let snapshot: MultimodalSnapshot = read_json(&input)?;
            println!("{}", serde_json::to_string_pretty(&validate(&snapshot))?);
            if quality {
                let report = check_quality(&snapshot, &cfg.sensors);
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Command::Pitch { input, .. } => run_pitch(&input, cfg.audio).await?,
        Command::Chat { input, .. } => run_chat(&input, &cfg).await?,
    }

    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_config(args: &Args, env: &impl Env) -> anyhow::Result<AppConfig> {
    let history = HistoryConfig::new(
        args.max_records,
        Duration::from_secs(args.summary_interval_secs),
    )?;

    let audio = match &args.command {
        Command::Pitch {
            sample_rate,
            block_size,
            ..
        } => AudioConfig::new(*sample_rate, *block_size)?,
        _ => AudioConfig::default(),
    };

    let speech = match &args.command {
        Command::Chat {
            api_key,
            language,
            endpoint,
            ..
        } => Some(resolve_speech_config(
            api_key.clone(),
            language.clone(),
            endpoint.clone(),
            env,
        )?),
        _ => None,
    };

    let sensors = match &args.command {
        Command::Validate {
            no_video,
            no_audio,
            physiological,
            ..
        } => SensorConfig {
            video: !no_video,
            audio: !no_audio,
            physiological: *physiological,
        },
        _ => SensorConfig::default(),
    };

    Ok(AppConfig {
        history,
        audio,
        speech,
        sensors,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn load_store(path: &Path, cfg: &AppConfig) -> anyhow::Result<EmotionHistoryStore> {
    let records: Vec<EmotionRecord> = read_json(path)?;
    if records.is_empty() {
        tracing::warn!(path = %path.display(), "no records in input");
    }
    Ok(replay(records, cfg))
}

/// Replays recorded observations into a fresh store, keeping their timestamps.
///
/// Records get new ids on replay.
fn replay(records: Vec<EmotionRecord>, cfg: &AppConfig) -> EmotionHistoryStore {
    let Some(first) = records.first() else {
        return EmotionHistoryStore::new(cfg.history);
    };

    let clock = Arc::new(ManualClock::new(first.timestamp));
    let mut store = EmotionHistoryStore::with_clock(cfg.history, clock.clone());
    for record in records {
        clock.set(record.timestamp);
        store.add_record(
            record.emotion,
            record.confidence,
            record.landmarks,
            record.behavioral,
            record.physiological,
            record.notes,
        );
    }
    tracing::info!(records = store.len(), "history loaded");
    store
}

/// Summary over every loaded record rather than the store's rolling window.
fn loaded_summary(store: &EmotionHistoryStore) -> EmotionSummary {
    generate_summary(store.records())
}

fn loaded_diary(store: &EmotionHistoryStore) -> String {
    format_diary(&loaded_summary(store), &store.recent_records(DIARY_TREND_LEN))
}

async fn run_pitch(path: &Path, audio: AudioConfig) -> anyhow::Result<()> {
    let raw = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let samples: Vec<f32> = raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    if raw.len() % 4 != 0 {
        tracing::warn!(trailing = raw.len() % 4, "ignoring trailing bytes");
    }
    tracing::info!(
        samples = samples.len(),
        block_ms = audio.block_duration().as_millis() as u64,
        "estimating pitch"
    );

    let (block_tx, block_rx) = mpsc::channel(PITCH_QUEUE_DEPTH);
    let (mut features_rx, worker) = PitchEstimator::new(audio).spawn(block_rx);

    let blocks = split_blocks(&samples, audio.block_size);
    let feeder = tokio::spawn(async move {
        for block in blocks {
            if block_tx.send(block).await.is_err() {
                break;
            }
        }
    });

    while let Some(features) = features_rx.recv().await {
        println!("{}", serde_json::to_string(&features)?);
    }

    feeder.await.context("block feeder panicked")?;
    let processed = worker.await.context("estimator worker panicked")?;
    tracing::info!(processed, "pitch estimation finished");
    Ok(())
}

async fn run_chat(path: &Path, cfg: &AppConfig) -> anyhow::Result<()> {
    let pcm = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let speech = cfg
        .speech
        .as_ref()
        .context("speech settings were not resolved")?;
    let stt = GoogleSpeechClient::new(speech)?;
    let mut session = VoiceChatSession::new(stt, CannedResponder::default());

    session
        .handle_recording(AudioPayload {
            pcm_le16: Bytes::from(pcm),
            sample_rate_hz: speech.sample_rate_hz,
        })
        .await
        .context("speech recognition failed")?;

    for message in session.messages() {
        let who = if message.is_user { "you" } else { "assistant" };
        println!("{who}: {}", message.text);
    }
    Ok(())
}
