//! Demo stem-separation job
//!
//! Validates an upload and describes the stems a separation would produce.
//! Nothing is decoded or separated; the tracks point at placeholder URLs
//! and are played back by simulated players.

use crate::player::{AudioPlayer, AudioPlayerBuilder, TrackInfo};
use crate::utils::config::{PlayerConfig, SeparationConfig};
use crate::utils::error::{Result, StemSplitError};
use crate::waveform::StemColor;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Length reported for every produced stem, in seconds
pub const STEM_DURATION_SECS: u32 = 204;

const PROCESSING_TIME_SECS: f64 = 2.5;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Instrument a stem can be extracted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Vocals,
    Drums,
    Bass,
    Guitar,
    Piano,
    Other,
}

impl Instrument {
    pub const ALL: [Instrument; 6] = [
        Instrument::Vocals,
        Instrument::Drums,
        Instrument::Bass,
        Instrument::Guitar,
        Instrument::Piano,
        Instrument::Other,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Instrument::Vocals => "vocals",
            Instrument::Drums => "drums",
            Instrument::Bass => "bass",
            Instrument::Guitar => "guitar",
            Instrument::Piano => "piano",
            Instrument::Other => "other",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Instrument::Vocals => "Vocals",
            Instrument::Drums => "Drums",
            Instrument::Bass => "Bass",
            Instrument::Guitar => "Guitar",
            Instrument::Piano => "Piano",
            Instrument::Other => "Other",
        }
    }

    pub fn color(self) -> StemColor {
        match self {
            Instrument::Vocals | Instrument::Guitar => StemColor::Primary,
            Instrument::Drums | Instrument::Piano => StemColor::Secondary,
            Instrument::Bass | Instrument::Other => StemColor::Accent,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Instrument {
    type Err = StemSplitError;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim().to_ascii_lowercase();
        Instrument::ALL
            .into_iter()
            .find(|i| i.id() == id)
            .ok_or_else(|| StemSplitError::InvalidInput(format!("Unknown instrument '{}'", s)))
    }
}

/// Uploaded mix to separate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRequest {
    pub filename: String,
    pub size_bytes: u64,
    /// Empty means the configured defaults
    pub instruments: Vec<Instrument>,
}

impl SplitRequest {
    /// Describe an audio file on disk
    pub fn from_file(path: &Path, instruments: Vec<Instrument>) -> Result<Self> {
        if !path.exists() {
            return Err(StemSplitError::NotFound(format!("{}", path.display())));
        }

        let size_bytes = std::fs::metadata(path)?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track.mp3".to_string());

        Ok(Self {
            filename,
            size_bytes,
            instruments,
        })
    }
}

/// One extracted stem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemTrack {
    pub name: String,
    pub url: String,
    pub size: u64,
    pub duration: u32,
}

impl StemTrack {
    pub fn track_info(&self, instrument: Instrument) -> TrackInfo {
        TrackInfo::new(self.name.clone())
            .with_url(self.url.clone())
            .with_color(instrument.color())
    }

    /// Mount a simulated player for this stem
    pub fn player(&self, instrument: Instrument, config: &PlayerConfig) -> AudioPlayer {
        let config = PlayerConfig {
            default_duration: f64::from(self.duration),
            ..config.clone()
        };
        AudioPlayerBuilder::new(self.track_info(instrument))
            .with_config(config)
            .build()
    }
}

/// The uploaded mix as echoed back in a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalFile {
    pub filename: String,
    pub size: u64,
}

/// Outcome of a demo separation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitResult {
    pub success: bool,
    pub tracks: BTreeMap<Instrument, StemTrack>,
    pub original: OriginalFile,
    pub processing_time: f64,
    pub demo_mode: bool,
    pub message: String,
}

impl SplitResult {
    pub fn track(&self, instrument: Instrument) -> Option<&StemTrack> {
        self.tracks.get(&instrument)
    }
}

/// Validate a request and describe the stems it would produce
pub fn split(request: &SplitRequest, config: &SeparationConfig, job_id: &str) -> Result<SplitResult> {
    if request.size_bytes == 0 {
        return Err(StemSplitError::Separation("No audio data provided".to_string()));
    }

    if request.size_bytes > config.max_upload_mb.saturating_mul(BYTES_PER_MB) {
        return Err(StemSplitError::Separation(format!(
            "File too large. Maximum size is {}MB",
            config.max_upload_mb
        )));
    }

    let mut instruments = if request.instruments.is_empty() {
        config
            .default_instruments
            .iter()
            .map(|id| id.parse())
            .collect::<Result<Vec<Instrument>>>()?
    } else {
        request.instruments.clone()
    };
    instruments.sort();
    instruments.dedup();

    if instruments.is_empty() {
        return Err(StemSplitError::Separation("No instruments selected".to_string()));
    }

    let base_url = config.output_base_url.trim_end_matches('/');
    let stem_size = request.size_bytes / instruments.len() as u64;

    let tracks = instruments
        .iter()
        .map(|&instrument| {
            let track = StemTrack {
                name: format!("{}.wav", instrument),
                url: format!("{}/{}/{}.wav", base_url, job_id, instrument),
                size: stem_size,
                duration: STEM_DURATION_SECS,
            };
            debug!("Stem {} -> {}", instrument, track.url);
            (instrument, track)
        })
        .collect();

    info!(
        "Demo split of {} ({} bytes) into {} stems",
        request.filename,
        request.size_bytes,
        instruments.len()
    );

    Ok(SplitResult {
        success: true,
        tracks,
        original: OriginalFile {
            filename: request.filename.clone(),
            size: request.size_bytes,
        },
        processing_time: PROCESSING_TIME_SECS,
        demo_mode: true,
        message: "Demo mode: real separation requires a Spleeter/Demucs model".to_string(),
    })
}

/// Run a split with a fresh job id
pub fn split_new_job(request: &SplitRequest, config: &SeparationConfig) -> Result<SplitResult> {
    let job_id = uuid::Uuid::new_v4().to_string();
    split(request, config, &job_id)
}
