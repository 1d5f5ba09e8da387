//! End-to-end narration render

use super::{resolve_speed, Artifact, PipelineStage};
use crate::{
    audio::{encode_wav, linear_to_db, SampleBuffer},
    config::Config,
    effects::{self, EffectsConfig},
    text::{clean_script, normalize_whitespace, segment, to_srt, SubtitleSegment},
    Result,
};
use std::time::Instant;

/// Everything produced by one successful run
#[derive(Debug, Clone)]
pub struct RecapOutput {
    /// Rendered audio
    pub rendered: SampleBuffer,
    /// Speed actually applied
    pub speed: f64,
    /// WAV download
    pub audio: Artifact,
    /// SRT download (absent when subtitles are disabled)
    pub subtitles: Option<Artifact>,
    /// Timed caption cues
    pub segments: Vec<SubtitleSegment>,
    /// Processing time in seconds
    pub processing_time: f32,
}

impl RecapOutput {
    /// Rendered duration in seconds
    pub fn duration(&self) -> f64 {
        self.rendered.duration()
    }

    /// Get duration formatted as MM:SS
    pub fn duration_formatted(&self) -> String {
        let duration = self.duration();
        let minutes = (duration / 60.0) as u32;
        let seconds = (duration % 60.0) as u32;
        format!("{:02}:{:02}", minutes, seconds)
    }

    /// Real-time factor (processing time / audio time)
    pub fn rtf(&self) -> f32 {
        let duration = self.duration() as f32;
        if duration <= 0.0 {
            return 0.0;
        }
        self.processing_time / duration
    }
}

/// Narration post-production pipeline
#[derive(Debug, Clone)]
pub struct RecapPipeline {
    config: Config,
}

impl RecapPipeline {
    /// Create a pipeline from validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn decode(&self, blob: &str) -> Result<SampleBuffer> {
        log::debug!("Stage: {}", PipelineStage::Decode.name());
        self.config.input.decode_blob(blob)
    }

    fn effects_for(&self, source: &SampleBuffer) -> EffectsConfig {
        let speed = resolve_speed(
            self.config.effects.speed,
            source.duration(),
            self.config.sync.target_duration,
        );
        self.config.effects.with_speed(speed)
    }

    /// Encode and time subtitles for an already rendered buffer
    fn finish(
        &self,
        rendered: SampleBuffer,
        settings: &EffectsConfig,
        script: &str,
        start: Instant,
    ) -> Result<RecapOutput> {
        let title = &self.config.output.title;

        log::debug!(
            "Output level: peak {:.2} dBFS, RMS {:.2} dBFS",
            linear_to_db(rendered.peak()),
            linear_to_db(rendered.rms())
        );

        log::debug!("Stage: {}", PipelineStage::Encode.name());
        let audio = Artifact::wav(title, encode_wav(&rendered)?);

        let (segments, subtitles) = if self.config.output.subtitles {
            log::debug!("Stage: {}", PipelineStage::Subtitles.name());
            let cleaned = clean_script(script);
            let segments = segment(&cleaned, rendered.duration());
            let srt = Artifact::srt(title, to_srt(&segments));
            (segments, Some(srt))
        } else {
            (Vec::new(), None)
        };

        let output = RecapOutput {
            rendered,
            speed: settings.speed,
            audio,
            subtitles,
            segments,
            processing_time: start.elapsed().as_secs_f32(),
        };

        log::info!(
            "Rendered {} at {:.3}x ({} cue(s), {} bytes)",
            output.duration_formatted(),
            output.speed,
            output.segments.len(),
            output.audio.len()
        );

        Ok(output)
    }

    /// Run the full pipeline on a base64 PCM blob and its narration script
    pub fn process(&self, blob: &str, script: &str) -> Result<RecapOutput> {
        let start = Instant::now();
        let source = self.decode(blob)?;
        self.process_from(source, script, start)
    }

    /// Run the pipeline on audio that is already decoded
    pub fn process_buffer(&self, source: &SampleBuffer, script: &str) -> Result<RecapOutput> {
        self.process_from(source.clone(), script, Instant::now())
    }

    fn process_from(&self, source: SampleBuffer, script: &str, start: Instant) -> Result<RecapOutput> {
        log::info!(
            "Processing {:.2}s of narration: {}",
            source.duration(),
            preview_text(script)
        );

        let settings = self.effects_for(&source);
        log::debug!("Stage: {}", PipelineStage::Render.name());
        let rendered = effects::render(&source, &settings)?;

        self.finish(rendered, &settings, script, start)
    }

    /// Awaitable variant of [`Self::process`]; the render runs off the async executor
    pub async fn process_async(&self, blob: &str, script: &str) -> Result<RecapOutput> {
        let start = Instant::now();
        let source = self.decode(blob)?;
        let settings = self.effects_for(&source);

        log::debug!("Stage: {}", PipelineStage::Render.name());
        let rendered = effects::render_async(source, settings).await?;

        self.finish(rendered, &settings, script, start)
    }

    /// Render and encode only, for auditioning a voice
    pub fn preview(&self, blob: &str) -> Result<Artifact> {
        let source = self.decode(blob)?;
        let rendered = effects::render(&source, &self.effects_for(&source))?;
        let bytes = encode_wav(&rendered)?;
        Ok(Artifact::wav(&self.config.output.title, bytes))
    }
}

fn preview_text(script: &str) -> String {
    let flat = normalize_whitespace(script);
    match flat.char_indices().nth(60) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}
