//! Benchmark for the render chain and WAV encoding

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recap_audio::{
    audio::encode_wav,
    effects::{render, EffectsConfig},
    text::generate_srt,
    SampleBuffer, SAMPLE_RATE,
};

fn narration(seconds: usize) -> SampleBuffer {
    let num_samples = SAMPLE_RATE as usize * seconds;
    let signal: Vec<f32> = (0..num_samples)
        .map(|i| 0.6 * (i as f32 * 0.01).sin() * (i as f32 * 0.0003).cos())
        .collect();
    SampleBuffer::mono(signal, SAMPLE_RATE)
}

fn bench_render(c: &mut Criterion) {
    let clip = narration(1);
    let mastered = EffectsConfig::default();
    let limiter_only = EffectsConfig::new(1.05, false);

    c.bench_function("render_1s_mastered", |b| {
        b.iter(|| render(black_box(&clip), black_box(&mastered)))
    });

    c.bench_function("render_1s_limiter_only", |b| {
        b.iter(|| render(black_box(&clip), black_box(&limiter_only)))
    });

    // Generate 10 seconds of audio
    let long_clip = narration(10);

    c.bench_function("render_10s_mastered", |b| {
        b.iter(|| render(black_box(&long_clip), black_box(&mastered)))
    });
}

fn bench_encode(c: &mut Criterion) {
    let clip = narration(10);

    c.bench_function("encode_wav_10s", |b| b.iter(|| encode_wav(black_box(&clip))));
}

fn bench_subtitles(c: &mut Criterion) {
    let script = "The storm rolls in. Nobody on the train notices! Why would they? ".repeat(50);

    c.bench_function("generate_srt_150_cues", |b| {
        b.iter(|| generate_srt(black_box(&script), black_box(600.0)))
    });
}

criterion_group!(benches, bench_render, bench_encode, bench_subtitles);
criterion_main!(benches);
