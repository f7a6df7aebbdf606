/// Sound effects for jumping, landing, placing and cycling blocks.
///
/// Each effect is synthesized once at startup into a WAV buffer and
/// played on a detached rodio Sink, so playback never blocks the loop.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::{gen_cycle, gen_jump, gen_land, gen_place, make_wav};

    #[derive(Clone, Copy)]
    enum Sfx {
        Jump,
        Land,
        Place,
        Cycle,
    }

    pub struct SoundEngine {
        // Dropping the stream stops all output.
        _stream: OutputStream,
        handle: OutputStreamHandle,
        clips: [Arc<[u8]>; 4],
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| log::debug!("no audio output: {e}"))
                .ok()?;

            let clips = [gen_jump(), gen_land(), gen_place(), gen_cycle()]
                .map(|samples| Arc::from(make_wav(&samples)));

            Some(SoundEngine { _stream: stream, handle, clips })
        }

        fn play(&self, sfx: Sfx) {
            let clip = Arc::clone(&self.clips[sfx as usize]);
            let played = Sink::try_new(&self.handle)
                .map_err(|e| e.to_string())
                .and_then(|sink| {
                    let src = Decoder::new(Cursor::new(clip)).map_err(|e| e.to_string())?;
                    sink.append(src);
                    sink.detach();
                    Ok(())
                });
            if let Err(e) = played {
                log::trace!("sound playback skipped: {e}");
            }
        }

        pub fn play_jump(&self) { self.play(Sfx::Jump); }
        pub fn play_land(&self) { self.play(Sfx::Land); }
        pub fn play_place(&self) { self.play(Sfx::Place); }
        pub fn play_cycle(&self) { self.play(Sfx::Cycle); }
    }
}

// ── Waveforms (mono f32 samples in [-1, 1]) ──

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn sample_count(seconds: f32) -> usize {
    (SAMPLE_RATE as f32 * seconds) as usize
}

/// Linear frequency glide from `from` to `to` Hz, fading out.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_sweep(from: f32, to: f32, seconds: f32, volume: f32) -> Vec<f32> {
    let n = sample_count(seconds);
    let step = std::f32::consts::TAU / SAMPLE_RATE as f32;
    let mut phase = 0.0_f32;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let progress = i as f32 / n as f32;
        phase += (from + (to - from) * progress) * step;
        out.push(phase.sin() * (1.0 - progress).powf(0.6) * volume);
    }
    out
}

/// Jump: rising chirp
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_jump() -> Vec<f32> {
    gen_sweep(300.0, 700.0, 0.09, 0.22)
}

/// Land: short low thump with a little hiss on top
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_land() -> Vec<f32> {
    let mut thump = gen_sweep(140.0, 80.0, 0.06, 0.2);
    let mut seed: u32 = 0x9E37_79B9;
    let len = thump.len() as f32;
    for (i, s) in thump.iter_mut().enumerate() {
        // xorshift noise
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let hiss = seed as f32 / u32::MAX as f32 - 0.5;
        *s += hiss * 0.1 * (1.0 - i as f32 / len);
    }
    thump
}

/// Place: two quick ascending notes
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_place() -> Vec<f32> {
    [523.0_f32, 784.0]
        .iter()
        .flat_map(|&f| gen_sweep(f, f, 0.04, 0.25))
        .collect()
}

/// Cycle: single tick
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_cycle() -> Vec<f32> {
    gen_sweep(1200.0, 1200.0, 0.03, 0.15)
}

// ── WAV container (16-bit PCM mono) ──

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    const HEADER_LEN: usize = 44;
    let data_len = (samples.len() * 2) as u32;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);
    let fields: [&[u8]; 12] = [
        b"RIFF",
        &(data_len + 36).to_le_bytes(),
        b"WAVEfmt ",
        &16u32.to_le_bytes(),             // fmt chunk length
        &1u16.to_le_bytes(),              // PCM
        &1u16.to_le_bytes(),              // channels
        &SAMPLE_RATE.to_le_bytes(),
        &(SAMPLE_RATE * 2).to_le_bytes(), // bytes per second
        &2u16.to_le_bytes(),              // bytes per frame
        &16u16.to_le_bytes(),             // bits per sample
        b"data",
        &data_len.to_le_bytes(),
    ];
    for f in fields {
        out.extend_from_slice(f);
    }
    out.extend(
        samples
            .iter()
            .flat_map(|s| ((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes()),
    );
    out
}

// ── Public API (no-ops without the sound feature) ──

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_land(&self) {}
    pub fn play_place(&self) {}
    pub fn play_cycle(&self) {}
}
