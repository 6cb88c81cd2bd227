//! The microphone capture + AEC driver.
//!
//! Generic over its three collaborators -- [I2s], [Adc], [AecEngine] --
//! the same way `bk4819::Bk4819<Scn, Scl, Sda, Delay>` is generic over
//! its pins: no `dyn Trait`, everything monomorphizes.

use crate::aec::{AecEngine, AecParams};
use crate::channel::ChannelConfig;
use crate::collab::{Adc, I2s};
use crate::error::MicError;
use crate::pack::{self, FRAME_BYTES};

/// Largest AEC chunk size (in samples) this driver pre-allocates
/// buffer space for. The target hardware's engine uses 256 (16 ms @
/// 16 kHz); an engine reporting a larger [AecEngine::chunk_size] at
/// init is treated as a create failure (§4.11's "either failure"
/// falls back to the without-AEC path).
pub const MAX_CHUNK: usize = 256;
const MAX_CHUNK_BYTES: usize = MAX_CHUNK * FRAME_BYTES;
const MAX_CHUNK_SAMPLES: usize = MAX_CHUNK * 2;

/// A 16-byte-aligned sample buffer, sized for one AEC output chunk.
#[repr(align(16))]
pub struct AlignedBuf {
    pub samples: [i16; MAX_CHUNK],
}

impl AlignedBuf {
    const fn new() -> Self {
        Self {
            samples: [0; MAX_CHUNK],
        }
    }
}

pub struct Mic<I, A, E>
where
    I: I2s,
    A: Adc,
    E: AecEngine,
{
    i2s: I,
    adc: A,
    channel_cfg: ChannelConfig,
    voice_mask: u8,
    ref_channel: Option<u8>,
    aec_params: AecParams,
    aec: Option<E>,
    aec_out: Option<AlignedBuf>,
    initialized: bool,
    started: bool,
}

impl<I, A, E> Mic<I, A, E>
where
    I: I2s,
    A: Adc,
    E: AecEngine,
{
    pub fn new(i2s: I, adc: A, channel_cfg: ChannelConfig, aec_params: AecParams) -> Self {
        Self {
            i2s,
            adc,
            channel_cfg,
            voice_mask: 0,
            ref_channel: None,
            aec_params,
            aec: None,
            aec_out: None,
            initialized: false,
            started: false,
        }
    }

    pub fn adc(&mut self) -> &mut A {
        &mut self.adc
    }

    pub fn voice_channel_mask(&self) -> u8 {
        self.voice_mask
    }

    pub fn ref_channel(&self) -> Option<u8> {
        self.ref_channel
    }

    pub fn aec_active(&self) -> bool {
        self.aec.is_some()
    }

    /// Populate `voice_mask`/`ref_channel` from the channel config and,
    /// if `aec_requested` and a reference channel is configured,
    /// attempt to build the AEC engine. AEC-engine creation failure
    /// (including a reported chunk size that doesn't fit `MAX_CHUNK`)
    /// is non-fatal: the core falls back to the without-AEC path.
    pub fn init(&mut self, aec_requested: bool) {
        self.voice_mask = self.channel_cfg.voice_channel_mask();
        self.ref_channel = self.channel_cfg.ref_channel();

        if aec_requested && self.ref_channel.is_some() {
            self.try_create_aec();
        }

        self.initialized = true;
    }

    fn try_create_aec(&mut self) {
        match E::create(self.aec_params) {
            Ok(engine) if engine.chunk_size() <= MAX_CHUNK => {
                self.aec = Some(engine);
                self.aec_out = Some(AlignedBuf::new());
            }
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("AEC engine creation failed or chunk size exceeds buffer; continuing without AEC");
                self.aec = None;
                self.aec_out = None;
            }
        }
    }

    /// Attempt to bring up AEC after the fact. Requires a reference
    /// channel and uses the parameters stored at construction.
    pub fn enable_aec_at_runtime(&mut self) -> Result<(), MicError<I::Error, A::Error>> {
        if self.ref_channel.is_none() {
            return Err(MicError::NoRefChannel);
        }
        self.try_create_aec();
        if self.aec.is_some() {
            Ok(())
        } else {
            Err(MicError::AecCreateFailed)
        }
    }

    pub fn start(&mut self) -> Result<(), MicError<I::Error, A::Error>> {
        if !self.started {
            self.i2s.enable_rx().map_err(MicError::I2s)?;
            self.started = true;
        }
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), MicError<I::Error, A::Error>> {
        if self.started {
            self.i2s.disable_rx().map_err(MicError::I2s)?;
            self.started = false;
        }
        Ok(())
    }

    /// Stop if started, then release the AEC engine and its buffer in
    /// that order. Safe to call more than once.
    pub fn deinit(&mut self) -> Result<(), MicError<I::Error, A::Error>> {
        self.stop()?;
        self.aec.take();
        self.aec_out.take();
        self.initialized = false;
        Ok(())
    }

    /// Read up to `out.len()` mono samples. Auto-starts I2S RX on
    /// first call. Routes through the with-AEC or without-AEC pipeline
    /// depending on whether an AEC engine is currently live.
    pub fn read(&mut self, out: &mut [i16]) -> Result<usize, MicError<I::Error, A::Error>> {
        if !self.initialized {
            return Err(MicError::NotInitialized);
        }
        if self.voice_mask == 0 {
            return Err(MicError::NoVoiceChannels);
        }
        self.start()?;

        if self.aec.is_some() {
            self.read_with_aec(out)
        } else {
            self.read_without_aec(out)
        }
    }

    fn read_with_aec(&mut self, out: &mut [i16]) -> Result<usize, MicError<I::Error, A::Error>> {
        let format = self.aec_params.format;
        let Mic {
            i2s, aec, aec_out, ..
        } = self;
        let engine = aec.as_mut().expect("checked by caller");
        let aec_out = aec_out.as_mut().expect("allocated alongside engine");
        let chunk_size = engine.chunk_size().min(MAX_CHUNK);

        let mut frame_bytes = [0u8; MAX_CHUNK_BYTES];
        let mut input = [0i16; MAX_CHUNK_SAMPLES];

        let mut copied = 0usize;
        while copied < out.len() {
            let want_bytes = chunk_size * FRAME_BYTES;
            let n = i2s.read(&mut frame_bytes[..want_bytes]).map_err(MicError::I2s)?;
            if n < FRAME_BYTES {
                break;
            }
            let frames_got = n / FRAME_BYTES;

            for i in 0..frames_got {
                let frame = pack::parse_frame(&frame_bytes[i * FRAME_BYTES..(i + 1) * FRAME_BYTES]);
                let mic = frame.mic1();
                let reference = frame.reference();
                match format {
                    crate::aec::Format::Mr => {
                        input[2 * i] = mic;
                        input[2 * i + 1] = reference;
                    }
                    crate::aec::Format::Rm => {
                        input[2 * i] = reference;
                        input[2 * i + 1] = mic;
                    }
                }
            }

            let out_len = engine.process(&input[..frames_got * 2], &mut aec_out.samples[..chunk_size]);
            if out_len <= 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("AEC engine returned no samples; ending read early");
                break;
            }
            let got = out_len as usize;
            let remaining = out.len() - copied;
            let take = got.min(remaining);
            out[copied..copied + take].copy_from_slice(&aec_out.samples[..take]);
            copied += take;

            if frames_got < chunk_size {
                break;
            }
        }
        Ok(copied)
    }

    fn read_without_aec(&mut self, out: &mut [i16]) -> Result<usize, MicError<I::Error, A::Error>> {
        let mut copied = 0usize;
        let mut frame_bytes = [0u8; FRAME_BYTES];
        while copied < out.len() {
            let n = self.i2s.read(&mut frame_bytes).map_err(MicError::I2s)?;
            if n < FRAME_BYTES {
                break;
            }
            let frame = pack::parse_frame(&frame_bytes);
            if self.voice_mask & 0b001 != 0 && copied < out.len() {
                out[copied] = frame.mic1();
                copied += 1;
            }
            if self.voice_mask & 0b100 != 0 && copied < out.len() {
                out[copied] = frame.mic2();
                copied += 1;
            }
        }
        Ok(copied)
    }
}
