//! The echo-cancellation engine collaborator.
//!
//! Modeled as a generic trait rather than an opaque FFI handle: the
//! source's `create`/`process`/`destroy` triple maps onto
//! construction, a `process` method, and [Drop] respectively (the
//! RAII-style cleanup the handle wants is exactly what `Drop` gives
//! for free -- no explicit `destroy` call needed in this core).

/// Interleaving order of mic/reference samples handed to [AecEngine::process].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Format {
    /// `[mic, ref, mic, ref, ...]`
    Mr,
    /// `[ref, mic, ref, mic, ...]`
    Rm,
}

/// Engine operating mode, passed through to the underlying canceller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AecMode {
    SpeechRecognition,
    VoiceComm16k,
    VoiceComm8k,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PerfMode {
    LowCost,
    HighPerf,
}

/// Parameters fixed at AEC-engine construction; immutable for the
/// engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AecParams {
    pub format: Format,
    pub filter_length: u8,
    pub mode: AecMode,
    pub perf_mode: PerfMode,
}

/// An echo-cancellation engine instance.
///
/// `create` is fallible -- the concrete engine may refuse unsupported
/// parameter combinations -- and construction failure at [crate::mic::Mic]
/// init is non-fatal (§4.11): the core falls back to the without-AEC
/// read path.
pub trait AecEngine: Sized {
    type Error;

    fn create(params: AecParams) -> Result<Self, Self::Error>;

    /// Number of mono output samples (and mic/ref sample pairs of
    /// input) this engine consumes per [AecEngine::process] call.
    fn chunk_size(&self) -> usize;

    /// Run one chunk through the canceller. `input` is
    /// `2 * chunk_size()` samples in the engine's configured
    /// [Format]; `output` receives up to `chunk_size()` mono samples.
    /// Returns the number of samples written to `output`; a
    /// non-positive return means the engine produced nothing this
    /// call (not an error -- see §4.12).
    fn process(&mut self, input: &[i16], output: &mut [i16]) -> i32;
}
