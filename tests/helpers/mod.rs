//! Test helpers and fixtures for Cantus integration tests
//!
//! Nothing here touches a real TTS backend. Models are deterministic tone
//! generators built by [`TestEngines`], whose loads can be held open with
//! [`LoadGates`] to observe the service while warm-up is still in flight.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (unity speed and pitch)
//! - `PERCEPTUAL_EPSILON` (0.001): Perceptual equivalence (-60dB)
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)

#![allow(dead_code)]

pub mod tolerances;

use cantus::prelude::*;
use cantus::EngineFactory;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub const EN_MODEL: &str = "tts/en/ljspeech/tacotron2-DDC";
pub const FR_MODEL: &str = "tts/fr/css10/vits";
pub const DE_MODEL: &str = "tts/de/thorsten/vits";
pub const ES_MODEL: &str = "tts/es/mai/tacotron2-DDC";

/// Manifest order used by most fixtures.
pub const CATALOG: [&str; 4] = [EN_MODEL, FR_MODEL, DE_MODEL, ES_MODEL];

/// Frequency of every test engine's output.
pub const TONE_HZ: f64 = 220.0;

/// Upper bound for anything a test waits on.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Native rate per language, so tests can tell which model answered.
pub fn rate_for(id: &ModelId) -> u32 {
    match id.language() {
        Some("en") => 22050,
        Some("fr") => 24000,
        _ => 16000,
    }
}

// =============================================================================
// Engines
// =============================================================================

/// Deterministic engine: a 220 Hz sine, one tenth of a second per character.
pub struct ToneEngine {
    sample_rate: u32,
    calls: Arc<AtomicUsize>,
}

impl SpeechEngine for ToneEngine {
    fn synthesize(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains('\0') {
            return Err(EngineError::InvalidText("embedded NUL".into()));
        }
        let len = text.chars().count().max(1) * self.sample_rate as usize / 10;
        Ok(generate_sine(TONE_HZ, self.sample_rate as f64, len)
            .into_iter()
            .map(|s| s * 0.5)
            .collect())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Holds loads for chosen model ids until released.
#[derive(Default)]
pub struct LoadGates {
    gates: Mutex<HashMap<String, (Option<Sender<()>>, Receiver<()>)>>,
}

impl LoadGates {
    /// Loads of `id` block from now on.
    pub fn close(&self, id: &str) {
        let (tx, rx) = crossbeam_channel::bounded(0);
        self.gates.lock().insert(id.to_string(), (Some(tx), rx));
    }

    /// Let every blocked and future load of `id` through.
    pub fn open(&self, id: &str) {
        if let Some(gate) = self.gates.lock().get_mut(id) {
            gate.0.take();
        }
    }

    pub fn open_all(&self) {
        for gate in self.gates.lock().values_mut() {
            gate.0.take();
        }
    }

    fn wait(&self, id: &ModelId) {
        let rx = self.gates.lock().get(id.as_str()).map(|(_, rx)| rx.clone());
        if let Some(rx) = rx {
            // Disconnects when the sender is dropped by `open`.
            let _ = rx.recv_timeout(WAIT_TIMEOUT);
        }
    }
}

/// Engine factory with failure injection, load gates and counters.
#[derive(Default)]
pub struct TestEngines {
    failing: Mutex<HashSet<String>>,
    pub gates: LoadGates,
    inits: AtomicUsize,
    synth_calls: Arc<AtomicUsize>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl TestEngines {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Initialization of `id` fails from now on.
    pub fn fail(&self, id: &str) {
        self.failing.lock().insert(id.to_string());
    }

    pub fn factory(self: &Arc<Self>) -> EngineFactory {
        let engines = Arc::clone(self);
        Arc::new(move |id: &ModelId, _artifacts: &ModelArtifacts| engines.create(id))
    }

    /// Factory invocations so far.
    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    /// `synthesize` calls across every engine this factory built.
    pub fn synth_calls(&self) -> usize {
        self.synth_calls.load(Ordering::SeqCst)
    }

    /// Highest number of loads observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn create(&self, id: &ModelId) -> Result<Arc<dyn SpeechEngine>, EngineError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        self.gates.wait(id);
        // Widen the window in which overlapping loads would be seen.
        std::thread::sleep(Duration::from_millis(5));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().contains(id.as_str()) {
            return Err(EngineError::Init(format!("{} refused to start", id)));
        }
        Ok(Arc::new(ToneEngine {
            sample_rate: rate_for(id),
            calls: Arc::clone(&self.synth_calls),
        }))
    }
}

// =============================================================================
// On-disk fixture
// =============================================================================

/// Temp directory with per-model source artifacts and a manifest over them.
pub struct Fixture {
    dir: TempDir,
    manifest: PathBuf,
}

impl Fixture {
    /// Every id gets its artifacts on disk.
    pub fn new(ids: &[&str]) -> Self {
        Self::with_missing(ids, &[])
    }

    /// Ids in `missing` are listed in the manifest but have no files.
    pub fn with_missing(ids: &[&str], missing: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut manifest = String::new();

        for id in ids {
            let model = ModelId::new(*id);
            let rel = format!("sources/{}", model.cache_dir_name());
            if !missing.contains(id) {
                let src = dir.path().join(&rel);
                std::fs::create_dir_all(&src).expect("Failed to create source dir");
                std::fs::write(src.join("model.pth"), id.as_bytes()).expect("Failed to write checkpoint");
                std::fs::write(src.join("config.json"), b"{}").expect("Failed to write config");
            }
            manifest.push_str(&format!(
                "[[models]]\nid = \"{}\"\ncheckpoint = \"{}/model.pth\"\nconfig = \"{}/config.json\"\n\n",
                id, rel, rel
            ));
        }

        let manifest_path = dir.path().join("models.toml");
        std::fs::write(&manifest_path, manifest).expect("Failed to write manifest");

        Self {
            dir,
            manifest: manifest_path,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    pub fn catalog(&self) -> ManifestCatalog {
        ManifestCatalog::from_path(&self.manifest).expect("Failed to read manifest")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("audio")
    }

    /// Config pointing at this fixture, defaulting to the English model.
    pub fn config(&self) -> CantusConfig {
        CantusConfig {
            default_model: ModelId::new(EN_MODEL),
            manifest: Some(self.manifest.clone()),
            cache_dir: self.dir.path().join("cache"),
            output_dir: self.output_dir(),
            ..CantusConfig::default()
        }
    }

    pub fn builder(&self, engines: &Arc<TestEngines>) -> CantusBuilder {
        Cantus::builder()
            .config(self.config())
            .engine_factory(engines.factory())
    }
}

/// Service over the full catalog, with every background load finished.
pub fn settled_service(fixture: &Fixture, engines: &Arc<TestEngines>) -> Cantus {
    let cantus = fixture.builder(engines).build().expect("Failed to build service");
    cantus.warmup().wait();
    cantus
}

// =============================================================================
// Utilities
// =============================================================================

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Poll `condition` until it holds or [`WAIT_TIMEOUT`] passes.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < WAIT_TIMEOUT {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}
