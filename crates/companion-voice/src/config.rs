use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

fn default_timeout_seconds() -> u64 {
    60
}

/// Command-line speech engines the synthesizer knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SynthEngine {
    /// `espeak-ng`, available on most Linux distributions.
    #[default]
    EspeakNg,
    /// Piper neural TTS. Needs `model_path`.
    Piper,
    /// macOS `say`.
    Say,
}

impl SynthEngine {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EspeakNg => "espeak-ng",
            Self::Piper => "piper",
            Self::Say => "say",
        }
    }

    /// Executable looked up on `PATH` when no explicit binary is configured.
    pub fn default_binary(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for SynthEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SynthEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "espeak-ng" | "espeak" => Ok(Self::EspeakNg),
            "piper" => Ok(Self::Piper),
            "say" => Ok(Self::Say),
            other => Err(format!("unknown speech engine: {}", other)),
        }
    }
}

/// Settings for [`CommandSynthesizer`](crate::CommandSynthesizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    #[serde(default)]
    pub engine: SynthEngine,
    /// Overrides the engine executable.
    #[serde(default)]
    pub binary: Option<PathBuf>,
    /// Engine voice name (espeak-ng `-v`, say `-v`). Engine default when unset.
    #[serde(default)]
    pub voice: Option<String>,
    /// Piper `.onnx` model.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// Upper bound on a single synthesis run, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            engine: SynthEngine::default(),
            binary: None,
            voice: None,
            model_path: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl SynthesizerConfig {
    pub fn new(engine: SynthEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// The executable that will be spawned.
    pub fn resolved_binary(&self) -> PathBuf {
        self.binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.engine.default_binary()))
    }
}
