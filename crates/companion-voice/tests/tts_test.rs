use companion_voice::{
    encode_file, CommandSynthesizer, RequestScratch, SpeechSynthesizer, SynthEngine,
    SynthesizerConfig, VoiceError,
};
use std::path::{Path, PathBuf};

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let synth = CommandSynthesizer::new(SynthesizerConfig::default());

    let result = synth.synthesize("   ", &dir.path().join("out.wav")).await;
    match result {
        Err(VoiceError::Synthesis(msg)) => assert!(msg.contains("empty"), "got: {}", msg),
        other => panic!("expected Synthesis error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_oversized_text_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let synth = CommandSynthesizer::new(SynthesizerConfig::default());
    let text = "a".repeat(64 * 1024 + 1);

    let result = synth.synthesize(&text, &dir.path().join("out.wav")).await;
    match result {
        Err(VoiceError::Synthesis(msg)) => {
            assert!(msg.contains("exceeds maximum size"), "got: {}", msg)
        }
        other => panic!("expected Synthesis error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_engine_binary() {
    let dir = tempfile::tempdir().unwrap();
    let config = SynthesizerConfig {
        binary: Some(dir.path().join("no-such-engine")),
        ..SynthesizerConfig::default()
    };
    let synth = CommandSynthesizer::new(config);

    let result = synth.synthesize("Hello", &dir.path().join("out.wav")).await;
    match result {
        Err(VoiceError::Synthesis(msg)) => assert!(msg.contains("failed to spawn"), "got: {}", msg),
        other => panic!("expected Synthesis error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_piper_requires_model() {
    let dir = tempfile::tempdir().unwrap();
    let synth = CommandSynthesizer::new(SynthesizerConfig::new(SynthEngine::Piper));

    let result = synth.synthesize("Hello", &dir.path().join("out.wav")).await;
    assert!(matches!(result, Err(VoiceError::Config(_))), "got {:?}", result);
}

#[cfg(unix)]
#[tokio::test]
async fn test_engine_output_round_trips_through_encoder() {
    use base64::Engine;

    let dir = tempfile::tempdir().unwrap();
    // Invoked as: <engine> -w <destination> --stdin
    let engine = write_script(dir.path(), "fake-espeak", r#"{ printf 'RIFF'; cat; } > "$2""#);
    let config = SynthesizerConfig {
        binary: Some(engine),
        ..SynthesizerConfig::default()
    };
    let synth = CommandSynthesizer::new(config);

    let scratch = RequestScratch::create_in(dir.path()).await.unwrap();
    let destination = scratch.audio_path(0);
    synth.synthesize("hello there", &destination).await.unwrap();

    let written = std::fs::read(&destination).unwrap();
    assert_eq!(written, b"RIFFhello there");

    let encoded = encode_file(&destination).await.unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .unwrap();
    assert_eq!(decoded, written);
}

#[cfg(unix)]
#[tokio::test]
async fn test_engine_failure_reports_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let engine = write_script(dir.path(), "broken-espeak", "echo 'no voices installed' >&2\nexit 3");
    let config = SynthesizerConfig {
        binary: Some(engine),
        ..SynthesizerConfig::default()
    };
    let synth = CommandSynthesizer::new(config);

    let result = synth.synthesize("Hello", &dir.path().join("out.wav")).await;
    match result {
        Err(VoiceError::Synthesis(msg)) => {
            assert!(msg.contains("no voices installed"), "got: {}", msg)
        }
        other => panic!("expected Synthesis error, got {:?}", other),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_engine_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let engine = write_script(dir.path(), "slow-espeak", "sleep 10");
    let config = SynthesizerConfig {
        binary: Some(engine),
        timeout_seconds: 1,
        ..SynthesizerConfig::default()
    };
    let synth = CommandSynthesizer::new(config);

    let result = synth.synthesize("Hello", &dir.path().join("out.wav")).await;
    match result {
        Err(VoiceError::Synthesis(msg)) => assert!(msg.contains("timed out"), "got: {}", msg),
        other => panic!("expected Synthesis error, got {:?}", other),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_piper_reads_text_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    // Invoked as: <engine> --model <model> --output_file <destination>
    let engine = write_script(dir.path(), "fake-piper", r#"cat > "$4""#);
    let config = SynthesizerConfig {
        engine: SynthEngine::Piper,
        binary: Some(engine),
        model_path: Some(dir.path().join("voice.onnx")),
        ..SynthesizerConfig::default()
    };
    let synth = CommandSynthesizer::new(config);

    let destination = dir.path().join("piper.wav");
    synth.synthesize("from stdin", &destination).await.unwrap();
    assert_eq!(std::fs::read(&destination).unwrap(), b"from stdin");
}

#[cfg(unix)]
#[tokio::test]
async fn test_text_starting_with_dash_is_not_an_option() {
    let dir = tempfile::tempdir().unwrap();
    // Rejects any argv other than the fixed option list, like a getopt
    // parser would for an unknown flag.
    let engine = write_script(
        dir.path(),
        "strict-espeak",
        r#"if [ "$#" -ne 3 ] || [ "$1" != "-w" ] || [ "$3" != "--stdin" ]; then
  echo "unrecognized option $*" >&2
  exit 1
fi
cat > "$2""#,
    );
    let config = SynthesizerConfig {
        binary: Some(engine),
        ..SynthesizerConfig::default()
    };
    let synth = CommandSynthesizer::new(config);

    for (i, text) in ["--Wow, really?", "- Sure!", "-w/tmp/elsewhere.wav"]
        .iter()
        .enumerate()
    {
        let destination = dir.path().join(format!("dash_{}.wav", i));
        synth.synthesize(text, &destination).await.unwrap();
        assert_eq!(std::fs::read(&destination).unwrap(), text.as_bytes());
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_say_reads_text_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    // Invoked as: <engine> -o <destination> --file-format=WAVE --data-format=... -f -
    let engine = write_script(
        dir.path(),
        "fake-say",
        r#"if [ "$5" != "-f" ] || [ "$6" != "-" ]; then exit 1; fi
cat > "$2""#,
    );
    let config = SynthesizerConfig {
        engine: SynthEngine::Say,
        binary: Some(engine),
        ..SynthesizerConfig::default()
    };
    let synth = CommandSynthesizer::new(config);

    let destination = dir.path().join("say.wav");
    synth.synthesize("-- just kidding", &destination).await.unwrap();
    assert_eq!(std::fs::read(&destination).unwrap(), b"-- just kidding");
}
