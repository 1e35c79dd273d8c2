use crate::error::CharacterError;
use crate::events::{IncomingEvent, OutgoingEvent};
use crate::store;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use companion_db::DbPool;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Maximum decoded size of an uploaded voice sample (10 MiB).
const MAX_SAMPLE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum length of a sample format tag such as `wav` or `mp3`.
const MAX_FORMAT_LEN: usize = 8;

/// Answers character events.
///
/// All methods are blocking; async callers should run them on the blocking
/// pool.
#[derive(Debug, Clone)]
pub struct CharacterService {
    pool: Option<DbPool>,
    samples_dir: PathBuf,
}

impl CharacterService {
    pub fn new(pool: Option<DbPool>, samples_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            samples_dir: samples_dir.into(),
        }
    }

    pub fn has_store(&self) -> bool {
        self.pool.is_some()
    }

    pub fn samples_dir(&self) -> &Path {
        &self.samples_dir
    }

    /// Parses one raw envelope and dispatches it.
    pub fn handle_frame(&self, frame: &str) -> Option<OutgoingEvent> {
        match serde_json::from_str::<IncomingEvent>(frame) {
            Ok(event) => self.dispatch(event),
            Err(e) => {
                debug!("rejected malformed event: {}", e);
                Some(OutgoingEvent::error(format!("Malformed event: {}", e)))
            }
        }
    }

    /// Handles one event, returning the reply to send, if any.
    pub fn dispatch(&self, event: IncomingEvent) -> Option<OutgoingEvent> {
        match event {
            IncomingEvent::ModuleConfigure(_) => {
                debug!("module:configure received");
                None
            }
            IncomingEvent::CharacterGet { id } => Some(reply(
                self.with_conn(|conn| store::get_character(conn, &id)),
                "Character not found",
                |character| OutgoingEvent::CharacterData { character },
            )),
            IncomingEvent::CharacterCreate { character } => Some(reply(
                self.with_conn(|conn| store::create_character(conn, character)),
                "Character not found",
                |character| {
                    info!(character_id = %character.id, "character created");
                    OutgoingEvent::CharacterCreated { character }
                },
            )),
            IncomingEvent::CharacterUpdate { id, data } => Some(reply(
                self.with_conn(|conn| store::update_character(conn, &id, data)),
                "Character not found for update",
                |character| OutgoingEvent::CharacterUpdated { character },
            )),
            IncomingEvent::CharacterDelete { id } => Some(reply(
                self.with_conn(|conn| store::delete_character(conn, &id)),
                "Character not found for deletion",
                |()| {
                    info!(character_id = %id, "character deleted");
                    OutgoingEvent::CharacterDeleted { id: id.clone() }
                },
            )),
            IncomingEvent::VoiceUploadSample {
                character_id,
                format,
                audio,
            } => Some(reply(
                self.upload_sample(&character_id, &format, &audio),
                "Character not found",
                |sample_url| OutgoingEvent::VoiceSampleUploaded {
                    character_id: character_id.clone(),
                    sample_url,
                },
            )),
            IncomingEvent::VoiceSelectPreset {
                character_id,
                preset_id,
            } => Some(reply(
                self.with_conn(|conn| store::set_voice_preset(conn, &character_id, &preset_id)),
                "Character not found",
                |character| OutgoingEvent::CharacterUpdated { character },
            )),
            IncomingEvent::EmoteTrigger {
                character_id,
                emote_name,
            } => {
                debug!(character_id = %character_id, emote = %emote_name, "emote triggered");
                Some(OutgoingEvent::EmoteTriggered {
                    character_id,
                    emote_name,
                })
            }
            IncomingEvent::InputText { text } => {
                debug!(len = text.len(), "input:text ignored");
                Some(OutgoingEvent::error(
                    "text input is not handled by the character service",
                ))
            }
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, CharacterError>,
    ) -> Result<T, CharacterError> {
        let pool = self.pool.as_ref().ok_or(CharacterError::DatabaseUnavailable)?;
        let conn = pool.get()?;
        f(&conn)
    }

    /// Stores the sample as `<characterId>.<format>` and marks the
    /// character's voice as cloned. Returns the sample URL.
    fn upload_sample(
        &self,
        character_id: &str,
        format: &str,
        audio: &str,
    ) -> Result<String, CharacterError> {
        self.with_conn(|conn| {
            // Confirms the id names a stored character before it is used
            // as a file name.
            store::get_character(conn, character_id)?;

            if format.is_empty()
                || format.len() > MAX_FORMAT_LEN
                || !format.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(CharacterError::InvalidSample(format!(
                    "unsupported format {:?}",
                    format
                )));
            }

            let bytes = STANDARD
                .decode(audio.trim())
                .map_err(|e| CharacterError::InvalidSample(format!("audio is not base64: {}", e)))?;
            if bytes.is_empty() {
                return Err(CharacterError::InvalidSample("audio is empty".to_string()));
            }
            if bytes.len() > MAX_SAMPLE_BYTES {
                return Err(CharacterError::InvalidSample(format!(
                    "audio exceeds {} bytes",
                    MAX_SAMPLE_BYTES
                )));
            }

            std::fs::create_dir_all(&self.samples_dir).map_err(|source| CharacterError::Io {
                path: self.samples_dir.clone(),
                source,
            })?;
            let path = self
                .samples_dir
                .join(format!("{}.{}", character_id, format.to_ascii_lowercase()));
            std::fs::write(&path, &bytes).map_err(|source| CharacterError::Io {
                path: path.clone(),
                source,
            })?;

            let sample_url = path.to_string_lossy().into_owned();
            store::set_voice_sample(conn, character_id, &sample_url)?;
            info!(
                character_id = %character_id,
                bytes = bytes.len(),
                "voice sample stored"
            );
            Ok(sample_url)
        })
    }
}

/// Builds the reply for a store result. `NotFound` is reported with the
/// operation's own message; other failures with their display text.
fn reply<T>(
    result: Result<T, CharacterError>,
    not_found: &str,
    ok: impl FnOnce(T) -> OutgoingEvent,
) -> OutgoingEvent {
    match result {
        Ok(value) => ok(value),
        Err(CharacterError::NotFound(id)) => {
            debug!(character_id = %id, "{}", not_found);
            OutgoingEvent::error(not_found)
        }
        Err(e) => {
            if !matches!(e, CharacterError::DatabaseUnavailable) {
                warn!("character operation failed: {}", e);
            }
            OutgoingEvent::error(e.to_string())
        }
    }
}
