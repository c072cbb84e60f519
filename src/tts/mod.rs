//! Text-to-speech for generated scripts.
//!
//! * [`SpeechSynthesizer`] — async trait; returns an audio URI.
//! * [`ElevenLabsSynthesizer`] — REST implementation producing `data:` URIs.
//! * [`voice_id`] — profile key → provider voice id.

pub mod synthesizer;

pub use synthesizer::{
    decode_data_uri, to_data_uri, voice_id, ElevenLabsSynthesizer, SpeechSynthesizer, TtsError,
    AUDIO_MIME, VOICE_PROFILES,
};
