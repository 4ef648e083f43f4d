// MIDI output from generated melodies.
//
// Converts a GeneratedMelody into a Standard MIDI File (SMF) for playback
// and auditioning. Output is SMF Format 0: one track carrying the tempo,
// the voice program, a Lyric meta event per syllable and the notes. Note
// times are absolute seconds in the melody and are converted to ticks at
// the melody's tempo.
//
// Uses the `midly` crate for MIDI writing. Lyric events borrow the syllable
// text, so the Smf lives no longer than the melody.

use crate::melody::GeneratedMelody;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// General MIDI "Voice Oohs".
const VOICE_PROGRAM: u8 = 53;

const CHANNEL: u8 = 0;

/// Convert a melody to MIDI and write it to a file.
pub fn write_midi(melody: &GeneratedMelody, path: &Path) -> std::io::Result<()> {
    let smf = melody_to_smf(melody);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    std::fs::write(path, &buf)
}

/// Convert a melody to an in-memory SMF.
pub fn melody_to_smf(melody: &GeneratedMelody) -> Smf<'_> {
    let tempo = melody.metadata.tempo.max(1);
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));
    let channel = u4::new(CHANNEL);

    let mut track: Track<'_> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(60_000_000 / tempo))),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Lead Vocal")),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(VOICE_PROGRAM),
            },
        },
    });

    let mut last_event_tick: u32 = 0;
    for note in melody.phrases.iter().flat_map(|p| &p.notes) {
        // Notes are contiguous, so clamping to the previous event only
        // absorbs rounding.
        let on_tick = seconds_to_ticks(note.timestamp, tempo).max(last_event_tick);
        let off_tick = seconds_to_ticks(note.end_time(), tempo).max(on_tick + 1);
        let key = u7::new(note.pitch.min(127));

        track.push(TrackEvent {
            delta: u28::new(on_tick - last_event_tick),
            kind: TrackEventKind::Meta(MetaMessage::Lyric(note.syllable.as_bytes())),
        });
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(note.velocity.min(127)),
                },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(off_tick - on_tick),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        });
        last_event_tick = off_tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);
    smf
}

fn seconds_to_ticks(seconds: f64, tempo: u32) -> u32 {
    let quarters = seconds * tempo as f64 / 60.0;
    (quarters * TICKS_PER_QUARTER as f64).round().max(0.0) as u32
}
