/// MIDI output using midir: mirrors grid triggers to an external device
use midir::{MidiOutput, MidiOutputConnection};
use tracing::info;

use crate::error::{PixelSynthError, Result};
use crate::sequencer::instrument::Instrument;

const CLIENT_NAME: &str = "PixelSynth MIDI Output";
const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;

pub struct MidiOutputDevice {
    connection: Option<MidiOutputConnection>,
    velocity: u8,
}

impl MidiOutputDevice {
    pub fn new() -> Self {
        Self {
            connection: None,
            velocity: 100,
        }
    }

    pub fn available_ports() -> Vec<String> {
        if let Ok(midi_out) = MidiOutput::new(CLIENT_NAME) {
            midi_out
                .ports()
                .iter()
                .filter_map(|p| midi_out.port_name(p).ok())
                .collect()
        } else {
            vec![]
        }
    }

    pub fn connect(&mut self, port_index: usize) -> Result<()> {
        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|e| PixelSynthError::midi(format!("failed to create output: {}", e)))?;

        let ports = midi_out.ports();
        let port = ports
            .get(port_index)
            .ok_or_else(|| PixelSynthError::midi(format!("invalid port index {}", port_index)))?;
        let name = midi_out
            .port_name(port)
            .unwrap_or_else(|_| format!("port {}", port_index));

        let connection = midi_out
            .connect(port, "pixelsynth")
            .map_err(|e| PixelSynthError::midi(format!("failed to connect: {}", e)))?;

        info!(port = %name, "MIDI output connected");
        self.connection = Some(connection);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: u8) {
        self.velocity = velocity.min(127);
    }

    pub fn send_note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<()> {
        self.send(&note_on_message(channel, note, velocity))
    }

    pub fn send_note_off(&mut self, channel: u8, note: u8) -> Result<()> {
        self.send(&note_off_message(channel, note))
    }

    pub fn trigger(&mut self, instrument: Instrument) -> Result<()> {
        let velocity = self.velocity;
        self.send_note_on(instrument.midi_channel(), instrument.midi_note(), velocity)
    }

    pub fn release(&mut self, instrument: Instrument) -> Result<()> {
        self.send_note_off(instrument.midi_channel(), instrument.midi_note())
    }

    /// Note off for every palette voice
    pub fn release_all(&mut self) -> Result<()> {
        for inst in Instrument::ALL {
            self.release(inst)?;
        }
        Ok(())
    }

    fn send(&mut self, message: &[u8]) -> Result<()> {
        if let Some(ref mut conn) = self.connection {
            conn.send(message)
                .map_err(|e| PixelSynthError::midi(format!("failed to send: {}", e)))?;
        }
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            info!("MIDI output disconnected");
        }
    }
}

impl Default for MidiOutputDevice {
    fn default() -> Self {
        Self::new()
    }
}

fn note_on_message(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

fn note_off_message(channel: u8, note: u8) -> [u8; 3] {
    [NOTE_OFF | (channel & 0x0F), note & 0x7F, 0]
}

pub fn midi_note_name(note: u8) -> String {
    let note_names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = (note / 12) as i32 - 1;
    let note_index = (note % 12) as usize;
    format!("{}{}", note_names[note_index], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(note_on_message(9, 36, 100), [0x99, 36, 100]);
        assert_eq!(note_off_message(0, 69), [0x80, 69, 0]);
        assert_eq!(note_on_message(0, 200, 200), [0x90, 200 & 0x7F, 200 & 0x7F]);
    }

    #[test]
    fn test_note_names() {
        assert_eq!(midi_note_name(60), "C4");
        assert_eq!(midi_note_name(69), "A4");
        assert_eq!(midi_note_name(Instrument::Kick.midi_note()), "C2");
        assert_eq!(midi_note_name(Instrument::Bass.midi_note()), "A2");
    }

    #[test]
    fn test_disconnected_sends_are_noops() {
        let mut midi = MidiOutputDevice::new();
        assert!(!midi.is_connected());
        assert_eq!(midi.velocity(), 100);
        midi.set_velocity(200);
        assert_eq!(midi.velocity(), 127);
        midi.set_velocity(64);
        assert_eq!(midi.velocity(), 64);
        assert!(midi.trigger(Instrument::Snare).is_ok());
        assert!(midi.release_all().is_ok());
        midi.disconnect();
    }
}
