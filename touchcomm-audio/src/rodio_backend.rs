use crate::{AudioOutput, SoundBank, SoundId};
use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;

/// Real audio output through the default device. All recordings are read
/// into memory up front so a missing asset fails at startup, not mid-trial.
pub struct RodioPlayback {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    bytes: Vec<Vec<u8>>,
    sink: Option<Sink>,
}

impl RodioPlayback {
    pub fn new(bank: SoundBank) -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().context("opening default audio device")?;

        let mut bytes = Vec::with_capacity(bank.len());
        for (_, sound) in bank.iter() {
            let data = std::fs::read(&sound.path)
                .with_context(|| format!("reading sound file {}", sound.path.display()))?;
            bytes.push(data);
        }

        Ok(Self {
            _stream: stream,
            handle,
            bytes,
            sink: None,
        })
    }
}

impl AudioOutput for RodioPlayback {
    fn play(&mut self, id: SoundId) -> Result<()> {
        self.stop();
        let data = self.bytes.get(id.0).context("unknown sound id")?.clone();
        let source = Decoder::new(Cursor::new(data)).context("decoding sound")?;
        let sink = Sink::try_new(&self.handle).context("opening audio channel")?;
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.sink.as_ref().map(|s| !s.empty()).unwrap_or(false)
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}
