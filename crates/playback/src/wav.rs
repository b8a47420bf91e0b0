//! Minimal RIFF/WAVE reader for the baked-in startup jingle.
//!
//! Only the format the asset pipeline produces is accepted: PCM, one
//! channel, 8 bits per sample. Anything else is a build mistake and is
//! reported as [`MalformedWav`] so the firmware can refuse to arm the
//! sample engine.

/// Why a WAV byte slice was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedWav {
    /// Missing the `RIFF` container magic.
    NotRiff,
    /// Container is RIFF but not of form type `WAVE`.
    NotWave,
    /// A chunk header or body runs past the end of the slice.
    Truncated,
    /// No `fmt ` chunk before the data chunk.
    MissingFmt,
    /// No `data` chunk.
    MissingData,
    /// The format is valid WAV but not PCM mono 8-bit.
    Unsupported {
        /// `wFormatTag` from the fmt chunk.
        format: u16,
        /// Channel count.
        channels: u16,
        /// Bits per sample.
        bits: u16,
    },
}

/// A parsed jingle asset: unsigned 8-bit mono samples and their rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavAsset<'a> {
    /// Raw unsigned 8-bit samples, silence at 128.
    pub samples: &'a [u8],
    /// Samples per second.
    pub sample_rate: u32,
}

impl<'a> WavAsset<'a> {
    /// Parse a WAV file image, typically from `include_bytes!`.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, MalformedWav> {
        if bytes.len() < 12 {
            return Err(MalformedWav::Truncated);
        }
        if &bytes[0..4] != b"RIFF" {
            return Err(MalformedWav::NotRiff);
        }
        if &bytes[8..12] != b"WAVE" {
            return Err(MalformedWav::NotWave);
        }

        let mut fmt: Option<(u16, u16, u32, u16)> = None;
        let mut offset = 12usize;
        while offset + 8 <= bytes.len() {
            let id = &bytes[offset..offset + 4];
            let size = u32::from_le_bytes([
                bytes[offset + 4],
                bytes[offset + 5],
                bytes[offset + 6],
                bytes[offset + 7],
            ]) as usize;
            let body = offset + 8;
            let end = body.checked_add(size).ok_or(MalformedWav::Truncated)?;
            if end > bytes.len() {
                return Err(MalformedWav::Truncated);
            }
            match id {
                b"fmt " => {
                    if size < 16 {
                        return Err(MalformedWav::Truncated);
                    }
                    let format = u16::from_le_bytes([bytes[body], bytes[body + 1]]);
                    let channels = u16::from_le_bytes([bytes[body + 2], bytes[body + 3]]);
                    let sample_rate = u32::from_le_bytes([
                        bytes[body + 4],
                        bytes[body + 5],
                        bytes[body + 6],
                        bytes[body + 7],
                    ]);
                    let bits = u16::from_le_bytes([bytes[body + 14], bytes[body + 15]]);
                    fmt = Some((format, channels, sample_rate, bits));
                }
                b"data" => {
                    let (format, channels, sample_rate, bits) =
                        fmt.ok_or(MalformedWav::MissingFmt)?;
                    if format != 1 || channels != 1 || bits != 8 {
                        return Err(MalformedWav::Unsupported {
                            format,
                            channels,
                            bits,
                        });
                    }
                    return Ok(WavAsset {
                        samples: &bytes[body..end],
                        sample_rate,
                    });
                }
                _ => {}
            }
            // RIFF chunks are word aligned; odd sizes carry a pad byte.
            offset = end + (size & 1);
        }
        if fmt.is_none() {
            Err(MalformedWav::MissingFmt)
        } else {
            Err(MalformedWav::MissingData)
        }
    }

    /// Playback length in milliseconds at the asset's sample rate.
    pub fn duration_ms(&self) -> u32 {
        if self.sample_rate == 0 {
            return 0;
        }
        let samples = self.samples.len() as u64;
        ((samples * 1000) / u64::from(self.sample_rate)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_image(rate: u32, format: u16, channels: u16, bits: u16, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&0u32.to_le_bytes()); // size unchecked by the parser
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&format.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&rate.to_le_bytes());
        let byte_rate = rate * u32::from(channels) * u32::from(bits) / 8;
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&(channels * bits / 8).to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn parses_pcm_mono_8bit() {
        let image = wav_image(8000, 1, 1, 8, &[128, 200, 55, 128]);
        let asset = WavAsset::parse(&image).unwrap();
        assert_eq!(asset.sample_rate, 8000);
        assert_eq!(asset.samples, &[128, 200, 55, 128]);
    }

    #[test]
    fn duration_rounds_down() {
        let data = vec![128u8; 8000 + 4000];
        let image = wav_image(8000, 1, 1, 8, &data);
        let asset = WavAsset::parse(&image).unwrap();
        assert_eq!(asset.duration_ms(), 1500);
    }

    #[test]
    fn rejects_non_riff() {
        assert_eq!(WavAsset::parse(b"OggS...."), Err(MalformedWav::Truncated));
        let mut image = wav_image(8000, 1, 1, 8, &[128]);
        image[0..4].copy_from_slice(b"FORM");
        assert_eq!(WavAsset::parse(&image), Err(MalformedWav::NotRiff));
    }

    #[test]
    fn rejects_non_wave_form() {
        let mut image = wav_image(8000, 1, 1, 8, &[128]);
        image[8..12].copy_from_slice(b"AVI ");
        assert_eq!(WavAsset::parse(&image), Err(MalformedWav::NotWave));
    }

    #[test]
    fn rejects_stereo_and_16bit() {
        let image = wav_image(8000, 1, 2, 8, &[128, 128]);
        assert_eq!(
            WavAsset::parse(&image),
            Err(MalformedWav::Unsupported {
                format: 1,
                channels: 2,
                bits: 8
            })
        );
        let image = wav_image(8000, 1, 1, 16, &[0, 0]);
        assert_eq!(
            WavAsset::parse(&image),
            Err(MalformedWav::Unsupported {
                format: 1,
                channels: 1,
                bits: 16
            })
        );
    }

    #[test]
    fn rejects_truncated_data_chunk() {
        let mut image = wav_image(8000, 1, 1, 8, &[128, 128, 128, 128]);
        image.truncate(image.len() - 2);
        assert_eq!(WavAsset::parse(&image), Err(MalformedWav::Truncated));
    }

    #[test]
    fn skips_unknown_chunks() {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"LIST");
        out.extend_from_slice(&3u32.to_le_bytes());
        out.extend_from_slice(&[1, 2, 3, 0]); // odd size, padded
        let rest = wav_image(11025, 1, 1, 8, &[128, 64]);
        out.extend_from_slice(&rest[12..]);
        let asset = WavAsset::parse(&out).unwrap();
        assert_eq!(asset.sample_rate, 11025);
        assert_eq!(asset.samples, &[128, 64]);
    }

    #[test]
    fn data_before_fmt_is_missing_fmt() {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"data");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&[128, 128]);
        assert_eq!(WavAsset::parse(&out), Err(MalformedWav::MissingFmt));
    }
}
