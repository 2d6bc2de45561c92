// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Audio decoding. WAV is decoded to PCM, every other container is kept encoded.

use super::AssetLoaderLane;
use anyhow::anyhow;
use porter_core::asset::{AudioData, SoundData};
use std::{error::Error, io::Cursor};

/// An `AssetLoaderLane` for audio clips.
#[derive(Debug, Clone, Default)]
pub struct AudioLoaderLane;

impl AudioLoaderLane {
    /// Returns `true` if `bytes` start with a RIFF/WAVE header.
    pub fn is_wav(bytes: &[u8]) -> bool {
        bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
    }

    fn decode_wav(bytes: &[u8]) -> Result<SoundData, Box<dyn Error + Send + Sync>> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();

        let samples: Result<Vec<f32>, _> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect(),
            hound::SampleFormat::Int => {
                let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 / max_value))
                    .collect()
            }
        };
        let samples = samples.map_err(|e| anyhow!("Failed to parse WAV samples: {}", e))?;

        Ok(SoundData {
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        })
    }
}

impl AssetLoaderLane<AudioData> for AudioLoaderLane {
    fn load(&self, bytes: &[u8]) -> Result<AudioData, Box<dyn Error + Send + Sync>> {
        if Self::is_wav(bytes) {
            return Ok(AudioData::Pcm(Self::decode_wav(bytes)?));
        }
        if bytes.is_empty() {
            return Err("audio body is empty".into());
        }
        Ok(AudioData::Encoded(bytes.to_vec()))
    }
}
