use bytes::Bytes;
use lms_amf0::{Amf0Object, Amf0Value};

use super::command::{encode_values, CommandValues};
use crate::messages::{MessageDeserializationError, MessageSerializationError};

pub const SAMPLE_ACCESS: &str = "|RtmpSampleAccess";
pub const SET_DATA_FRAME: &str = "@setDataFrame";
pub const ON_META_DATA: &str = "onMetaData";

/// Grants the player access to the raw audio and video samples
#[derive(PartialEq, Debug, Clone)]
pub struct SampleAccess {
    pub video_sample_access: bool,
    pub audio_sample_access: bool,
}

impl SampleAccess {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(SAMPLE_ACCESS.to_string()),
            Amf0Value::Boolean(self.video_sample_access),
            Amf0Value::Boolean(self.audio_sample_access),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        values.expect_name(SAMPLE_ACCESS)?;

        let video_sample_access = values.next_value().and_then(Amf0Value::get_boolean).unwrap_or(false);
        let audio_sample_access = values.next_value().and_then(Amf0Value::get_boolean).unwrap_or(false);

        Ok(SampleAccess {
            video_sample_access,
            audio_sample_access,
        })
    }
}

/// Stream metadata such as dimensions, frame rate and codec ids.
///
/// Publishers send it as `@setDataFrame`, `onMetaData`, properties.  Players expect it
/// without the `@setDataFrame` prefix, which is how it is always encoded.
#[derive(PartialEq, Debug, Clone)]
pub struct OnMetaData {
    pub metadata: Amf0Object,
}

impl OnMetaData {
    pub fn encode(&self) -> Result<Bytes, MessageSerializationError> {
        encode_values(&[
            Amf0Value::Utf8String(ON_META_DATA.to_string()),
            Amf0Value::EcmaArray(self.metadata.clone()),
        ])
    }

    pub fn decode(payload: &[u8]) -> Result<Self, MessageDeserializationError> {
        let mut values = CommandValues::decode(payload)?;
        let mut name = values.string("data name")?;
        if name == SET_DATA_FRAME {
            name = values.string("data name")?;
        }

        if name != ON_META_DATA {
            return Err(MessageDeserializationError::UnexpectedCommandName {
                expected: ON_META_DATA,
                received: name,
            });
        }

        // Some encoders send the name with no properties at all
        Ok(OnMetaData {
            metadata: values.optional_object().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> Amf0Object {
        let mut metadata = Amf0Object::new();
        metadata.insert("width", 1280.0);
        metadata.insert("height", 720.0);
        metadata.insert("encoder", "obs");
        metadata
    }

    #[test]
    fn can_round_trip_sample_access() {
        let packet = SampleAccess {
            video_sample_access: true,
            audio_sample_access: true,
        };

        assert_eq!(SampleAccess::decode(&packet.encode().unwrap()).unwrap(), packet);
    }

    #[test]
    fn can_decode_metadata_with_set_data_frame_prefix() {
        let bytes = lms_amf0::serialize(&[
            Amf0Value::Utf8String("@setDataFrame".to_string()),
            Amf0Value::Utf8String("onMetaData".to_string()),
            Amf0Value::EcmaArray(sample_metadata()),
        ])
        .unwrap();

        let packet = OnMetaData::decode(&bytes).unwrap();
        assert_eq!(packet.metadata, sample_metadata());
    }

    #[test]
    fn can_decode_metadata_object_body() {
        let bytes = lms_amf0::serialize(&[
            Amf0Value::Utf8String("onMetaData".to_string()),
            Amf0Value::Object(sample_metadata()),
        ])
        .unwrap();

        let packet = OnMetaData::decode(&bytes).unwrap();
        assert_eq!(packet.metadata.get_str("encoder"), Some("obs"));
    }

    #[test]
    fn metadata_is_encoded_as_ecma_array_without_prefix() {
        let packet = OnMetaData {
            metadata: sample_metadata(),
        };

        let bytes = packet.encode().unwrap();
        let raw = lms_amf0::deserialize(&mut &bytes[..]).unwrap();

        assert_eq!(
            raw,
            vec![
                Amf0Value::Utf8String("onMetaData".to_string()),
                Amf0Value::EcmaArray(sample_metadata()),
            ]
        );
    }

    #[test]
    fn gives_error_on_other_data_names() {
        let bytes = lms_amf0::serialize(&[Amf0Value::Utf8String("onCuePoint".to_string())]).unwrap();
        match OnMetaData::decode(&bytes) {
            Err(MessageDeserializationError::UnexpectedCommandName { received, .. }) => {
                assert_eq!(received, "onCuePoint")
            }
            x => panic!("Expected UnexpectedCommandName, received {:?}", x),
        }
    }
}
