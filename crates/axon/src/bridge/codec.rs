//! Framed codec for kernel communication.
//!
//! Uses LengthDelimitedCodec for framing + serde_json for serialization.
//! Works over any AsyncRead/AsyncWrite; the kernel end speaks the same
//! framing, so one generic codec covers both directions.

use std::io;
use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use tokio_util::bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

/// Width of the length prefix in front of every frame.
const LENGTH_FIELD_BYTES: usize = 4;

/// Registry frames are small; anything this large is a runaway peer.
const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Codec that frames messages with a 4-byte length prefix and serializes
/// each frame as one JSON document.
///
/// A frame that does not parse as the expected message type is an
/// `InvalidData` error, never a silent skip; the channel layer decides what
/// to do with it.
#[derive(Debug)]
pub struct JsonCodec<T> {
    framing: LengthDelimitedCodec,
    _message: PhantomData<T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            framing: LengthDelimitedCodec::builder()
                .length_field_length(LENGTH_FIELD_BYTES)
                .max_frame_length(MAX_FRAME_BYTES)
                .new_codec(),
            _message: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_data(err: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

impl<T: DeserializeOwned> Decoder for JsonCodec<T> {
    type Item = T;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(frame) = self.framing.decode(src)? else {
            return Ok(None);
        };
        serde_json::from_slice(&frame).map(Some).map_err(invalid_data)
    }
}

impl<T: Serialize> Encoder<T> for JsonCodec<T> {
    type Error = io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item).map_err(invalid_data)?;
        tracing::trace!(frame_bytes = json.len(), "Encoding frame");
        self.framing.encode(Bytes::from(json), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::protocol::{Request, Response, op};
    use crate::params::ParamValue;

    #[test]
    fn codec_round_trips_requests() {
        let mut codec = JsonCodec::<Request>::new();
        let mut buf = BytesMut::new();

        let req = Request::Invoke {
            op: op::GET_DEFAULTS.to_string(),
            args: vec![ParamValue::Text("iaf_psc_alpha".to_string())],
        };
        codec.encode(req, &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();

        match decoded {
            Request::Invoke { op, args } => {
                assert_eq!(op, "get_defaults");
                assert_eq!(args, vec![ParamValue::Text("iaf_psc_alpha".to_string())]);
            }
            other => panic!("wrong variant: {other:?}"),
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn codec_round_trips_responses() {
        let mut codec = JsonCodec::<Response>::new();
        let mut buf = BytesMut::new();

        let resp = Response::Error {
            op: op::COPY_MODEL.to_string(),
            message: "UnknownModel: ghost".to_string(),
        };
        codec.encode(resp, &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();

        match decoded {
            Response::Error { op, message } => {
                assert_eq!(op, "copy_model");
                assert_eq!(message, "UnknownModel: ghost");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn decode_waits_for_a_complete_frame() {
        let mut codec = JsonCodec::<Request>::new();
        let mut full = BytesMut::new();
        codec
            .encode(
                Request::Invoke {
                    op: op::NODE_MODELS.to_string(),
                    args: vec![],
                },
                &mut full,
            )
            .unwrap();

        let mut delivered = full.split_to(3);
        assert!(codec.decode(&mut delivered).unwrap().is_none());

        delivered.unsplit(full);
        assert!(codec.decode(&mut delivered).unwrap().is_some());
    }

    #[test]
    fn decode_of_empty_buffer_yields_nothing() {
        let mut codec = JsonCodec::<Response>::new();
        let mut buf = BytesMut::new();
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn malformed_frames_are_invalid_data() {
        let mut codec = JsonCodec::<Response>::new();
        let mut buf = BytesMut::from(&b"\x00\x00\x00\x05{oops"[..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
