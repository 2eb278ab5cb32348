//! Frame codec: `[Header][Payload]` with no padding.
//!
//! Decoding is all-or-nothing. A frame whose declared or actual length does
//! not match the payload type is rejected whole.

use bytemuck::Pod;

use super::channel::Channel;
use super::protocol::{Header, Move, PlayerId, Shoot, Snapshot};

/// A fixed-size message body carried on exactly one channel.
pub trait Payload: Pod {
    const CHANNEL: Channel;
    const SIZE: usize = std::mem::size_of::<Self>();
}

impl Payload for Snapshot {
    const CHANNEL: Channel = Channel::Update;
}

impl Payload for Move {
    const CHANNEL: Channel = Channel::Move;
}

impl Payload for Shoot {
    const CHANNEL: Channel = Channel::Shoot;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("frame too short: {actual} bytes, header needs {required}")]
    FrameTooShort { actual: usize, required: usize },
    #[error(
        "payload size mismatch: header declares {declared}, {channel} payload is {expected}, frame carries {actual}"
    )]
    PayloadSizeMismatch {
        channel: Channel,
        declared: u32,
        expected: usize,
        actual: usize,
    },
}

pub fn encode<P: Payload>(header: &Header, payload: &P) -> Vec<u8> {
    let mut frame = Vec::with_capacity(Header::SIZE + P::SIZE);
    frame.extend_from_slice(bytemuck::bytes_of(header));
    frame.extend_from_slice(bytemuck::bytes_of(payload));
    frame
}

/// Encodes `payload` behind a header carrying its exact size.
pub fn make_message<P: Payload>(player_id: PlayerId, payload: &P) -> Vec<u8> {
    let header = Header::new(player_id, P::SIZE as u32);
    encode(&header, payload)
}

pub fn decode<P: Payload>(frame: &[u8]) -> Result<(Header, P), CodecError> {
    if frame.len() < Header::SIZE {
        return Err(CodecError::FrameTooShort {
            actual: frame.len(),
            required: Header::SIZE,
        });
    }

    let (head, body) = frame.split_at(Header::SIZE);
    let header: Header = bytemuck::pod_read_unaligned(head);

    if header.payload_size as usize != P::SIZE || body.len() != header.payload_size as usize {
        return Err(CodecError::PayloadSizeMismatch {
            channel: P::CHANNEL,
            declared: header.payload_size,
            expected: P::SIZE,
            actual: body.len(),
        });
    }

    Ok((header, bytemuck::pod_read_unaligned(body)))
}
