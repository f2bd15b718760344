use vrsync_serde::{BitReader, Serde, UnsignedVariableInteger};

use crate::{
    connection::{error::DecodeError, frame_header::FrameHeader},
    messages::{packet::Packet, packet_kinds::PacketKinds},
};

/// Splits a frame into its header and payload slice.
///
/// SECURITY: `bytes` is untrusted network data. Every failure is returned as
/// a `DecodeError`, never a panic.
pub fn read_frame(bytes: &[u8]) -> Result<(FrameHeader, &[u8]), DecodeError> {
    if bytes.len() < FrameHeader::LEN {
        return Err(DecodeError::Truncated {
            needed: FrameHeader::LEN,
            actual: bytes.len(),
        });
    }

    let mut reader = BitReader::new(bytes);
    let header = FrameHeader::de(&mut reader).map_err(|_| DecodeError::MalformedHeader {
        reason: "header fields",
    })?;
    let length = UnsignedVariableInteger::<7>::de(&mut reader)
        .map_err(|_| DecodeError::MalformedHeader {
            reason: "payload length",
        })?
        .get();

    // length chunks are whole bytes, so the reader is aligned here
    let start = reader.bit_position() / 8;
    let end = usize::try_from(length)
        .ok()
        .and_then(|length| start.checked_add(length))
        .ok_or(DecodeError::MalformedHeader {
            reason: "payload length overflows",
        })?;

    if end > bytes.len() {
        return Err(DecodeError::Truncated {
            needed: end,
            actual: bytes.len(),
        });
    }
    if end < bytes.len() {
        return Err(DecodeError::TrailingBytes {
            count: bytes.len() - end,
        });
    }

    Ok((header, &bytes[start..end]))
}

/// Decodes a payload produced by `encode_payload::<P>`.
pub fn read_payload<P: Packet>(payload: &[u8]) -> Result<P, DecodeError> {
    let mut reader = BitReader::new(payload);
    let packet =
        P::de(&mut reader).map_err(|_| DecodeError::MalformedPayload { packet: P::NAME })?;

    // only the zero fill of the final byte may be left
    let leftover = reader.bytes_remaining();
    if leftover > 0 {
        return Err(DecodeError::TrailingBytes { count: leftover });
    }

    Ok(packet)
}

/// Decodes a whole frame, requiring it to carry a `P`.
pub fn unmarshal<P: Packet>(
    kinds: &PacketKinds,
    bytes: &[u8],
) -> Result<(FrameHeader, P), DecodeError> {
    let expected = kinds
        .kind_of::<P>()
        .map_err(|_| DecodeError::UnregisteredKind { name: P::NAME })?;

    let (header, payload) = read_frame(bytes)?;
    if header.packet_kind != expected {
        return Err(DecodeError::KindMismatch {
            expected,
            actual: header.packet_kind,
        });
    }

    Ok((header, read_payload::<P>(payload)?))
}

/// Strips the prefix reserved by `pad`.
pub fn unpad(offset: usize, bytes: &[u8]) -> Result<&[u8], DecodeError> {
    bytes.get(offset..).ok_or(DecodeError::Truncated {
        needed: offset,
        actual: bytes.len(),
    })
}
