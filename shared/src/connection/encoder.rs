use vrsync_serde::{BitWrite, BitWriter, Serde, UnsignedVariableInteger};

use crate::{
    connection::frame_header::FrameHeader,
    messages::{error::PacketKindsError, packet::Packet, packet_kinds::PacketKinds},
    types::PeerId,
};

/// Size of the prefix some transports put in front of every message: one tag
/// byte and a four byte length.
pub const TRANSPORT_PREFIX_LEN: usize = 1 + 4;

/// Serializes a packet's fields, in declaration order, into a byte buffer.
pub fn encode_payload<P: Packet>(packet: &P) -> Vec<u8> {
    let mut writer = BitWriter::with_capacity(packet.bit_length().div_ceil(8) as usize);
    packet.ser(&mut writer);
    writer.to_bytes()
}

/// Writes header, payload length and payload into one owned frame.
///
/// The length prefix is a variable integer in 7 bit chunks, so every chunk is
/// exactly one byte and the payload starts byte aligned.
pub fn write_frame(header: &FrameHeader, payload: &[u8]) -> Box<[u8]> {
    let length = UnsignedVariableInteger::<7>::new(payload.len() as u64);
    let mut writer = BitWriter::with_capacity(FrameHeader::LEN + 4 + payload.len());
    header.ser(&mut writer);
    length.ser(&mut writer);
    writer.write_bytes(payload);
    writer.to_bytes().into_boxed_slice()
}

/// Encodes `packet` as a complete frame. Deterministic: equal packets give
/// equal bytes.
pub fn marshal<P: Packet>(
    kinds: &PacketKinds,
    sender: PeerId,
    recipient: PeerId,
    packet: &P,
) -> Result<Box<[u8]>, PacketKindsError> {
    let kind = kinds.kind_of::<P>()?;
    let header = FrameHeader::new(sender, recipient, kind);
    Ok(write_frame(&header, &encode_payload(packet)))
}

/// Reserves `offset` zero bytes in front of a frame for transports that
/// write a fixed prefix in place.
pub fn pad(offset: usize, bytes: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(offset + bytes.len());
    output.resize(offset, 0);
    output.extend_from_slice(bytes);
    output
}
