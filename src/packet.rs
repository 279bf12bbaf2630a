use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

use crate::error::SampQueryError;

/// Marker identifying a datagram as a SA-MP query packet, both directions.
pub const PACKET_MAGIC: &[u8; 4] = b"SAMP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// `i` -- general server information: hostname, gamemode, player counts.
    Info,
    /// `r` -- server rules as key/value text pairs.
    Rules,
    /// `c` -- connected client names with scores.
    ClientList,
    /// `d` -- detailed player records including id and ping.
    PlayerList,
    /// `p` -- four pseudo-random probe bytes.
    Pseudorandom,
    /// `x` -- RCON command. Only the request side is supported.
    Rcon,
}

/// Convert a u8 into an [Opcode].
impl TryInto<Opcode> for u8 {
    type Error = SampQueryError;

    fn try_into(self) -> Result<Opcode, Self::Error> {
        match self {
            b'i' => Ok(Opcode::Info),
            b'r' => Ok(Opcode::Rules),
            b'c' => Ok(Opcode::ClientList),
            b'd' => Ok(Opcode::PlayerList),
            b'p' => Ok(Opcode::Pseudorandom),
            b'x' => Ok(Opcode::Rcon),
            n => Err(SampQueryError::UnknownOpcode(n)),
        }
    }
}

/// For packing an [Opcode] into a packet in [RequestPacket::pack].
impl Opcode {
    pub fn to_byte(&self) -> u8 {
        match self {
            Opcode::Info => b'i',
            Opcode::Rules => b'r',
            Opcode::ClientList => b'c',
            Opcode::PlayerList => b'd',
            Opcode::Pseudorandom => b'p',
            Opcode::Rcon => b'x',
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RequestPacket {
    addr: Ipv4Addr,
    port: u16,
    opcode: Opcode,
    rcon_command: Option<String>,
}

impl RequestPacket {
    pub fn new(addr: Ipv4Addr, port: u16, opcode: Opcode) -> Self {
        RequestPacket {
            addr,
            port,
            opcode,
            rcon_command: None,
        }
    }

    /// Request packet carrying an RCON command after the opcode.
    pub fn rcon(addr: Ipv4Addr, port: u16, command: String) -> Self {
        RequestPacket {
            addr,
            port,
            opcode: Opcode::Rcon,
            rcon_command: Some(command),
        }
    }

    /// Serializes a request packet into an array of bytes.
    ///
    /// The server expects its own address and port repeated inside the
    /// packet, so both are written verbatim after the marker.
    pub fn pack(&self) -> Vec<u8> {
        // packet structure: marker, address, port, opcode (and rcon command)
        let mut payload: Vec<u8> = Vec::<u8>::new();
        payload.extend_from_slice(PACKET_MAGIC);
        payload.extend_from_slice(&self.addr.octets());
        payload.extend_from_slice(&self.port.to_le_bytes());
        payload.push(self.opcode.to_byte());
        if let Some(c) = &self.rcon_command {
            payload.extend_from_slice(c.as_bytes());
        }

        payload
    }

    pub fn opcode(&self) -> &Opcode {
        &self.opcode
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ResponsePacket {
    opcode: Opcode,
    body: Vec<u8>,
}

impl ResponsePacket {
    const MAGIC_RANGE: RangeInclusive<usize> = 0..=3;
    const OPCODE_OFFSET: usize = 10;
    const BODY_OFFSET: usize = 11;

    /// Deserializes an incoming datagram, splitting it into header and body.
    ///
    /// The header must carry the `SAMP` marker and answer the `expected`
    /// query kind. The echoed address and port are discarded without being
    /// compared; NAT rewrites them on some routes.
    pub fn unpack(incoming: &[u8], expected: Opcode) -> Result<Self, SampQueryError> {
        if incoming.len() < Self::BODY_OFFSET {
            return Err(SampQueryError::TruncatedHeader(incoming.len()));
        }

        let raw_magic: &[u8] = &incoming[Self::MAGIC_RANGE];
        if raw_magic != PACKET_MAGIC {
            return Err(SampQueryError::InvalidMagic(raw_magic.try_into()?));
        }

        let opcode: Opcode = incoming[Self::OPCODE_OFFSET].try_into()?;
        if opcode != expected {
            return Err(SampQueryError::OpcodeMismatch {
                expected,
                got: opcode,
            });
        }

        let body: Vec<u8> = incoming[Self::BODY_OFFSET..].to_vec();

        Ok(ResponsePacket { opcode, body })
    }

    pub fn opcode(&self) -> &Opcode {
        &self.opcode
    }

    pub fn body(&self) -> Vec<u8> {
        self.body.clone()
    }
}
