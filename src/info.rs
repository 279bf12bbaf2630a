use std::collections::HashMap;

use log::warn;

use crate::error::SampQueryError;
use crate::packet::ResponsePacket;
use crate::parse;

/// Server information as obtained by
/// [SampQuery::server_info](crate::query::SampQuery::server_info).
#[derive(Debug, PartialEq, Eq)]
pub struct ServerInfo {
    /// Is the server password protected?
    pub password_protected: bool,
    /// Current players
    pub players: u16,
    /// Max players
    pub maxplayers: u16,
    /// Server hostname
    pub hostname: String,
    /// Name of the running gamemode
    pub gamemode: String,
    /// Language advertised by the server
    pub language: String,
}

impl ServerInfo {
    /// Parse a [ResponsePacket] into its corresponding [ServerInfo].
    ///
    /// `players` above `maxplayers` is legal on the wire and passed
    /// through untouched.
    pub fn parse(packet: ResponsePacket) -> Result<ServerInfo, SampQueryError> {
        let data: Vec<u8> = packet.body();
        let data: &[u8] = data.as_slice();
        let mut offset: usize = 0;

        let password_protected: bool = parse::get_u8(data, &mut offset)? != 0;
        let players: u16 = parse::get_u16(data, &mut offset)?;
        let maxplayers: u16 = parse::get_u16(data, &mut offset)?;
        let hostname: String = parse::get_block_string(data, &mut offset)?;
        let gamemode: String = parse::get_block_string(data, &mut offset)?;
        let language: String = parse::get_block_string(data, &mut offset)?;

        Ok(ServerInfo {
            password_protected,
            players,
            maxplayers,
            hostname,
            gamemode,
            language,
        })
    }
}

/// Server rules as obtained by [SampQuery::rules](crate::query::SampQuery::rules).
///
/// The wire format does not make rule keys unique; when a server repeats
/// a key, the last occurrence wins.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub rules: HashMap<String, String>,
}

impl RuleSet {
    /// Parse a [ResponsePacket] into its corresponding [RuleSet].
    ///
    /// Exactly the declared number of pairs is read; trailing bytes past
    /// the declared count are not trusted.
    pub fn parse(packet: ResponsePacket) -> Result<RuleSet, SampQueryError> {
        let data: Vec<u8> = packet.body();
        let data: &[u8] = data.as_slice();
        let mut offset: usize = 0;

        let count: u16 = parse::get_u16(data, &mut offset)?;
        let mut rules: HashMap<String, String> = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let key: String = parse::get_short_string(data, &mut offset)?;
            let value: String = parse::get_short_string(data, &mut offset)?;
            rules.insert(key, value);
        }

        Ok(RuleSet { rules })
    }

    /// Value of a single rule, if the server reported it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.rules.get(name).map(String::as_str)
    }
}

/// One entry of the short client list.
#[derive(Debug, PartialEq, Eq)]
pub struct PlayerSummary {
    pub name: String,
    pub score: i16,
}

/// Connected clients keyed by name, as obtained by
/// [SampQuery::client_list](crate::query::SampQuery::client_list).
///
/// Names are unique on a real server; a duplicate overwrites the earlier
/// entry.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ClientList {
    pub players: HashMap<String, PlayerSummary>,
}

impl ClientList {
    /// Parse a [ResponsePacket] into its corresponding [ClientList].
    pub fn parse(packet: ResponsePacket) -> Result<ClientList, SampQueryError> {
        let data: Vec<u8> = packet.body();
        let data: &[u8] = data.as_slice();
        let mut offset: usize = 0;

        // the count slot is two bytes wide but only the first carries a
        // value; the second is reserved and observed as always zero
        let count: u8 = parse::get_u8(data, &mut offset)?;
        let reserved: u8 = parse::get_u8(data, &mut offset)?;
        if reserved != 0 {
            warn!(
                "client list reserved byte is {:#04x}, expected zero",
                reserved
            );
        }

        let mut players: HashMap<String, PlayerSummary> = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let name: String = parse::get_short_string(data, &mut offset)?;
            let score: i16 = parse::get_i16(data, &mut offset)?;
            // two unused bytes trail every entry
            parse::skip(data, &mut offset, 2)?;
            players.insert(name.clone(), PlayerSummary { name, score });
        }

        Ok(ClientList { players })
    }
}

/// One entry of the detailed player list.
#[derive(Debug, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: u8,
    pub name: String,
    pub score: i16,
    pub ping: u16,
}

/// Detailed player records keyed by id, as obtained by
/// [SampQuery::player_list](crate::query::SampQuery::player_list).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PlayerList {
    pub players: HashMap<u8, PlayerRecord>,
}

impl PlayerList {
    /// Parse a [ResponsePacket] into its corresponding [PlayerList].
    pub fn parse(packet: ResponsePacket) -> Result<PlayerList, SampQueryError> {
        let data: Vec<u8> = packet.body();
        let data: &[u8] = data.as_slice();
        let mut offset: usize = 0;

        let count: u16 = parse::get_u16(data, &mut offset)?;
        let mut players: HashMap<u8, PlayerRecord> = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let id: u8 = parse::get_u8(data, &mut offset)?;
            let name: String = parse::get_short_string(data, &mut offset)?;
            let score: i16 = parse::get_i16(data, &mut offset)?;
            // the ping slot is four bytes wide; only the low half is the ping
            let ping: u16 = parse::get_u16(data, &mut offset)?;
            parse::skip(data, &mut offset, 2)?;
            players.insert(
                id,
                PlayerRecord {
                    id,
                    name,
                    score,
                    ping,
                },
            );
        }

        Ok(PlayerList { players })
    }
}

/// Four pseudo-random probe bytes as obtained by
/// [SampQuery::pseudorandom](crate::query::SampQuery::pseudorandom).
#[derive(Debug, PartialEq, Eq)]
pub struct PseudoRandomSample {
    pub bytes: [u8; 4],
}

impl PseudoRandomSample {
    /// Parse a [ResponsePacket] into its corresponding [PseudoRandomSample].
    ///
    /// The payload is positional: no length prefix, no count field.
    pub fn parse(packet: ResponsePacket) -> Result<PseudoRandomSample, SampQueryError> {
        let data: Vec<u8> = packet.body();
        let data: &[u8] = data.as_slice();
        let mut offset: usize = 0;

        let bytes: [u8; 4] = parse::get_bytes(data, &mut offset, 4)?.try_into()?;

        Ok(PseudoRandomSample { bytes })
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::packet::{Opcode, RequestPacket};

    fn response(opcode: Opcode, payload: &[u8]) -> ResponsePacket {
        let mut bytes = RequestPacket::new(Ipv4Addr::LOCALHOST, 7777, opcode).pack();
        bytes.extend_from_slice(payload);
        ResponsePacket::unpack(&bytes, opcode).expect("valid header")
    }

    fn block_string(s: &str) -> Vec<u8> {
        let mut bytes = (s.len() as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(s.as_bytes());
        bytes
    }

    fn short_string(s: &str) -> Vec<u8> {
        let mut bytes = vec![s.len() as u8];
        bytes.extend_from_slice(s.as_bytes());
        bytes
    }

    #[test]
    fn parses_server_info() {
        let mut payload: Vec<u8> = vec![0];
        payload.extend_from_slice(&5u16.to_le_bytes());
        payload.extend_from_slice(&1000u16.to_le_bytes());
        payload.extend(block_string("Test"));
        payload.extend(block_string("DM"));
        payload.extend(block_string("EN"));

        let info = ServerInfo::parse(response(Opcode::Info, &payload)).unwrap();
        assert_eq!(
            info,
            ServerInfo {
                password_protected: false,
                players: 5,
                maxplayers: 1000,
                hostname: "Test".to_owned(),
                gamemode: "DM".to_owned(),
                language: "EN".to_owned(),
            }
        );
    }

    #[test]
    fn parses_server_info_with_empty_strings() {
        // also: current above max is not our problem, pass it through
        let mut payload: Vec<u8> = vec![1];
        payload.extend_from_slice(&200u16.to_le_bytes());
        payload.extend_from_slice(&100u16.to_le_bytes());
        payload.extend(block_string(""));
        payload.extend(block_string(""));
        payload.extend(block_string(""));

        let info = ServerInfo::parse(response(Opcode::Info, &payload)).unwrap();
        assert!(info.password_protected);
        assert_eq!(info.players, 200);
        assert_eq!(info.maxplayers, 100);
        assert_eq!(info.hostname, "");
        assert_eq!(info.gamemode, "");
        assert_eq!(info.language, "");
    }

    #[test]
    fn server_info_string_fields_round_trip_any_utf8() {
        let fields = ["Сервер «Тест»", "freeroam/дм", "русский"];
        let mut payload: Vec<u8> = vec![0];
        payload.extend_from_slice(&0u16.to_le_bytes());
        payload.extend_from_slice(&50u16.to_le_bytes());
        for field in fields {
            payload.extend(block_string(field));
        }

        let info = ServerInfo::parse(response(Opcode::Info, &payload)).unwrap();
        assert_eq!(info.hostname, fields[0]);
        assert_eq!(info.gamemode, fields[1]);
        assert_eq!(info.language, fields[2]);
    }

    #[test]
    fn server_info_ignores_padding_in_length_blocks() {
        // the high half of each length block is garbage on real servers
        let mut payload: Vec<u8> = vec![1];
        payload.extend_from_slice(&3u16.to_le_bytes());
        payload.extend_from_slice(&10u16.to_le_bytes());
        for field in ["Padded", "DM", "ID"] {
            payload.extend_from_slice(&(field.len() as u16).to_le_bytes());
            payload.extend_from_slice(&[0xAB, 0xCD]);
            payload.extend_from_slice(field.as_bytes());
        }

        let info = ServerInfo::parse(response(Opcode::Info, &payload)).unwrap();
        assert_eq!(info.hostname, "Padded");
        assert_eq!(info.gamemode, "DM");
        assert_eq!(info.language, "ID");
    }

    #[test]
    fn server_info_with_truncated_string_is_malformed() {
        let mut payload: Vec<u8> = vec![0];
        payload.extend_from_slice(&0u16.to_le_bytes());
        payload.extend_from_slice(&0u16.to_le_bytes());
        payload.extend_from_slice(&100u32.to_le_bytes());
        payload.extend_from_slice(b"short");

        let err = ServerInfo::parse(response(Opcode::Info, &payload)).unwrap_err();
        assert!(matches!(err, SampQueryError::MalformedPacket { .. }));
    }

    #[test]
    fn parses_rules() {
        let mut payload = 2u16.to_le_bytes().to_vec();
        payload.extend(short_string("version"));
        payload.extend(short_string("0.3.7"));
        payload.extend(short_string("weather"));
        payload.extend(short_string("10"));

        let rules = RuleSet::parse(response(Opcode::Rules, &payload)).unwrap();
        assert_eq!(rules.rules.len(), 2);
        assert_eq!(rules.get("version"), Some("0.3.7"));
        assert_eq!(rules.get("weather"), Some("10"));
    }

    #[test]
    fn repeated_rule_key_keeps_the_last_value() {
        let mut payload = 2u16.to_le_bytes().to_vec();
        payload.extend(short_string("weather"));
        payload.extend(short_string("10"));
        payload.extend(short_string("weather"));
        payload.extend(short_string("20"));

        let rules = RuleSet::parse(response(Opcode::Rules, &payload)).unwrap();
        assert_eq!(rules.rules.len(), 1);
        assert_eq!(rules.get("weather"), Some("20"));
    }

    #[test]
    fn rules_stop_at_the_declared_count() {
        let mut payload = 1u16.to_le_bytes().to_vec();
        payload.extend(short_string("gravity"));
        payload.extend(short_string("0.008"));
        payload.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let rules = RuleSet::parse(response(Opcode::Rules, &payload)).unwrap();
        assert_eq!(rules.rules.len(), 1);
        assert_eq!(rules.get("gravity"), Some("0.008"));
    }

    #[test]
    fn rules_short_of_the_declared_count_are_malformed() {
        let mut payload = 3u16.to_le_bytes().to_vec();
        payload.extend(short_string("version"));
        payload.extend(short_string("0.3.7"));
        payload.extend(short_string("weather"));
        payload.extend(short_string("10"));

        let err = RuleSet::parse(response(Opcode::Rules, &payload)).unwrap_err();
        assert!(matches!(err, SampQueryError::MalformedPacket { .. }));
    }

    #[test]
    fn parses_client_list() {
        let mut payload = vec![2u8, 0u8];
        payload.extend(short_string("Alice"));
        payload.extend_from_slice(&10i16.to_le_bytes());
        payload.extend_from_slice(&[0, 0]);
        payload.extend(short_string("Bob"));
        payload.extend_from_slice(&25i16.to_le_bytes());
        payload.extend_from_slice(&[0, 0]);

        let list = ClientList::parse(response(Opcode::ClientList, &payload)).unwrap();
        assert_eq!(list.players.len(), 2);
        assert_eq!(list.players["Alice"].score, 10);
        assert_eq!(list.players["Bob"].score, 25);
    }

    #[test]
    fn client_list_tolerates_a_nonzero_reserved_byte() {
        let mut payload = vec![1u8, 7u8];
        payload.extend(short_string("Carol"));
        payload.extend_from_slice(&(-5i16).to_le_bytes());
        payload.extend_from_slice(&[0, 0]);

        let list = ClientList::parse(response(Opcode::ClientList, &payload)).unwrap();
        assert_eq!(list.players["Carol"].score, -5);
    }

    #[test]
    fn client_list_short_of_the_declared_count_is_malformed() {
        let mut payload = vec![2u8, 0u8];
        payload.extend(short_string("Alice"));
        payload.extend_from_slice(&10i16.to_le_bytes());
        payload.extend_from_slice(&[0, 0]);

        let err = ClientList::parse(response(Opcode::ClientList, &payload)).unwrap_err();
        assert!(matches!(err, SampQueryError::MalformedPacket { .. }));
    }

    #[test]
    fn parses_player_list() {
        let mut payload = 2u16.to_le_bytes().to_vec();
        payload.push(0);
        payload.extend(short_string("Alice"));
        payload.extend_from_slice(&(-3i16).to_le_bytes());
        payload.extend_from_slice(&57u16.to_le_bytes());
        // the reserved half of the ping slot must not leak into the value
        payload.extend_from_slice(&[0xFF, 0xFF]);
        payload.push(1);
        payload.extend(short_string("Bob"));
        payload.extend_from_slice(&1200i16.to_le_bytes());
        payload.extend_from_slice(&102u16.to_le_bytes());
        payload.extend_from_slice(&[0, 0]);

        let list = PlayerList::parse(response(Opcode::PlayerList, &payload)).unwrap();
        assert_eq!(list.players.len(), 2);
        assert_eq!(
            list.players[&0],
            PlayerRecord {
                id: 0,
                name: "Alice".to_owned(),
                score: -3,
                ping: 57,
            }
        );
        assert_eq!(list.players[&1].score, 1200);
        assert_eq!(list.players[&1].ping, 102);
    }

    #[test]
    fn player_list_short_of_the_declared_count_is_malformed() {
        let mut payload = 2u16.to_le_bytes().to_vec();
        payload.push(0);
        payload.extend(short_string("Alice"));
        payload.extend_from_slice(&1i16.to_le_bytes());
        payload.extend_from_slice(&[20, 0, 0, 0]);

        let err = PlayerList::parse(response(Opcode::PlayerList, &payload)).unwrap_err();
        assert!(matches!(err, SampQueryError::MalformedPacket { .. }));
    }

    #[test]
    fn parses_pseudorandom_sample() {
        let sample =
            PseudoRandomSample::parse(response(Opcode::Pseudorandom, &[4, 8, 15, 16])).unwrap();
        assert_eq!(sample.bytes, [4, 8, 15, 16]);
    }

    #[test]
    fn pseudorandom_sample_shorter_than_four_bytes_is_malformed() {
        let err = PseudoRandomSample::parse(response(Opcode::Pseudorandom, &[1, 2, 3])).unwrap_err();
        assert!(matches!(err, SampQueryError::MalformedPacket { .. }));
    }
}
