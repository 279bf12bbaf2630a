use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use log::debug;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::error::SampQueryError;

use crate::info::{ClientList, PlayerList, PseudoRandomSample, RuleSet, ServerInfo};
use crate::packet::{Opcode, RequestPacket, ResponsePacket};

/// SA-MP responses fit a single datagram; a full 100 player detailed list
/// runs to roughly 3.4 KiB.
const RECV_BUFFER_LEN: usize = 4096;

/// Deadline applied to each network step of a single query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Client for the SA-MP query protocol, bound to one server endpoint.
///
/// Example usage:
/// ```no_run
/// # use rsampquery::query::SampQuery;
/// # async fn run() -> Result<(), rsampquery::error::SampQueryError> {
/// let query = SampQuery::new("51.79.212.100", 7777)?;
/// let info = query.server_info().await?;
/// println!("{} ({}/{})", info.hostname, info.players, info.maxplayers);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SampQuery {
    addr: Ipv4Addr,
    port: u16,
    timeout_dur: Duration,
}

/// Local server on the stock SA-MP port.
impl Default for SampQuery {
    fn default() -> Self {
        SampQuery {
            addr: Ipv4Addr::LOCALHOST,
            port: 7777,
            timeout_dur: DEFAULT_TIMEOUT,
        }
    }
}

impl SampQuery {
    /// Client for `addr:port` with the default per-request timeout.
    ///
    /// Fails fast on a non-IPv4 `addr` before any socket is opened.
    pub fn new(addr: &str, port: u16) -> Result<Self, SampQueryError> {
        Ok(SampQuery {
            addr: addr.parse()?,
            port,
            timeout_dur: DEFAULT_TIMEOUT,
        })
    }

    /// Same as [SampQuery::new] with an explicit per-request timeout.
    pub fn with_timeout(
        addr: &str,
        port: u16,
        timeout_dur: Duration,
    ) -> Result<Self, SampQueryError> {
        Ok(SampQuery {
            addr: addr.parse()?,
            port,
            timeout_dur,
        })
    }

    /// Query general server information (`i`).
    pub async fn server_info(&self) -> Result<ServerInfo, SampQueryError> {
        ServerInfo::parse(self.request(Opcode::Info).await?)
    }

    /// Query the server rules (`r`).
    pub async fn rules(&self) -> Result<RuleSet, SampQueryError> {
        RuleSet::parse(self.request(Opcode::Rules).await?)
    }

    /// Query the short client list (`c`).
    pub async fn client_list(&self) -> Result<ClientList, SampQueryError> {
        ClientList::parse(self.request(Opcode::ClientList).await?)
    }

    /// Query the detailed player list (`d`).
    pub async fn player_list(&self) -> Result<PlayerList, SampQueryError> {
        PlayerList::parse(self.request(Opcode::PlayerList).await?)
    }

    /// Query the four pseudo-random probe bytes (`p`).
    pub async fn pseudorandom(&self) -> Result<PseudoRandomSample, SampQueryError> {
        PseudoRandomSample::parse(self.request(Opcode::Pseudorandom).await?)
    }

    /// Round-trip latency of an information query.
    pub async fn ping(&self) -> Result<Duration, SampQueryError> {
        let start: Instant = Instant::now();
        self.request(Opcode::Info).await?;
        Ok(start.elapsed())
    }

    pub async fn server_name(&self) -> Result<String, SampQueryError> {
        Ok(self.server_info().await?.hostname)
    }

    pub async fn gamemode_name(&self) -> Result<String, SampQueryError> {
        Ok(self.server_info().await?.gamemode)
    }

    pub async fn language(&self) -> Result<String, SampQueryError> {
        Ok(self.server_info().await?.language)
    }

    pub async fn online_players(&self) -> Result<u16, SampQueryError> {
        Ok(self.server_info().await?.players)
    }

    pub async fn max_players(&self) -> Result<u16, SampQueryError> {
        Ok(self.server_info().await?.maxplayers)
    }

    pub async fn is_passworded(&self) -> Result<bool, SampQueryError> {
        Ok(self.server_info().await?.password_protected)
    }

    /// Value of a single server rule, if the server reported it.
    pub async fn rule(&self, name: &str) -> Result<Option<String>, SampQueryError> {
        Ok(self.rules().await?.get(name).map(str::to_string))
    }

    pub async fn version(&self) -> Result<Option<String>, SampQueryError> {
        self.rule("version").await
    }

    pub async fn weather(&self) -> Result<Option<String>, SampQueryError> {
        self.rule("weather").await
    }

    pub async fn website(&self) -> Result<Option<String>, SampQueryError> {
        self.rule("weburl").await
    }

    pub async fn world_time(&self) -> Result<Option<String>, SampQueryError> {
        self.rule("worldtime").await
    }

    /// Issue one query and hand back the validated response.
    ///
    /// The wire format carries no correlation id, so every request gets its
    /// own short-lived socket: any datagram that socket receives can only
    /// answer this request. The socket is dropped on every exit path,
    /// success or not, which also disarms a late reply.
    async fn request(&self, opcode: Opcode) -> Result<ResponsePacket, SampQueryError> {
        // just arbitrarily bind any port, doesn't matter really
        let sock: UdpSocket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(SampQueryError::FailedPortBind)?;

        // connecting filters inbound traffic to the server's address
        timeout(self.timeout_dur, sock.connect((self.addr, self.port)))
            .await?
            .map_err(SampQueryError::UnreachableHost)?;

        let packet: RequestPacket = RequestPacket::new(self.addr, self.port, opcode);

        // sending
        timeout(self.timeout_dur, sock.send(&packet.pack()))
            .await?
            .map_err(SampQueryError::SendError)?;
        debug!("sent {:?} query to {}:{}", opcode, self.addr, self.port);

        // receiving packet; the deadline runs from the send handoff
        let mut resp_buf: [u8; RECV_BUFFER_LEN] = [0u8; RECV_BUFFER_LEN];
        let received: usize = timeout(self.timeout_dur, sock.recv(&mut resp_buf))
            .await?
            .map_err(SampQueryError::ReceiveError)?;
        debug!(
            "received {} byte(s) from {}:{}",
            received, self.addr, self.port
        );

        ResponsePacket::unpack(&resp_buf[..received], opcode)
    }
}
