//! Gateway client.
//!
//! One [`GatewayClient`] owns one connection. Outbound requests are
//! serialized under the writer lock; for every request a one-shot waiter is
//! queued on the expected confirmation command *before* the frame reaches
//! the wire, so a fast confirmation can never outrun its registration.
//! Inbound frames are decoded by a reader task and routed in order of
//! specificity: the front one-shot waiter of the command's queue (FIFO per
//! command), then the stream slot registered for the frame's session id,
//! then the stream slot registered for the command id, and finally the
//! ambient broadcast channel. Stream slots give each [`Collector`] a private
//! per-call channel, so concurrent notification streams cannot merge.
//!
//! Link lifecycle: `Authenticating` after the stream is handed over,
//! `Ready` once the gateway accepts the password, `Disconnected` on any
//! transport failure. Disconnection fails every pending waiter with
//! [`ClientError::TransportClosed`] and fires the [`GatewayClient::closed`]
//! signal; the client does not reconnect.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError},
    time::Duration,
};

use klf_proto::{
    Command, FunctionalParameter, Response,
    messages::{
        self, GatewayRequest, GatewayResponse,
        auth::PasswordEnterReq,
        command_handler::{CommandRunStatusNtf, CommandSendReq},
        config::{ControllerCopyMode, CsControllerCopyReq},
        general::{
            GetLocalTimeCfm, GetLocalTimeReq, GetNetworkSetupCfm, GetNetworkSetupReq,
            GetProtocolVersionCfm, GetProtocolVersionReq, GetStateCfm, GetStateReq, GetVersionCfm,
            GetVersionReq, RtcSetTimeZoneReq, SetUtcReq,
        },
        info::{GetAllNodesInformationNtf, GetAllNodesInformationReq},
    },
    slip::SlipDecoder,
    wire,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    sync::{broadcast, mpsc, oneshot, watch, Mutex},
    time::Instant,
};

use crate::{collector::Collector, error::ClientError, session::SessionPool, transport};

/// Idle interval after which the client pings the gateway. The gateway
/// closes connections after roughly fifteen minutes of silence.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Ambient notification channel capacity. Sized for a full-system node
/// enumeration burst.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Connection lifecycle, observable for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Stream is up, password not yet accepted.
    Authenticating,
    /// Password accepted; operations available.
    Ready,
    /// Transport failed or closed. Terminal.
    Disconnected,
}

type WaiterQueue = VecDeque<oneshot::Sender<Response>>;

/// Routing key of a [`Collector`] stream slot.
///
/// Session keys correlate by the 16-bit session id a notification carries;
/// command keys claim every frame of one command id and are therefore
/// single-consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum StreamKey {
    /// All frames of one command id.
    Command(u16),
    /// All session-tagged frames carrying this session id.
    Session(u16),
}

struct Writer {
    io: Box<dyn AsyncWrite + Send + Unpin>,
    last_send: Instant,
}

struct Inner {
    /// Orders outbound frames and the waiter registrations that precede them.
    writer: Mutex<Writer>,
    /// Per-command FIFO queues of one-shot completions.
    waiters: StdMutex<HashMap<u16, WaiterQueue>>,
    /// Per-collector stream slots, keyed by session or command id.
    streams: StdMutex<HashMap<StreamKey, mpsc::UnboundedSender<Response>>>,
    /// Live session ids.
    sessions: StdMutex<SessionPool>,
    link: StdMutex<LinkState>,
    /// Serializes node enumerations: their notifications carry no
    /// discriminator, so interleaved streams cannot be told apart.
    enumeration: Mutex<()>,
    /// Frames nobody was waiting for: ambient notifications.
    events: broadcast::Sender<Response>,
    closed: watch::Sender<bool>,
}

/// Handle to one gateway connection. Cheap to clone; all clones share the
/// connection.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<Inner>,
}

impl GatewayClient {
    /// Connect to the gateway over TLS and hand the stream to a new client.
    pub async fn connect(host: &str, port: u16) -> Result<Self, ClientError> {
        let stream = transport::connect(host, port).await?;
        Ok(Self::from_stream(stream))
    }

    /// Drive a client over an arbitrary byte stream.
    ///
    /// Spawns the reader task on the current runtime. Production passes the
    /// TLS stream; tests pass one end of an in-memory duplex pipe.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (closed, _) = watch::channel(false);

        let inner = Arc::new(Inner {
            writer: Mutex::new(Writer { io: Box::new(write_half), last_send: Instant::now() }),
            waiters: StdMutex::new(HashMap::new()),
            streams: StdMutex::new(HashMap::new()),
            sessions: StdMutex::new(SessionPool::new()),
            link: StdMutex::new(LinkState::Authenticating),
            enumeration: Mutex::new(()),
            events,
            closed,
        });

        tokio::spawn(read_loop(Arc::clone(&inner), read_half));

        Self { inner }
    }

    /// Current link state.
    #[must_use]
    pub fn state(&self) -> LinkState {
        *self.inner.lock_link()
    }

    /// Number of live session ids.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.inner.lock_sessions().len()
    }

    /// Subscribe to ambient notifications: every decoded frame no waiter or
    /// collector claimed (`GW_ERROR_NTF`, node state broadcasts, ...).
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<Response> {
        self.inner.events.subscribe()
    }

    /// Resolves when the link is gone.
    pub async fn closed(&self) {
        let mut rx = self.inner.closed.subscribe();
        // Either the flag is already set or the channel closes with Inner.
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Send a request and await its confirmation.
    pub async fn send<R: GatewayRequest>(&self, request: &R) -> Result<R::Cfm, ClientError> {
        let expect = <R::Cfm as GatewayResponse>::COMMAND.to_u16();
        let payload = messages::encode_request(request);
        tracing::debug!(command = ?R::COMMAND, "sending request");

        let rx = self.issue(&payload, expect).await?;
        let response = rx.await.map_err(|_| ClientError::TransportClosed)?;
        R::Cfm::try_from(response)
            .map_err(|_| ClientError::UnexpectedResponse { expected: expect })
    }

    /// Register a one-shot waiter for the next frame of `command` without
    /// sending anything. Waiters of the same command resolve in FIFO order;
    /// dropping the waiter cancels it.
    #[must_use]
    pub fn subscribe(&self, command: Command) -> ResponseWaiter {
        let (tx, rx) = oneshot::channel();
        self.inner.lock_waiters().entry(command.to_u16()).or_default().push_back(tx);
        ResponseWaiter { rx }
    }

    /// Authenticate the connection. Returns whether the gateway accepted the
    /// password; on success the link moves to [`LinkState::Ready`].
    pub async fn authenticate(&self, password: &str) -> Result<bool, ClientError> {
        let cfm = self.send(&PasswordEnterReq::new(password)).await?;
        if cfm.is_success() {
            *self.inner.lock_link() = LinkState::Ready;
            tracing::info!("authenticated on the gateway");
        } else {
            tracing::warn!(status = cfm.status, "gateway refused the password");
        }
        Ok(cfm.is_success())
    }

    /// `GW_GET_STATE_REQ` round trip; doubles as the keep-alive ping.
    pub async fn ping(&self) -> Result<GetStateCfm, ClientError> {
        self.send(&GetStateReq).await
    }

    /// Gateway software/hardware version.
    pub async fn get_version(&self) -> Result<GetVersionCfm, ClientError> {
        self.send(&GetVersionReq).await
    }

    /// Gateway protocol version.
    pub async fn get_protocol_version(&self) -> Result<GetProtocolVersionCfm, ClientError> {
        self.send(&GetProtocolVersionReq).await
    }

    /// Gateway IPv4 configuration.
    pub async fn get_network_setup(&self) -> Result<GetNetworkSetupCfm, ClientError> {
        self.send(&GetNetworkSetupReq).await
    }

    /// Gateway clock in local time.
    pub async fn get_local_time(&self) -> Result<GetLocalTimeCfm, ClientError> {
        self.send(&GetLocalTimeReq).await
    }

    /// Set the gateway clock.
    pub async fn set_utc(&self, timestamp: u32) -> Result<(), ClientError> {
        self.send(&SetUtcReq { timestamp }).await?;
        Ok(())
    }

    /// Set the gateway time zone rules.
    pub async fn set_time_zone(&self, time_zone: &str) -> Result<(), ClientError> {
        let cfm = self.send(&RtcSetTimeZoneReq { time_zone: time_zone.to_owned() }).await?;
        if cfm.is_success() {
            Ok(())
        } else {
            Err(ClientError::Rejected { operation: "GW_RTC_SET_TIME_ZONE_REQ", status: cfm.status })
        }
    }

    /// Start a controller copy in the given direction.
    pub async fn controller_copy(&self, mode: ControllerCopyMode) -> Result<(), ClientError> {
        self.send(&CsControllerCopyReq { mode }).await?;
        Ok(())
    }

    /// Enumerate every node the gateway knows: request, confirmation, one
    /// notification per node, finished notification.
    ///
    /// Node notifications carry no discriminator, so concurrent calls are
    /// serialized; each caller gets the complete stream of its own request.
    pub async fn nodes(&self) -> Result<Vec<GetAllNodesInformationNtf>, ClientError> {
        let _enumeration = self.inner.enumeration.lock().await;

        let collector = Collector::commands(
            self,
            Command::GetAllNodesInformationNtf,
            Command::GetAllNodesInformationFinishedNtf,
        )?;
        let cfm = collector.send(&GetAllNodesInformationReq).await?;
        if !cfm.is_success() {
            return Err(ClientError::Rejected {
                operation: "GW_GET_ALL_NODES_INFORMATION_REQ",
                status: cfm.status,
            });
        }
        tracing::debug!(total = cfm.total_nodes, "collecting node information stream");

        let responses = collector.collect().await?;
        Ok(responses
            .into_iter()
            .filter_map(|response| GetAllNodesInformationNtf::try_from(response).ok())
            .collect())
    }

    /// Drive the main parameter of `nodes` to `parameter` and harvest the
    /// run-status stream until the session finishes.
    pub async fn send_command(
        &self,
        nodes: Vec<u8>,
        parameter: FunctionalParameter,
    ) -> Result<CommandRun, ClientError> {
        let session_id = self.inner.lock_sessions().allocate()?;
        let request = CommandSendReq::to_nodes(session_id, nodes, parameter);

        let collector = match Collector::session(
            self,
            session_id,
            Command::CommandRunStatusNtf,
            Command::SessionFinishedNtf,
        ) {
            Ok(collector) => collector,
            // Unreachable with ids from our own pool; reclaim and surface.
            Err(error) => {
                self.inner.release_session(session_id);
                return Err(error);
            },
        };
        let cfm = collector.send(&request).await?;
        if !cfm.is_success() {
            // A refused command never produces GW_SESSION_FINISHED_NTF, so
            // the id is reclaimed locally.
            self.inner.release_session(session_id);
            return Err(ClientError::Rejected {
                operation: "GW_COMMAND_SEND_REQ",
                status: cfm.status,
            });
        }

        let events = collector.collect().await?;
        let run_status = events
            .into_iter()
            .filter_map(|response| CommandRunStatusNtf::try_from(response).ok())
            .collect();
        Ok(CommandRun { session_id, run_status })
    }

    /// Spawn the keep-alive task: ten minutes after the last outbound frame
    /// it pings the gateway; any send pushes the deadline.
    pub fn spawn_keep_alive(&self) -> tokio::task::JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            loop {
                let deadline =
                    { client.inner.writer.lock().await.last_send } + KEEP_ALIVE_INTERVAL;
                if Instant::now() >= deadline {
                    tracing::debug!("keep-alive ping");
                    if client.ping().await.is_err() {
                        return;
                    }
                    continue;
                }
                tokio::select! {
                    () = tokio::time::sleep_until(deadline) => {},
                    () = client.closed() => return,
                }
            }
        })
    }

    /// Claim stream slots for the given keys, all feeding one channel.
    ///
    /// Fails with [`ClientError::CollectorBusy`] if any key is held by a
    /// live collector.
    pub(crate) fn register_stream(
        &self,
        keys: &[StreamKey],
    ) -> Result<mpsc::UnboundedReceiver<Response>, ClientError> {
        let mut streams = self.inner.lock_streams();
        for key in keys {
            if let Some(existing) = streams.get(key) {
                if !existing.is_closed() {
                    return Err(ClientError::CollectorBusy);
                }
            }
        }
        let (tx, rx) = mpsc::unbounded_channel();
        for key in keys {
            streams.insert(*key, tx.clone());
        }
        Ok(rx)
    }

    /// Release a stream slot.
    pub(crate) fn remove_stream(&self, key: &StreamKey) {
        self.inner.lock_streams().remove(key);
    }

    /// Queue a waiter on `expect`, then write the framed payload.
    ///
    /// Both happen under the writer lock, so registration order equals wire
    /// order and FIFO delivery matches FIFO issuance.
    async fn issue(
        &self,
        payload: &[u8],
        expect: u16,
    ) -> Result<oneshot::Receiver<Response>, ClientError> {
        let framed = klf_proto::slip::encode(payload);

        let mut writer = self.inner.writer.lock().await;
        if *self.inner.lock_link() == LinkState::Disconnected {
            return Err(ClientError::TransportClosed);
        }

        let (tx, rx) = oneshot::channel();
        self.inner.lock_waiters().entry(expect).or_default().push_back(tx);

        if let Err(error) = write_all_flush(&mut *writer.io, &framed).await {
            drop(writer);
            // The link is dead; shutdown drains the waiter we just queued
            // along with everything else.
            self.inner.shutdown();
            return Err(error.into());
        }
        writer.last_send = Instant::now();
        Ok(rx)
    }
}

/// Future for one frame of a subscribed command.
#[derive(Debug)]
pub struct ResponseWaiter {
    rx: oneshot::Receiver<Response>,
}

impl ResponseWaiter {
    /// Wait for the frame.
    pub async fn wait(self) -> Result<Response, ClientError> {
        self.rx.await.map_err(|_| ClientError::TransportClosed)
    }
}

/// Outcome of a completed actuator command session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRun {
    /// Session id the operation ran under.
    pub session_id: u16,
    /// Run-status notifications collected until the session finished.
    pub run_status: Vec<CommandRunStatusNtf>,
}

async fn write_all_flush(
    io: &mut (dyn AsyncWrite + Send + Unpin),
    bytes: &[u8],
) -> std::io::Result<()> {
    io.write_all(bytes).await?;
    io.flush().await
}

async fn read_loop<R>(inner: Arc<Inner>, mut io: R)
where
    R: AsyncRead + Unpin,
{
    let mut decoder = SlipDecoder::new();
    let mut buf = [0u8; 4096];
    loop {
        match io.read(&mut buf).await {
            Ok(0) => {
                tracing::info!("gateway closed the connection");
                break;
            },
            Ok(n) => {
                if decoder.extend(&buf[..n]).is_err() {
                    tracing::warn!("oversized partial frame dropped, resynchronizing");
                }
                while let Some(frame) = decoder.next_frame() {
                    inner.dispatch(&frame);
                }
            },
            Err(error) => {
                tracing::error!(%error, "gateway read failed");
                break;
            },
        }
    }
    inner.shutdown();
}

impl Inner {
    fn lock_waiters(&self) -> MutexGuard<'_, HashMap<u16, WaiterQueue>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_streams(&self) -> MutexGuard<'_, HashMap<StreamKey, mpsc::UnboundedSender<Response>>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_sessions(&self) -> MutexGuard<'_, SessionPool> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_link(&self) -> MutexGuard<'_, LinkState> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decode one deframed payload and route it.
    fn dispatch(&self, frame: &[u8]) {
        let (command, arguments) = match wire::decode_payload(frame) {
            Ok(parts) => parts,
            Err(error) => {
                tracing::warn!(%error, "dropping invalid frame");
                return;
            },
        };
        let response = match Response::decode(command, arguments) {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "dropping undecodable frame");
                return;
            },
        };
        tracing::trace!("frame received: command {command:#06x}");

        if let Response::SessionFinishedNtf(ntf) = &response {
            self.release_session(ntf.session_id);
        }
        if let Response::ErrorNtf(ntf) = &response {
            tracing::warn!(code = ntf.code, "gateway error: {}", ntf.describe());
        }

        let leftover = {
            let mut waiters = self.lock_waiters();
            match waiters.get_mut(&command) {
                Some(queue) => {
                    let leftover = offer(queue, response);
                    if queue.is_empty() {
                        waiters.remove(&command);
                    }
                    leftover
                },
                None => Some(response),
            }
        };
        let Some(response) = leftover else { return };
        let Some(response) = self.offer_stream(response) else { return };
        // Nobody was waiting; publish to ambient subscribers (dropped if
        // there are none).
        let _ = self.events.send(response);
    }

    /// Route a frame to its collector stream slot: session id first, then
    /// command id. Dead slots (collector dropped) are reaped and the frame
    /// moves on; returns the frame if no slot takes it.
    fn offer_stream(&self, response: Response) -> Option<Response> {
        let mut streams = self.lock_streams();
        let mut response = response;

        if let Some(session_id) = response.session_id() {
            let key = StreamKey::Session(session_id);
            if let Some(tx) = streams.get(&key) {
                match tx.send(response) {
                    Ok(()) => return None,
                    Err(mpsc::error::SendError(returned)) => {
                        streams.remove(&key);
                        response = returned;
                    },
                }
            }
        }

        let key = StreamKey::Command(response.command_id());
        if let Some(tx) = streams.get(&key) {
            match tx.send(response) {
                Ok(()) => return None,
                Err(mpsc::error::SendError(returned)) => {
                    streams.remove(&key);
                    response = returned;
                },
            }
        }

        Some(response)
    }

    fn release_session(&self, session_id: u16) {
        if !self.lock_sessions().release(session_id) {
            tracing::warn!(session_id, "release of a session id that was not live");
        }
    }

    /// Fail everything: mark the link dead, drop all pending waiters (their
    /// receivers resolve to `TransportClosed`), signal `closed`.
    fn shutdown(&self) {
        *self.lock_link() = LinkState::Disconnected;

        let drained: Vec<WaiterQueue> =
            self.lock_waiters().drain().map(|(_, queue)| queue).collect();
        let pending: usize = drained.iter().map(VecDeque::len).sum();
        if pending > 0 {
            tracing::warn!(pending, "failing pending waiters: transport closed");
        }
        drop(drained);

        // Dropping the stream senders ends every collector's channel.
        self.lock_streams().clear();

        // send_replace stores the value even when no receiver exists yet, so
        // a later closed() call still observes the disconnect.
        self.closed.send_replace(true);
    }
}

/// Offer a frame to the first live waiter in the queue. A dropped waiter
/// refuses delivery and the frame moves on to the next; returns the frame if
/// every waiter is gone.
fn offer(queue: &mut WaiterQueue, mut response: Response) -> Option<Response> {
    while let Some(waiter) = queue.pop_front() {
        match waiter.send(response) {
            Ok(()) => return None,
            Err(returned) => response = returned,
        }
    }
    Some(response)
}
