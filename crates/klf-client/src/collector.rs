//! Notification stream collection.
//!
//! Several gateway operations answer with a confirmation and then *stream*
//! notifications until a terminator (`GW_GET_ALL_NODES_INFORMATION_NTF` …
//! `_FINISHED_NTF`, or session-tagged run-status events closed by
//! `GW_SESSION_FINISHED_NTF`). A collector owns a private stream slot in the
//! client's dispatch table, registered *before* the request is sent so no
//! frame of the stream can slip past it, and harvests items until the
//! terminator.
//!
//! Correlation is per call. Session-tagged operations register under their
//! session id, so concurrently running sessions each receive exactly their
//! own frames. Operations whose notifications carry no discriminator
//! register under the raw command ids; those slots are single-consumer, and
//! a second collector for the same commands fails with
//! [`ClientError::CollectorBusy`] instead of silently sharing frames
//! ([`GatewayClient::nodes`] serializes itself so its callers never collide).
//!
//! Dropping a collector releases its slot, cancelling item and terminator
//! interest at once.

use klf_proto::{Command, Response, messages::GatewayRequest};
use tokio::sync::mpsc;

use crate::{
    client::{GatewayClient, StreamKey},
    error::ClientError,
};

/// Harvests one notification stream.
pub struct Collector<'c> {
    client: &'c GatewayClient,
    item: Command,
    terminator: Command,
    rx: mpsc::UnboundedReceiver<Response>,
    keys: Vec<StreamKey>,
}

impl<'c> Collector<'c> {
    /// Collector for a stream whose notifications carry no session id,
    /// keyed by the `item` and `terminator` command ids. Must be created
    /// *before* the operation is sent.
    ///
    /// # Errors
    ///
    /// [`ClientError::CollectorBusy`] if another collector is already
    /// consuming either command.
    pub fn commands(
        client: &'c GatewayClient,
        item: Command,
        terminator: Command,
    ) -> Result<Self, ClientError> {
        let keys = vec![StreamKey::Command(item.to_u16()), StreamKey::Command(terminator.to_u16())];
        let rx = client.register_stream(&keys)?;
        Ok(Self { client, item, terminator, rx, keys })
    }

    /// Collector for a session-tagged stream. The dispatch table routes
    /// every notification carrying `session_id` here; frames of other
    /// sessions never show up.
    ///
    /// # Errors
    ///
    /// [`ClientError::CollectorBusy`] if the session id is already claimed,
    /// which cannot happen for ids from the client's own pool.
    pub fn session(
        client: &'c GatewayClient,
        session_id: u16,
        item: Command,
        terminator: Command,
    ) -> Result<Self, ClientError> {
        let keys = vec![StreamKey::Session(session_id)];
        let rx = client.register_stream(&keys)?;
        Ok(Self { client, item, terminator, rx, keys })
    }

    /// Send the operation that produces the stream and await its
    /// confirmation, proving the gateway accepted it.
    pub async fn send<R: GatewayRequest>(&self, request: &R) -> Result<R::Cfm, ClientError> {
        self.client.send(request).await
    }

    /// Collect items until the terminator arrives.
    pub async fn collect(mut self) -> Result<Vec<Response>, ClientError> {
        let mut items = Vec::new();
        loop {
            let received = tokio::select! {
                received = self.rx.recv() => received,
                () = self.client.closed() => None,
            };
            // The slot's sender is dropped when the transport shuts down.
            let Some(response) = received else {
                return Err(ClientError::TransportClosed);
            };

            let command = response.command_id();
            if command == self.item.to_u16() {
                items.push(response);
            } else if command == self.terminator.to_u16() {
                return Ok(items);
            }
            // Session streams also carry auxiliary frames (remaining-time
            // estimates); those are not collected.
        }
    }
}

impl Drop for Collector<'_> {
    fn drop(&mut self) {
        for key in &self.keys {
            self.client.remove_stream(key);
        }
    }
}
