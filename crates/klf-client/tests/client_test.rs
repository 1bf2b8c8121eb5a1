//! End-to-end client tests over an in-memory duplex stream.
//!
//! A `FakeGateway` plays the KLF-200 side: it deframes what the client
//! sends, asserts on the wire bytes, and answers with scripted frames.

use klf_client::{ClientError, Collector, GatewayClient, LinkState};
use klf_proto::{Command, FunctionalParameter, Response, slip, wire};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

struct FakeGateway {
    stream: DuplexStream,
    decoder: slip::SlipDecoder,
}

impl FakeGateway {
    fn new(stream: DuplexStream) -> Self {
        Self { stream, decoder: slip::SlipDecoder::new() }
    }

    /// Next (command, arguments) frame from the client.
    async fn recv(&mut self) -> (u16, Vec<u8>) {
        loop {
            if let Some(frame) = self.decoder.next_frame() {
                let (command, args) =
                    wire::decode_payload(&frame).expect("client sent an invalid payload");
                return (command, args.to_vec());
            }
            let mut buf = [0u8; 1024];
            let n = self.stream.read(&mut buf).await.expect("gateway read");
            assert!(n > 0, "client closed the connection");
            self.decoder.extend(&buf[..n]).expect("client overflowed the framer");
        }
    }

    async fn send(&mut self, command: u16, args: &[u8]) {
        let framed = slip::encode(&wire::encode_payload(command, args));
        self.stream.write_all(&framed).await.expect("gateway write");
    }

    /// Send a pre-built payload verbatim (for corruption tests).
    async fn send_payload(&mut self, payload: &[u8]) {
        let framed = slip::encode(payload);
        self.stream.write_all(&framed).await.expect("gateway write");
    }
}

fn pair() -> (GatewayClient, FakeGateway) {
    let (client_side, gateway_side) = tokio::io::duplex(4096);
    (GatewayClient::from_stream(client_side), FakeGateway::new(gateway_side))
}

/// 124-byte argument tuple of GW_GET_ALL_NODES_INFORMATION_NTF.
fn node_record(node_id: u8, name: &str, position: u16) -> Vec<u8> {
    let mut args = Vec::new();
    args.push(node_id);
    args.extend_from_slice(&u16::from(node_id).to_be_bytes()); // order
    args.push(0); // placement
    let mut padded_name = name.as_bytes().to_vec();
    padded_name.resize(64, 0);
    args.extend_from_slice(&padded_name);
    args.push(0); // velocity
    args.extend_from_slice(&0x0040u16.to_be_bytes()); // subtype
    args.extend_from_slice(&[14, 3, 0, 0, 5]); // group, type, variation, power, build
    args.extend_from_slice(&[0x11; 8]); // serial
    args.push(4); // state
    args.extend_from_slice(&position.to_be_bytes());
    args.extend_from_slice(&position.to_be_bytes()); // target
    for _ in 0..4 {
        args.extend_from_slice(&0xF7FFu16.to_be_bytes());
    }
    args.extend_from_slice(&0u16.to_be_bytes()); // remaining time
    args.extend_from_slice(&1_234_567u32.to_be_bytes()); // timestamp
    args.push(0); // no aliases
    args.extend_from_slice(&[0; 20]);
    assert_eq!(args.len(), 124);
    args
}

#[tokio::test]
async fn authentication_success() {
    let (client, mut gateway) = pair();

    let auth_client = client.clone();
    let auth = tokio::spawn(async move { auth_client.authenticate("secret").await });

    let (command, args) = gateway.recv().await;
    assert_eq!(command, 0x3000);
    assert_eq!(args.len(), 31);
    assert_eq!(&args[..6], b"secret");
    assert!(args[6..].iter().all(|&b| b == 0));

    gateway.send(0x3001, &[0x00]).await;
    assert!(auth.await.unwrap().unwrap());
    assert_eq!(client.state(), LinkState::Ready);
}

#[tokio::test]
async fn authentication_refused() {
    let (client, mut gateway) = pair();

    let auth_client = client.clone();
    let auth = tokio::spawn(async move { auth_client.authenticate("wrong").await });

    let _ = gateway.recv().await;
    gateway.send(0x3001, &[0x01]).await;
    assert!(!auth.await.unwrap().unwrap());
    assert_eq!(client.state(), LinkState::Authenticating);
}

#[tokio::test]
async fn ping_round_trip() {
    let (client, mut gateway) = pair();

    let ping_client = client.clone();
    let ping = tokio::spawn(async move { ping_client.ping().await });

    let (command, args) = gateway.recv().await;
    assert_eq!(command, 0x000C);
    assert!(args.is_empty());

    gateway.send(0x000D, &[0x02, 0x03, 0xAA, 0xBB, 0xCC, 0xDD]).await;
    let cfm = ping.await.unwrap().unwrap();
    assert_eq!(cfm.gateway_state, 2);
    assert_eq!(cfm.sub_state, 3);
    assert_eq!(cfm.state_data, [0xAA, 0xBB, 0xCC, 0xDD]);
}

#[tokio::test]
async fn corrupted_frame_does_not_advance_waiters() {
    let (client, mut gateway) = pair();

    let ping_client = client.clone();
    let ping = tokio::spawn(async move { ping_client.ping().await });
    let _ = gateway.recv().await;

    // Flip one argument bit: checksum breaks, the frame is dropped and the
    // waiter must stay queued.
    let mut corrupt = wire::encode_payload(0x000D, &[0x01, 0x00, 0, 0, 0, 0]).to_vec();
    corrupt[4] ^= 0x40;
    gateway.send_payload(&corrupt).await;

    gateway.send(0x000D, &[0x01, 0x00, 0, 0, 0, 0]).await;
    let cfm = ping.await.unwrap().unwrap();
    assert_eq!(cfm.gateway_state, 1);

    // The connection survived the bad frame.
    let ping_client = client.clone();
    let ping = tokio::spawn(async move { ping_client.ping().await });
    let (command, _) = gateway.recv().await;
    assert_eq!(command, 0x000C);
    gateway.send(0x000D, &[0x00, 0x00, 0, 0, 0, 0]).await;
    assert!(ping.await.unwrap().is_ok());
}

#[tokio::test]
async fn waiters_resolve_in_fifo_order() {
    let (client, mut gateway) = pair();

    // GW_WINK_SEND_NTF has no typed decoder; frames arrive as Unknown.
    let first = client.subscribe(Command::WinkSendNtf);
    let second = client.subscribe(Command::WinkSendNtf);

    gateway.send(0x030A, &[1]).await;
    gateway.send(0x030A, &[2]).await;

    let responses = (first.wait().await.unwrap(), second.wait().await.unwrap());
    match responses {
        (Response::Unknown(a), Response::Unknown(b)) => {
            assert_eq!(&a.arguments[..], &[1]);
            assert_eq!(&b.arguments[..], &[2]);
        },
        other => panic!("expected Unknown frames, got {other:?}"),
    }
}

#[tokio::test]
async fn dropped_waiter_reoffers_to_the_next() {
    let (client, mut gateway) = pair();

    let first = client.subscribe(Command::WinkSendNtf);
    let second = client.subscribe(Command::WinkSendNtf);
    drop(first);

    gateway.send(0x030A, &[7]).await;

    match second.wait().await.unwrap() {
        Response::Unknown(frame) => assert_eq!(&frame.arguments[..], &[7]),
        other => panic!("expected Unknown frame, got {other:?}"),
    }
}

#[tokio::test]
async fn node_enumeration_collects_the_stream() {
    let (client, mut gateway) = pair();

    let nodes_client = client.clone();
    let nodes = tokio::spawn(async move { nodes_client.nodes().await });

    let (command, _) = gateway.recv().await;
    assert_eq!(command, 0x0202);

    gateway.send(0x0203, &[0x00, 0x02]).await;
    gateway.send(0x0204, &node_record(0, "Living room shutter", 0x0000)).await;
    gateway.send(0x0204, &node_record(1, "Bedroom window", 0x6400)).await;
    gateway.send(0x0205, &[]).await;

    let nodes = nodes.await.unwrap().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].name, "Living room shutter");
    assert_eq!(nodes[1].name, "Bedroom window");
    assert_eq!(nodes[1].current_position, 0x6400);
}

#[tokio::test]
async fn node_enumeration_rejected_by_gateway() {
    let (client, mut gateway) = pair();

    let nodes_client = client.clone();
    let nodes = tokio::spawn(async move { nodes_client.nodes().await });

    let _ = gateway.recv().await;
    gateway.send(0x0203, &[0x01, 0x00]).await; // status 1: no nodes / refused

    match nodes.await.unwrap() {
        Err(ClientError::Rejected { operation, status }) => {
            assert_eq!(operation, "GW_GET_ALL_NODES_INFORMATION_REQ");
            assert_eq!(status, 1);
        },
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn session_lifecycle_releases_and_reuses_the_id() {
    let (client, mut gateway) = pair();

    let command_client = client.clone();
    let run = tokio::spawn(async move {
        command_client.send_command(vec![3], FunctionalParameter::Relative(0.5)).await
    });

    let (command, args) = gateway.recv().await;
    assert_eq!(command, 0x0300);
    assert_eq!(args.len(), 66);
    let session = u16::from_be_bytes([args[0], args[1]]);
    assert_eq!(session, 0); // first allocation
    assert_eq!(client.active_sessions(), 1);

    // Confirmation: session id echoed, status 1 = accepted.
    gateway.send(0x0301, &[args[0], args[1], 0x01]).await;

    // A run-status frame of an unrelated session must be discarded.
    let mut foreign = vec![0x00, 0x09, 1, 3, 0];
    foreign.extend_from_slice(&0x6400u16.to_be_bytes());
    foreign.extend_from_slice(&[2, 0]);
    foreign.extend_from_slice(&0u32.to_be_bytes());
    gateway.send(0x0302, &foreign).await;

    // A run-status frame for our session.
    let mut ours = vec![args[0], args[1], 1, 3, 0];
    ours.extend_from_slice(&0x6400u16.to_be_bytes());
    ours.extend_from_slice(&[0, 0]);
    ours.extend_from_slice(&0u32.to_be_bytes());
    gateway.send(0x0302, &ours).await;

    // Terminator of the unrelated session first, then ours.
    gateway.send(0x0304, &0x0009u16.to_be_bytes()).await;
    gateway.send(0x0304, &session.to_be_bytes()).await;

    let run = run.await.unwrap().unwrap();
    assert_eq!(run.session_id, 0);
    assert_eq!(run.run_status.len(), 1);
    assert_eq!(run.run_status[0].index, 3);

    // GW_SESSION_FINISHED_NTF released the id; it is allocatable again.
    assert_eq!(client.active_sessions(), 0);
    let command_client = client.clone();
    let rerun = tokio::spawn(async move {
        command_client.send_command(vec![3], FunctionalParameter::Target).await
    });
    let (_, args) = gateway.recv().await;
    assert_eq!(u16::from_be_bytes([args[0], args[1]]), 0);
    gateway.send(0x0301, &[args[0], args[1], 0x00]).await; // refused this time
    assert!(matches!(
        rerun.await.unwrap(),
        Err(ClientError::Rejected { operation: "GW_COMMAND_SEND_REQ", status: 0 })
    ));
    // Local reclaim after a refusal.
    assert_eq!(client.active_sessions(), 0);
}

/// 13-byte argument tuple of GW_COMMAND_RUN_STATUS_NTF.
fn run_status(session: u16, index: u8) -> Vec<u8> {
    let mut args = session.to_be_bytes().to_vec();
    args.extend_from_slice(&[1, index, 0]);
    args.extend_from_slice(&0x6400u16.to_be_bytes());
    args.extend_from_slice(&[0, 0]);
    args.extend_from_slice(&0u32.to_be_bytes());
    args
}

#[tokio::test]
async fn concurrent_enumerations_are_serialized_and_do_not_merge() {
    let (client, mut gateway) = pair();

    let first_client = client.clone();
    let first = tokio::spawn(async move { first_client.nodes().await });
    let second_client = client.clone();
    let second = tokio::spawn(async move { second_client.nodes().await });

    // The client serializes enumerations, so the second request only hits
    // the wire after the first stream completed; each caller must see
    // exactly the stream of its own request.
    for round in 0..2u8 {
        let (command, _) = gateway.recv().await;
        assert_eq!(command, 0x0202);
        gateway.send(0x0203, &[0x00, 0x01]).await;
        let name = if round == 0 { "First round" } else { "Second round" };
        gateway.send(0x0204, &node_record(round, name, 0)).await;
        gateway.send(0x0205, &[]).await;
    }

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);

    // Which caller won the first round is scheduling-dependent, but the two
    // streams must not mix.
    let mut names = vec![first[0].name.clone(), second[0].name.clone()];
    names.sort();
    assert_eq!(names, ["First round", "Second round"]);
}

#[tokio::test]
async fn concurrent_sessions_collect_only_their_own_events() {
    let (client, mut gateway) = pair();

    let a_client = client.clone();
    let a = tokio::spawn(async move {
        a_client.send_command(vec![1], FunctionalParameter::Relative(0.25)).await
    });
    let b_client = client.clone();
    let b = tokio::spawn(async move {
        b_client.send_command(vec![2], FunctionalParameter::Relative(0.75)).await
    });

    // Both commands are in flight at once, in whatever order the tasks won
    // the writer lock.
    let (command, args1) = gateway.recv().await;
    assert_eq!(command, 0x0300);
    let (command, args2) = gateway.recv().await;
    assert_eq!(command, 0x0300);
    let sid1 = u16::from_be_bytes([args1[0], args1[1]]);
    let sid2 = u16::from_be_bytes([args2[0], args2[1]]);
    assert_ne!(sid1, sid2);

    // Confirmations resolve in wire order (FIFO per command).
    gateway.send(0x0301, &[args1[0], args1[1], 0x01]).await;
    gateway.send(0x0301, &[args2[0], args2[1], 0x01]).await;

    // Interleave the streams adversarially: the second command's session
    // produces its event and finishes first.
    gateway.send(0x0302, &run_status(sid2, args2[42])).await;
    gateway.send(0x0302, &run_status(sid1, args1[42])).await;
    gateway.send(0x0304, &sid2.to_be_bytes()).await;
    gateway.send(0x0304, &sid1.to_be_bytes()).await;

    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();

    // Task a drove node 1, task b node 2; each harvest holds exactly the
    // events tagged with its own session.
    assert_eq!(a.run_status.len(), 1);
    assert_eq!(a.run_status[0].session_id, a.session_id);
    assert_eq!(a.run_status[0].index, 1);
    assert_eq!(b.run_status.len(), 1);
    assert_eq!(b.run_status[0].session_id, b.session_id);
    assert_eq!(b.run_status[0].index, 2);
    assert_ne!(a.session_id, b.session_id);
    assert_eq!(client.active_sessions(), 0);
}

#[tokio::test]
async fn overlapping_command_collectors_are_refused() {
    let (client, _gateway) = pair();

    let first = Collector::commands(
        &client,
        Command::GetAllNodesInformationNtf,
        Command::GetAllNodesInformationFinishedNtf,
    )
    .unwrap();

    let second = Collector::commands(
        &client,
        Command::GetAllNodesInformationNtf,
        Command::GetAllNodesInformationFinishedNtf,
    );
    assert!(matches!(second, Err(ClientError::CollectorBusy)));

    // Dropping the first collector frees its slots.
    drop(first);
    assert!(
        Collector::commands(
            &client,
            Command::GetAllNodesInformationNtf,
            Command::GetAllNodesInformationFinishedNtf,
        )
        .is_ok()
    );
}

#[tokio::test]
async fn ambient_notifications_reach_broadcast_subscribers() {
    let (client, mut gateway) = pair();
    let mut events = client.events();

    let mut args = vec![7u8, 4];
    args.extend_from_slice(&0x3200u16.to_be_bytes());
    args.extend_from_slice(&0xC800u16.to_be_bytes());
    for _ in 0..4 {
        args.extend_from_slice(&0xF7FFu16.to_be_bytes());
    }
    args.extend_from_slice(&42u16.to_be_bytes());
    args.extend_from_slice(&99u32.to_be_bytes());
    gateway.send(0x0211, &args).await;

    match events.recv().await.unwrap() {
        Response::NodeStatePositionChangedNtf(ntf) => {
            assert_eq!(ntf.node_id, 7);
            assert_eq!(ntf.target, 0xC800);
        },
        other => panic!("expected position change, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_loss_fails_pending_waiters() {
    let (client, mut gateway) = pair();

    let ping_client = client.clone();
    let ping = tokio::spawn(async move { ping_client.ping().await });
    let _ = gateway.recv().await;

    drop(gateway);

    assert!(matches!(ping.await.unwrap(), Err(ClientError::TransportClosed)));
    client.closed().await;
    assert_eq!(client.state(), LinkState::Disconnected);

    // Every later operation fails fast.
    assert!(matches!(client.ping().await, Err(ClientError::TransportClosed)));
}

#[tokio::test(start_paused = true)]
async fn keep_alive_pings_after_idle_interval() {
    let (client, mut gateway) = pair();
    let keep_alive = client.spawn_keep_alive();

    // Virtual time auto-advances while everything is idle; the keep-alive
    // deadline fires and a GW_GET_STATE_REQ shows up on the wire.
    let (command, _) = gateway.recv().await;
    assert_eq!(command, 0x000C);
    gateway.send(0x000D, &[0, 0, 0, 0, 0, 0]).await;

    keep_alive.abort();
}
