//! Command-handler messages: session-tagged actuator activation.
//!
//! `GW_COMMAND_SEND_REQ` carries a session id allocated by the client. The
//! gateway answers with a confirmation, streams run-status and
//! remaining-time notifications tagged with the same id, and closes the
//! session with `GW_SESSION_FINISHED_NTF`.

use bytes::{BufMut, BytesMut};

use super::{GatewayRequest, GatewayResponse, StatusConvention};
use crate::{
    command::Command,
    error::ArgumentError,
    fp::FunctionalParameter,
    wire::FieldReader,
};

/// Capacity of the node index array.
const INDEX_SLOTS: usize = 20;

/// Originator of an actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(missing_docs)] // names mirror the documentation
pub enum CommandOriginator {
    User = 1,
    Rain = 2,
    Timer = 3,
    Ups = 5,
    Saac = 8,
    Wind = 9,
    LoadShedding = 11,
    LocalLight = 12,
    EnvironmentSensor = 13,
    Emergency = 255,
}

/// Priority level of an actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(missing_docs)] // names mirror the documentation
pub enum PriorityLevel {
    ProtectionHuman = 0,
    ProtectionEnvironment = 1,
    UserLevel1 = 2,
    UserLevel2 = 3,
    ComfortLevel1 = 4,
    ComfortLevel2 = 5,
    ComfortLevel3 = 6,
    ComfortLevel4 = 7,
}

/// `GW_COMMAND_SEND_REQ`: activate one or more nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSendReq {
    /// Session id tagging the whole operation.
    pub session_id: u16,
    /// Who triggered the command.
    pub originator: CommandOriginator,
    /// Command priority.
    pub priority: PriorityLevel,
    /// Index of the parameter the command mainly drives (0 = main).
    pub parameter_active: u8,
    /// Functional-parameter indicator bits for FP1–FP8.
    pub fpi1: u8,
    /// Functional-parameter indicator bits for FP9–FP16.
    pub fpi2: u8,
    /// Main parameter value.
    pub main_parameter: FunctionalParameter,
    /// Values for FP1–FP16.
    pub functional_parameters: [FunctionalParameter; 16],
    /// Target node indexes; at most [`INDEX_SLOTS`] are encoded.
    pub nodes: Vec<u8>,
    /// Lock the priority level for `lock_time`.
    pub priority_level_lock: bool,
    /// Priority level information for levels 0–3.
    pub pli_0_3: u8,
    /// Priority level information for levels 4–7.
    pub pli_4_7: u8,
    /// Lock duration code.
    pub lock_time: u8,
}

impl CommandSendReq {
    /// Drive the main parameter of `nodes` to `parameter` with user
    /// originator and default priority.
    #[must_use]
    pub fn to_nodes(session_id: u16, nodes: Vec<u8>, parameter: FunctionalParameter) -> Self {
        Self {
            session_id,
            originator: CommandOriginator::User,
            priority: PriorityLevel::UserLevel2,
            parameter_active: 0,
            fpi1: 0,
            fpi2: 0,
            main_parameter: parameter,
            functional_parameters: [FunctionalParameter::Ignore; 16],
            nodes,
            priority_level_lock: false,
            pli_0_3: 0,
            pli_4_7: 0,
            lock_time: 0,
        }
    }
}

impl GatewayRequest for CommandSendReq {
    const COMMAND: Command = Command::CommandSendReq;
    type Cfm = CommandSendCfm;

    fn arguments(&self, dst: &mut BytesMut) {
        dst.put_u16(self.session_id);
        dst.put_u8(self.originator as u8);
        dst.put_u8(self.priority as u8);
        dst.put_u8(self.parameter_active);
        dst.put_u8(self.fpi1);
        dst.put_u8(self.fpi2);
        dst.put_u16(self.main_parameter.to_raw());
        for parameter in &self.functional_parameters {
            dst.put_u16(parameter.to_raw());
        }
        let nodes = &self.nodes[..self.nodes.len().min(INDEX_SLOTS)];
        dst.put_u8(nodes.len() as u8);
        dst.put_slice(nodes);
        dst.put_bytes(0, INDEX_SLOTS - nodes.len());
        dst.put_u8(u8::from(self.priority_level_lock));
        dst.put_u8(self.pli_0_3);
        dst.put_u8(self.pli_4_7);
        dst.put_u8(self.lock_time);
    }
}

/// `GW_COMMAND_SEND_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSendCfm {
    /// Session id echoed from the request.
    pub session_id: u16,
    /// Raw status byte (second argument position).
    pub status: u8,
}

impl CommandSendCfm {
    /// Success convention for this confirmation.
    pub const STATUS_CONVENTION: StatusConvention = StatusConvention::SuccessOne;

    /// Whether the command was accepted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        Self::STATUS_CONVENTION.is_success(self.status)
    }
}

impl GatewayResponse for CommandSendCfm {
    const COMMAND: Command = Command::CommandSendCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let session_id = reader.u16()?;
        let status = reader.u8()?;
        reader.finish()?;
        Ok(Self { session_id, status })
    }
}

/// `GW_COMMAND_RUN_STATUS_NTF`: per-node progress of a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRunStatusNtf {
    /// Session this status belongs to.
    pub session_id: u16,
    /// Source of the status (local, user, rain, ...).
    pub status_id: u8,
    /// Node index the status concerns.
    pub index: u8,
    /// Parameter the status concerns (0 = main).
    pub node_parameter: u8,
    /// Raw parameter value.
    pub parameter_value: u16,
    /// Run state of the node.
    pub run_status: u8,
    /// Status reply detail code.
    pub status_reply: u8,
    /// Additional information code.
    pub information_code: u32,
}

impl GatewayResponse for CommandRunStatusNtf {
    const COMMAND: Command = Command::CommandRunStatusNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let session_id = reader.u16()?;
        let status_id = reader.u8()?;
        let index = reader.u8()?;
        let node_parameter = reader.u8()?;
        let parameter_value = reader.u16()?;
        let run_status = reader.u8()?;
        let status_reply = reader.u8()?;
        let information_code = reader.u32()?;
        reader.finish()?;
        Ok(Self {
            session_id,
            status_id,
            index,
            node_parameter,
            parameter_value,
            run_status,
            status_reply,
            information_code,
        })
    }
}

/// `GW_COMMAND_REMAINING_TIME_NTF`: seconds until a node reaches target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRemainingTimeNtf {
    /// Session this estimate belongs to.
    pub session_id: u16,
    /// Node index.
    pub index: u8,
    /// Parameter the estimate concerns.
    pub node_parameter: u8,
    /// Remaining travel time in seconds.
    pub seconds: u16,
}

impl GatewayResponse for CommandRemainingTimeNtf {
    const COMMAND: Command = Command::CommandRemainingTimeNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let session_id = reader.u16()?;
        let index = reader.u8()?;
        let node_parameter = reader.u8()?;
        let seconds = reader.u16()?;
        reader.finish()?;
        Ok(Self { session_id, index, node_parameter, seconds })
    }
}

/// `GW_SESSION_FINISHED_NTF`: terminal notification of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionFinishedNtf {
    /// Session that ended.
    pub session_id: u16,
}

impl GatewayResponse for SessionFinishedNtf {
    const COMMAND: Command = Command::SessionFinishedNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let session_id = reader.u16()?;
        reader.finish()?;
        Ok(Self { session_id })
    }
}
