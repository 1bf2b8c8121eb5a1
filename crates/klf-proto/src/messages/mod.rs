//! Typed gateway messages and the dispatch registry.
//!
//! Requests implement [`GatewayRequest`] and carry a compile-time association
//! with their confirmation type; there is no name-based lookup anywhere.
//! Inbound frames are dispatched by [`Response::decode`], an explicit
//! enum-keyed table: each typed message owns one arm, everything else decodes
//! to [`UnknownFrame`]. Adding a variant without wiring it into the table is
//! a compile error, so the registry cannot hold duplicates.
//!
//! Modules follow the sections of the gateway documentation: authentication,
//! general commands, node information, the command handler, and
//! configuration services.

pub mod auth;
pub mod command_handler;
pub mod config;
pub mod general;
pub mod info;

use bytes::{Bytes, BytesMut};

use crate::{
    command::Command,
    error::{ArgumentError, WireError},
    wire,
};

/// A request sent to the gateway.
///
/// `Cfm` is the confirmation type the gateway answers with; the client keys
/// its waiter queue on `Cfm::COMMAND` before the request hits the wire.
pub trait GatewayRequest {
    /// Command id of the request.
    const COMMAND: Command;

    /// Confirmation message paired with this request.
    type Cfm: GatewayResponse + TryFrom<Response, Error = Response>;

    /// Append the argument tuple, big-endian, in schema order.
    fn arguments(&self, dst: &mut BytesMut);
}

/// A message received from the gateway (confirmation or notification).
pub trait GatewayResponse: Sized {
    /// Command id of the message.
    const COMMAND: Command;

    /// Decode the argument tuple. The whole tuple must be consumed.
    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError>;
}

/// Encode a request into an unframed payload (SLIP framing is layered on by
/// the transport).
pub fn encode_request<R: GatewayRequest>(request: &R) -> Bytes {
    let mut arguments = BytesMut::new();
    request.arguments(&mut arguments);
    wire::encode_payload(R::COMMAND.to_u16(), &arguments)
}

/// How a confirmation encodes success in its status byte.
///
/// The gateway is inconsistent across message families: some confirmations
/// use `0` for success, others `1`. Each message type declares its
/// convention; the decoder reads the raw status and the predicate together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusConvention {
    /// `status == 0` means success.
    SuccessZero,
    /// `status == 1` means success.
    SuccessOne,
}

impl StatusConvention {
    /// Apply the predicate to a raw status byte.
    #[must_use]
    pub const fn is_success(self, status: u8) -> bool {
        match self {
            Self::SuccessZero => status == 0,
            Self::SuccessOne => status == 1,
        }
    }
}

/// A syntactically valid frame whose command has no typed decoder.
///
/// Not an error: the command table is larger than the set of messages this
/// client interprets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFrame {
    /// Raw 16-bit command id.
    pub command: u16,
    /// Raw argument bytes.
    pub arguments: Bytes,
}

/// Any decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `GW_PASSWORD_ENTER_CFM`
    PasswordEnterCfm(auth::PasswordEnterCfm),
    /// `GW_PASSWORD_CHANGE_CFM`
    PasswordChangeCfm(auth::PasswordChangeCfm),
    /// `GW_PASSWORD_CHANGE_NTF`
    PasswordChangeNtf(auth::PasswordChangeNtf),
    /// `GW_ERROR_NTF`
    ErrorNtf(general::ErrorNtf),
    /// `GW_REBOOT_CFM`
    RebootCfm(general::RebootCfm),
    /// `GW_GET_STATE_CFM`
    GetStateCfm(general::GetStateCfm),
    /// `GW_GET_VERSION_CFM`
    GetVersionCfm(general::GetVersionCfm),
    /// `GW_GET_PROTOCOL_VERSION_CFM`
    GetProtocolVersionCfm(general::GetProtocolVersionCfm),
    /// `GW_LEAVE_LEARN_STATE_CFM`
    LeaveLearnStateCfm(general::LeaveLearnStateCfm),
    /// `GW_SET_UTC_CFM`
    SetUtcCfm(general::SetUtcCfm),
    /// `GW_RTC_SET_TIME_ZONE_CFM`
    RtcSetTimeZoneCfm(general::RtcSetTimeZoneCfm),
    /// `GW_GET_LOCAL_TIME_CFM`
    GetLocalTimeCfm(general::GetLocalTimeCfm),
    /// `GW_GET_NETWORK_SETUP_CFM`
    GetNetworkSetupCfm(general::GetNetworkSetupCfm),
    /// `GW_GET_ALL_NODES_INFORMATION_CFM`
    GetAllNodesInformationCfm(info::GetAllNodesInformationCfm),
    /// `GW_GET_ALL_NODES_INFORMATION_NTF`
    GetAllNodesInformationNtf(info::GetAllNodesInformationNtf),
    /// `GW_GET_ALL_NODES_INFORMATION_FINISHED_NTF`
    GetAllNodesInformationFinishedNtf(info::GetAllNodesInformationFinishedNtf),
    /// `GW_NODE_INFORMATION_CHANGED_NTF`
    NodeInformationChangedNtf(info::NodeInformationChangedNtf),
    /// `GW_NODE_STATE_POSITION_CHANGED_NTF`
    NodeStatePositionChangedNtf(info::NodeStatePositionChangedNtf),
    /// `GW_COMMAND_SEND_CFM`
    CommandSendCfm(command_handler::CommandSendCfm),
    /// `GW_COMMAND_RUN_STATUS_NTF`
    CommandRunStatusNtf(command_handler::CommandRunStatusNtf),
    /// `GW_COMMAND_REMAINING_TIME_NTF`
    CommandRemainingTimeNtf(command_handler::CommandRemainingTimeNtf),
    /// `GW_SESSION_FINISHED_NTF`
    SessionFinishedNtf(command_handler::SessionFinishedNtf),
    /// `GW_CS_CONTROLLER_COPY_CFM`
    CsControllerCopyCfm(config::CsControllerCopyCfm),
    /// `GW_CS_CONTROLLER_COPY_NTF`
    CsControllerCopyNtf(config::CsControllerCopyNtf),
    /// `GW_CS_CONTROLLER_COPY_CANCEL_NTF`
    CsControllerCopyCancelNtf(config::CsControllerCopyCancelNtf),
    /// Valid frame without a typed decoder.
    Unknown(UnknownFrame),
}

impl Response {
    /// Dispatch a validated payload to its typed decoder.
    ///
    /// # Errors
    ///
    /// [`WireError::Arguments`] when a registered command carries arguments
    /// that do not match its schema. Unregistered commands are not an error.
    pub fn decode(command: u16, arguments: &[u8]) -> Result<Self, WireError> {
        let unknown = |arguments: &[u8]| {
            Self::Unknown(UnknownFrame { command, arguments: Bytes::copy_from_slice(arguments) })
        };
        let Some(known) = Command::from_u16(command) else {
            return Ok(unknown(arguments));
        };

        macro_rules! arm {
            ($variant:ident, $ty:ty) => {
                Self::$variant(
                    <$ty>::decode(arguments)
                        .map_err(|source| WireError::Arguments { command, source })?,
                )
            };
        }

        let response = match known {
            Command::PasswordEnterCfm => arm!(PasswordEnterCfm, auth::PasswordEnterCfm),
            Command::PasswordChangeCfm => arm!(PasswordChangeCfm, auth::PasswordChangeCfm),
            Command::PasswordChangeNtf => arm!(PasswordChangeNtf, auth::PasswordChangeNtf),
            Command::ErrorNtf => arm!(ErrorNtf, general::ErrorNtf),
            Command::RebootCfm => arm!(RebootCfm, general::RebootCfm),
            Command::GetStateCfm => arm!(GetStateCfm, general::GetStateCfm),
            Command::GetVersionCfm => arm!(GetVersionCfm, general::GetVersionCfm),
            Command::GetProtocolVersionCfm => {
                arm!(GetProtocolVersionCfm, general::GetProtocolVersionCfm)
            },
            Command::LeaveLearnStateCfm => arm!(LeaveLearnStateCfm, general::LeaveLearnStateCfm),
            Command::SetUtcCfm => arm!(SetUtcCfm, general::SetUtcCfm),
            Command::RtcSetTimeZoneCfm => arm!(RtcSetTimeZoneCfm, general::RtcSetTimeZoneCfm),
            Command::GetLocalTimeCfm => arm!(GetLocalTimeCfm, general::GetLocalTimeCfm),
            Command::GetNetworkSetupCfm => arm!(GetNetworkSetupCfm, general::GetNetworkSetupCfm),
            Command::GetAllNodesInformationCfm => {
                arm!(GetAllNodesInformationCfm, info::GetAllNodesInformationCfm)
            },
            Command::GetAllNodesInformationNtf => {
                arm!(GetAllNodesInformationNtf, info::GetAllNodesInformationNtf)
            },
            Command::GetAllNodesInformationFinishedNtf => {
                arm!(GetAllNodesInformationFinishedNtf, info::GetAllNodesInformationFinishedNtf)
            },
            Command::NodeInformationChangedNtf => {
                arm!(NodeInformationChangedNtf, info::NodeInformationChangedNtf)
            },
            Command::NodeStatePositionChangedNtf => {
                arm!(NodeStatePositionChangedNtf, info::NodeStatePositionChangedNtf)
            },
            Command::CommandSendCfm => arm!(CommandSendCfm, command_handler::CommandSendCfm),
            Command::CommandRunStatusNtf => {
                arm!(CommandRunStatusNtf, command_handler::CommandRunStatusNtf)
            },
            Command::CommandRemainingTimeNtf => {
                arm!(CommandRemainingTimeNtf, command_handler::CommandRemainingTimeNtf)
            },
            Command::SessionFinishedNtf => {
                arm!(SessionFinishedNtf, command_handler::SessionFinishedNtf)
            },
            Command::CsControllerCopyCfm => arm!(CsControllerCopyCfm, config::CsControllerCopyCfm),
            Command::CsControllerCopyNtf => arm!(CsControllerCopyNtf, config::CsControllerCopyNtf),
            Command::CsControllerCopyCancelNtf => {
                arm!(CsControllerCopyCancelNtf, config::CsControllerCopyCancelNtf)
            },
            _ => unknown(arguments),
        };
        Ok(response)
    }

    /// Wire command id of this message.
    #[must_use]
    pub fn command_id(&self) -> u16 {
        match self {
            Self::PasswordEnterCfm(_) => Command::PasswordEnterCfm.to_u16(),
            Self::PasswordChangeCfm(_) => Command::PasswordChangeCfm.to_u16(),
            Self::PasswordChangeNtf(_) => Command::PasswordChangeNtf.to_u16(),
            Self::ErrorNtf(_) => Command::ErrorNtf.to_u16(),
            Self::RebootCfm(_) => Command::RebootCfm.to_u16(),
            Self::GetStateCfm(_) => Command::GetStateCfm.to_u16(),
            Self::GetVersionCfm(_) => Command::GetVersionCfm.to_u16(),
            Self::GetProtocolVersionCfm(_) => Command::GetProtocolVersionCfm.to_u16(),
            Self::LeaveLearnStateCfm(_) => Command::LeaveLearnStateCfm.to_u16(),
            Self::SetUtcCfm(_) => Command::SetUtcCfm.to_u16(),
            Self::RtcSetTimeZoneCfm(_) => Command::RtcSetTimeZoneCfm.to_u16(),
            Self::GetLocalTimeCfm(_) => Command::GetLocalTimeCfm.to_u16(),
            Self::GetNetworkSetupCfm(_) => Command::GetNetworkSetupCfm.to_u16(),
            Self::GetAllNodesInformationCfm(_) => Command::GetAllNodesInformationCfm.to_u16(),
            Self::GetAllNodesInformationNtf(_) => Command::GetAllNodesInformationNtf.to_u16(),
            Self::GetAllNodesInformationFinishedNtf(_) => {
                Command::GetAllNodesInformationFinishedNtf.to_u16()
            },
            Self::NodeInformationChangedNtf(_) => Command::NodeInformationChangedNtf.to_u16(),
            Self::NodeStatePositionChangedNtf(_) => Command::NodeStatePositionChangedNtf.to_u16(),
            Self::CommandSendCfm(_) => Command::CommandSendCfm.to_u16(),
            Self::CommandRunStatusNtf(_) => Command::CommandRunStatusNtf.to_u16(),
            Self::CommandRemainingTimeNtf(_) => Command::CommandRemainingTimeNtf.to_u16(),
            Self::SessionFinishedNtf(_) => Command::SessionFinishedNtf.to_u16(),
            Self::CsControllerCopyCfm(_) => Command::CsControllerCopyCfm.to_u16(),
            Self::CsControllerCopyNtf(_) => Command::CsControllerCopyNtf.to_u16(),
            Self::CsControllerCopyCancelNtf(_) => Command::CsControllerCopyCancelNtf.to_u16(),
            Self::Unknown(frame) => frame.command,
        }
    }

    /// Session id carried by session-tagged messages.
    #[must_use]
    pub fn session_id(&self) -> Option<u16> {
        match self {
            Self::CommandSendCfm(cfm) => Some(cfm.session_id),
            Self::CommandRunStatusNtf(ntf) => Some(ntf.session_id),
            Self::CommandRemainingTimeNtf(ntf) => Some(ntf.session_id),
            Self::SessionFinishedNtf(ntf) => Some(ntf.session_id),
            _ => None,
        }
    }
}

/// `TryFrom<Response>` for every typed message, so callers can recover the
/// concrete type after queue delivery. The error returns the original value.
macro_rules! impl_from_response {
    ($($variant:ident => $ty:ty),+ $(,)?) => {$(
        impl TryFrom<Response> for $ty {
            type Error = Response;

            fn try_from(response: Response) -> Result<Self, Response> {
                match response {
                    Response::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    )+};
}

impl_from_response! {
    PasswordEnterCfm => auth::PasswordEnterCfm,
    PasswordChangeCfm => auth::PasswordChangeCfm,
    PasswordChangeNtf => auth::PasswordChangeNtf,
    ErrorNtf => general::ErrorNtf,
    RebootCfm => general::RebootCfm,
    GetStateCfm => general::GetStateCfm,
    GetVersionCfm => general::GetVersionCfm,
    GetProtocolVersionCfm => general::GetProtocolVersionCfm,
    LeaveLearnStateCfm => general::LeaveLearnStateCfm,
    SetUtcCfm => general::SetUtcCfm,
    RtcSetTimeZoneCfm => general::RtcSetTimeZoneCfm,
    GetLocalTimeCfm => general::GetLocalTimeCfm,
    GetNetworkSetupCfm => general::GetNetworkSetupCfm,
    GetAllNodesInformationCfm => info::GetAllNodesInformationCfm,
    GetAllNodesInformationNtf => info::GetAllNodesInformationNtf,
    GetAllNodesInformationFinishedNtf => info::GetAllNodesInformationFinishedNtf,
    NodeInformationChangedNtf => info::NodeInformationChangedNtf,
    NodeStatePositionChangedNtf => info::NodeStatePositionChangedNtf,
    CommandSendCfm => command_handler::CommandSendCfm,
    CommandRunStatusNtf => command_handler::CommandRunStatusNtf,
    CommandRemainingTimeNtf => command_handler::CommandRemainingTimeNtf,
    SessionFinishedNtf => command_handler::SessionFinishedNtf,
    CsControllerCopyCfm => config::CsControllerCopyCfm,
    CsControllerCopyNtf => config::CsControllerCopyNtf,
    CsControllerCopyCancelNtf => config::CsControllerCopyCancelNtf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_command_is_not_an_error() {
        // GW_WINK_SEND_NTF is in the command table but has no typed decoder.
        let response = Response::decode(0x030A, &[0x01, 0x02]).unwrap();
        match response {
            Response::Unknown(frame) => {
                assert_eq!(frame.command, 0x030A);
                assert_eq!(&frame.arguments[..], &[0x01, 0x02]);
            },
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn unlisted_command_is_not_an_error() {
        let response = Response::decode(0x7777, &[]).unwrap();
        assert_eq!(response.command_id(), 0x7777);
    }

    #[test]
    fn malformed_arguments_of_known_command_are_an_error() {
        // GW_GET_STATE_CFM wants six argument bytes.
        let result = Response::decode(0x000D, &[0x01]);
        assert!(matches!(result, Err(WireError::Arguments { command: 0x000D, .. })));
    }

    #[test]
    fn encode_request_round_trips_through_decode() {
        let payload = encode_request(&general::GetStateReq);
        let (command, args) = wire::decode_payload(&payload).unwrap();
        assert_eq!(command, Command::GetStateReq.to_u16());
        assert!(args.is_empty());
    }
}
