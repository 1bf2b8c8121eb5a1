//! General gateway commands: state, versions, clock, network setup, and the
//! gateway-reported error notification.

use std::net::Ipv4Addr;

use bytes::{BufMut, BytesMut};

use super::{GatewayRequest, GatewayResponse, StatusConvention};
use crate::{
    command::Command,
    error::ArgumentError,
    wire::{FieldReader, put_fixed},
};

/// Wire width of the time-zone string field.
const TIME_ZONE_LEN: usize = 64;

/// `GW_ERROR_NTF`: the gateway rejected or failed to process a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorNtf {
    /// Gateway error code.
    pub code: u8,
}

impl ErrorNtf {
    /// Human-readable meaning of the error code.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self.code {
            0 => "unspecified error",
            1 => "unknown command or command received in wrong state",
            2 => "frame structure error",
            7 => "busy, try again later",
            8 => "bad system table index",
            12 => "not authenticated",
            _ => "undocumented error",
        }
    }
}

impl GatewayResponse for ErrorNtf {
    const COMMAND: Command = Command::ErrorNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let code = reader.u8()?;
        reader.finish()?;
        Ok(Self { code })
    }
}

/// `GW_REBOOT_REQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebootReq;

impl GatewayRequest for RebootReq {
    const COMMAND: Command = Command::RebootReq;
    type Cfm = RebootCfm;

    fn arguments(&self, _dst: &mut BytesMut) {}
}

/// `GW_REBOOT_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebootCfm;

impl GatewayResponse for RebootCfm {
    const COMMAND: Command = Command::RebootCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        FieldReader::new(arguments).finish()?;
        Ok(Self)
    }
}

/// `GW_GET_STATE_REQ`: also doubles as the keep-alive ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetStateReq;

impl GatewayRequest for GetStateReq {
    const COMMAND: Command = Command::GetStateReq;
    type Cfm = GetStateCfm;

    fn arguments(&self, _dst: &mut BytesMut) {}
}

/// `GW_GET_STATE_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetStateCfm {
    /// Gateway operating state.
    pub gateway_state: u8,
    /// Sub-state within the operating state.
    pub sub_state: u8,
    /// Reserved state data.
    pub state_data: [u8; 4],
}

impl GatewayResponse for GetStateCfm {
    const COMMAND: Command = Command::GetStateCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let gateway_state = reader.u8()?;
        let sub_state = reader.u8()?;
        let state_data = reader.array()?;
        reader.finish()?;
        Ok(Self { gateway_state, sub_state, state_data })
    }
}

/// `GW_GET_VERSION_REQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetVersionReq;

impl GatewayRequest for GetVersionReq {
    const COMMAND: Command = Command::GetVersionReq;
    type Cfm = GetVersionCfm;

    fn arguments(&self, _dst: &mut BytesMut) {}
}

/// `GW_GET_VERSION_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetVersionCfm {
    /// Six-part software version number.
    pub software_version: [u8; 6],
    /// Hardware revision.
    pub hardware_version: u8,
    /// Product group, documented as always 14.
    pub product_group: u8,
    /// Product type, documented as always 3.
    pub product_type: u8,
}

impl GetVersionCfm {
    /// Dotted rendering of the software version.
    #[must_use]
    pub fn software_version_string(&self) -> String {
        self.software_version.iter().map(u8::to_string).collect::<Vec<_>>().join(".")
    }
}

impl GatewayResponse for GetVersionCfm {
    const COMMAND: Command = Command::GetVersionCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let software_version = reader.array()?;
        let hardware_version = reader.u8()?;
        let product_group = reader.u8()?;
        let product_type = reader.u8()?;
        reader.finish()?;
        Ok(Self { software_version, hardware_version, product_group, product_type })
    }
}

/// `GW_GET_PROTOCOL_VERSION_REQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetProtocolVersionReq;

impl GatewayRequest for GetProtocolVersionReq {
    const COMMAND: Command = Command::GetProtocolVersionReq;
    type Cfm = GetProtocolVersionCfm;

    fn arguments(&self, _dst: &mut BytesMut) {}
}

/// `GW_GET_PROTOCOL_VERSION_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetProtocolVersionCfm {
    /// Major protocol version.
    pub major: u16,
    /// Minor protocol version.
    pub minor: u16,
}

impl GatewayResponse for GetProtocolVersionCfm {
    const COMMAND: Command = Command::GetProtocolVersionCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let major = reader.u16()?;
        let minor = reader.u16()?;
        reader.finish()?;
        Ok(Self { major, minor })
    }
}

/// `GW_LEAVE_LEARN_STATE_REQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveLearnStateReq;

impl GatewayRequest for LeaveLearnStateReq {
    const COMMAND: Command = Command::LeaveLearnStateReq;
    type Cfm = LeaveLearnStateCfm;

    fn arguments(&self, _dst: &mut BytesMut) {}
}

/// `GW_LEAVE_LEARN_STATE_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveLearnStateCfm {
    /// Raw status byte.
    pub status: u8,
}

impl LeaveLearnStateCfm {
    /// Success convention for this confirmation.
    pub const STATUS_CONVENTION: StatusConvention = StatusConvention::SuccessOne;

    /// Whether the gateway left learn state.
    #[must_use]
    pub fn is_success(&self) -> bool {
        Self::STATUS_CONVENTION.is_success(self.status)
    }
}

impl GatewayResponse for LeaveLearnStateCfm {
    const COMMAND: Command = Command::LeaveLearnStateCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let status = reader.u8()?;
        reader.finish()?;
        Ok(Self { status })
    }
}

/// `GW_SET_UTC_REQ`: set the gateway clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetUtcReq {
    /// Seconds since the UNIX epoch.
    pub timestamp: u32,
}

impl GatewayRequest for SetUtcReq {
    const COMMAND: Command = Command::SetUtcReq;
    type Cfm = SetUtcCfm;

    fn arguments(&self, dst: &mut BytesMut) {
        dst.put_u32(self.timestamp);
    }
}

/// `GW_SET_UTC_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetUtcCfm;

impl GatewayResponse for SetUtcCfm {
    const COMMAND: Command = Command::SetUtcCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        FieldReader::new(arguments).finish()?;
        Ok(Self)
    }
}

/// `GW_RTC_SET_TIME_ZONE_REQ`: set the time zone and daylight-saving rules
/// as a zone string, e.g. `:GMT+1:GMT+2:0060:(1994)040102-0:110102-0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcSetTimeZoneReq {
    /// Zone rule string, truncated or zero-padded to the 64-byte field.
    pub time_zone: String,
}

impl GatewayRequest for RtcSetTimeZoneReq {
    const COMMAND: Command = Command::RtcSetTimeZoneReq;
    type Cfm = RtcSetTimeZoneCfm;

    fn arguments(&self, dst: &mut BytesMut) {
        put_fixed(dst, self.time_zone.as_bytes(), TIME_ZONE_LEN);
    }
}

/// `GW_RTC_SET_TIME_ZONE_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcSetTimeZoneCfm {
    /// Raw status byte.
    pub status: u8,
}

impl RtcSetTimeZoneCfm {
    /// Success convention for this confirmation.
    pub const STATUS_CONVENTION: StatusConvention = StatusConvention::SuccessOne;

    /// Whether the time zone was accepted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        Self::STATUS_CONVENTION.is_success(self.status)
    }
}

impl GatewayResponse for RtcSetTimeZoneCfm {
    const COMMAND: Command = Command::RtcSetTimeZoneCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let status = reader.u8()?;
        reader.finish()?;
        Ok(Self { status })
    }
}

/// `GW_GET_LOCAL_TIME_REQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetLocalTimeReq;

impl GatewayRequest for GetLocalTimeReq {
    const COMMAND: Command = Command::GetLocalTimeReq;
    type Cfm = GetLocalTimeCfm;

    fn arguments(&self, _dst: &mut BytesMut) {}
}

/// `GW_GET_LOCAL_TIME_CFM`: the gateway clock, both as a UTC timestamp and
/// broken down into local time per the configured zone rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetLocalTimeCfm {
    /// Seconds since the UNIX epoch.
    pub utc_time: u32,
    /// Local second (0–61, leap seconds included).
    pub second: u8,
    /// Local minute.
    pub minute: u8,
    /// Local hour.
    pub hour: u8,
    /// Day of month (1–31).
    pub day_of_month: u8,
    /// Month (1–12).
    pub month: u8,
    /// Years since 1900.
    pub year: u16,
    /// Day of week, 0 = Sunday.
    pub week_day: u8,
    /// Day of year (1–366).
    pub day_of_year: u16,
    /// Nonzero when daylight saving is in effect.
    pub daylight_saving: u8,
}

impl GatewayResponse for GetLocalTimeCfm {
    const COMMAND: Command = Command::GetLocalTimeCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let utc_time = reader.u32()?;
        let second = reader.u8()?;
        let minute = reader.u8()?;
        let hour = reader.u8()?;
        let day_of_month = reader.u8()?;
        let month = reader.u8()?;
        let year = reader.u16()?;
        let week_day = reader.u8()?;
        let day_of_year = reader.u16()?;
        let daylight_saving = reader.u8()?;
        reader.finish()?;
        Ok(Self {
            utc_time,
            second,
            minute,
            hour,
            day_of_month,
            month,
            year,
            week_day,
            day_of_year,
            daylight_saving,
        })
    }
}

/// `GW_GET_NETWORK_SETUP_REQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetNetworkSetupReq;

impl GatewayRequest for GetNetworkSetupReq {
    const COMMAND: Command = Command::GetNetworkSetupReq;
    type Cfm = GetNetworkSetupCfm;

    fn arguments(&self, _dst: &mut BytesMut) {}
}

/// `GW_GET_NETWORK_SETUP_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetNetworkSetupCfm {
    /// Gateway IPv4 address.
    pub ip_address: Ipv4Addr,
    /// Network mask.
    pub mask: Ipv4Addr,
    /// Default gateway.
    pub default_gateway: Ipv4Addr,
    /// Whether the address was obtained via DHCP.
    pub dhcp: bool,
}

impl GatewayResponse for GetNetworkSetupCfm {
    const COMMAND: Command = Command::GetNetworkSetupCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let ip_address = reader.ipv4()?;
        let mask = reader.ipv4()?;
        let default_gateway = reader.ipv4()?;
        let dhcp = reader.u8()? != 0;
        reader.finish()?;
        Ok(Self { ip_address, mask, default_gateway, dhcp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{messages::encode_request, wire};

    #[test]
    fn get_state_req_payload() {
        let payload = encode_request(&GetStateReq);
        assert_eq!(&payload[..], &[0x00, 0x03, 0x00, 0x0C, 0x0F]);
    }

    #[test]
    fn get_state_cfm_decodes_six_bytes() {
        let cfm = GetStateCfm::decode(&[0x02, 0x00, 0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        assert_eq!(cfm.gateway_state, 2);
        assert_eq!(cfm.sub_state, 0);
        assert_eq!(cfm.state_data, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn version_string_is_dotted() {
        let cfm =
            GetVersionCfm::decode(&[0, 2, 0, 0, 71, 0, 1, 14, 3]).unwrap();
        assert_eq!(cfm.software_version_string(), "0.2.0.0.71.0");
        assert_eq!(cfm.product_group, 14);
    }

    #[test]
    fn set_utc_encodes_big_endian_timestamp() {
        let payload = encode_request(&SetUtcReq { timestamp: 0x0102_0304 });
        let (command, args) = wire::decode_payload(&payload).unwrap();
        assert_eq!(command, 0x2000);
        assert_eq!(args, &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn network_setup_decodes_addresses() {
        let cfm = GetNetworkSetupCfm::decode(&[
            192, 168, 1, 20, 255, 255, 255, 0, 192, 168, 1, 1, 1,
        ])
        .unwrap();
        assert_eq!(cfm.ip_address, Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(cfm.mask, Ipv4Addr::new(255, 255, 255, 0));
        assert!(cfm.dhcp);
    }

    #[test]
    fn error_ntf_describes_known_codes() {
        assert_eq!(ErrorNtf { code: 12 }.describe(), "not authenticated");
        assert_eq!(ErrorNtf { code: 99 }.describe(), "undocumented error");
    }
}
