//! Configuration-service messages: copying the system configuration between
//! controllers.

use bytes::{BufMut, BytesMut};

use super::{GatewayRequest, GatewayResponse};
use crate::{command::Command, error::ArgumentError, wire::FieldReader};

/// Direction of a controller copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControllerCopyMode {
    /// Transmitting configuration mode: this gateway is the source.
    Tcm = 0,
    /// Receiving configuration mode: this gateway is the target.
    Rcm = 1,
}

/// `GW_CS_CONTROLLER_COPY_REQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsControllerCopyReq {
    /// Copy direction.
    pub mode: ControllerCopyMode,
}

impl GatewayRequest for CsControllerCopyReq {
    const COMMAND: Command = Command::CsControllerCopyReq;
    type Cfm = CsControllerCopyCfm;

    fn arguments(&self, dst: &mut BytesMut) {
        dst.put_u8(self.mode as u8);
    }
}

/// `GW_CS_CONTROLLER_COPY_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsControllerCopyCfm;

impl GatewayResponse for CsControllerCopyCfm {
    const COMMAND: Command = Command::CsControllerCopyCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        FieldReader::new(arguments).finish()?;
        Ok(Self)
    }
}

/// `GW_CS_CONTROLLER_COPY_NTF`: outcome of the copy operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsControllerCopyNtf {
    /// Copy direction the status refers to.
    pub mode: u8,
    /// Copy status code.
    pub status: u8,
}

impl CsControllerCopyNtf {
    /// Copy finished.
    pub const STATUS_OK: u8 = 0;
    /// No other controller answered.
    pub const STATUS_NO_OTHER_CONTROLLER: u8 = 2;
    /// DTS not ready.
    pub const STATUS_DTS_NOT_READY: u8 = 4;
    /// DTS error; the gateway must be restored to factory state.
    pub const STATUS_DTS_ERROR: u8 = 5;
    /// Configuration service not ready.
    pub const STATUS_CS_NOT_READY: u8 = 9;

    /// Whether the copy finished.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Self::STATUS_OK
    }
}

impl GatewayResponse for CsControllerCopyNtf {
    const COMMAND: Command = Command::CsControllerCopyNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let mode = reader.u8()?;
        let status = reader.u8()?;
        reader.finish()?;
        Ok(Self { mode, status })
    }
}

/// `GW_CS_CONTROLLER_COPY_CANCEL_NTF`: the copy was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsControllerCopyCancelNtf;

impl GatewayResponse for CsControllerCopyCancelNtf {
    const COMMAND: Command = Command::CsControllerCopyCancelNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        FieldReader::new(arguments).finish()?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{messages::encode_request, wire};

    #[test]
    fn copy_request_encodes_mode_byte() {
        let payload = encode_request(&CsControllerCopyReq { mode: ControllerCopyMode::Rcm });
        let (command, args) = wire::decode_payload(&payload).unwrap();
        assert_eq!(command, 0x010A);
        assert_eq!(args, &[0x01]);
    }

    #[test]
    fn copy_ntf_success_is_status_zero() {
        let ntf = CsControllerCopyNtf::decode(&[0x00, 0x00]).unwrap();
        assert!(ntf.is_success());
        let failed = CsControllerCopyNtf::decode(&[0x00, 0x02]).unwrap();
        assert!(!failed.is_success());
    }
}
