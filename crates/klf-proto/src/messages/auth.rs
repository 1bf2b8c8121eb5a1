//! Authentication messages.

use bytes::BytesMut;

use super::{GatewayRequest, GatewayResponse, StatusConvention};
use crate::{
    command::Command,
    error::ArgumentError,
    wire::{FieldReader, put_fixed},
};

/// Wire width of a password field.
pub const PASSWORD_LEN: usize = 31;

/// `GW_PASSWORD_ENTER_REQ`: authenticate the connection.
///
/// The password is zero-padded (or truncated) to [`PASSWORD_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordEnterReq {
    /// Gateway password (the Wi-Fi password printed on the unit).
    pub password: String,
}

impl PasswordEnterReq {
    /// Request carrying `password`.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self { password: password.into() }
    }
}

impl GatewayRequest for PasswordEnterReq {
    const COMMAND: Command = Command::PasswordEnterReq;
    type Cfm = PasswordEnterCfm;

    fn arguments(&self, dst: &mut BytesMut) {
        put_fixed(dst, self.password.as_bytes(), PASSWORD_LEN);
    }
}

/// `GW_PASSWORD_ENTER_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordEnterCfm {
    /// Raw status byte.
    pub status: u8,
}

impl PasswordEnterCfm {
    /// Success convention for this confirmation.
    pub const STATUS_CONVENTION: StatusConvention = StatusConvention::SuccessZero;

    /// Whether the gateway accepted the password.
    #[must_use]
    pub fn is_success(&self) -> bool {
        Self::STATUS_CONVENTION.is_success(self.status)
    }
}

impl GatewayResponse for PasswordEnterCfm {
    const COMMAND: Command = Command::PasswordEnterCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let status = reader.u8()?;
        reader.finish()?;
        Ok(Self { status })
    }
}

/// `GW_PASSWORD_CHANGE_REQ`: replace the gateway password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChangeReq {
    /// Currently valid password.
    pub old_password: String,
    /// Password to set.
    pub new_password: String,
}

impl GatewayRequest for PasswordChangeReq {
    const COMMAND: Command = Command::PasswordChangeReq;
    type Cfm = PasswordChangeCfm;

    fn arguments(&self, dst: &mut BytesMut) {
        put_fixed(dst, self.old_password.as_bytes(), PASSWORD_LEN);
        put_fixed(dst, self.new_password.as_bytes(), PASSWORD_LEN);
    }
}

/// `GW_PASSWORD_CHANGE_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordChangeCfm {
    /// Raw status byte.
    pub status: u8,
}

impl PasswordChangeCfm {
    /// Success convention for this confirmation.
    pub const STATUS_CONVENTION: StatusConvention = StatusConvention::SuccessZero;

    /// Whether the password was changed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        Self::STATUS_CONVENTION.is_success(self.status)
    }
}

impl GatewayResponse for PasswordChangeCfm {
    const COMMAND: Command = Command::PasswordChangeCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let status = reader.u8()?;
        reader.finish()?;
        Ok(Self { status })
    }
}

/// `GW_PASSWORD_CHANGE_NTF`: broadcast to every connected client after a
/// successful change. Carries the new password padded to the field width
/// plus one pad byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChangeNtf {
    /// The password now in effect.
    pub new_password: String,
}

impl GatewayResponse for PasswordChangeNtf {
    const COMMAND: Command = Command::PasswordChangeNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let new_password = reader.text(PASSWORD_LEN)?;
        reader.skip(1)?;
        reader.finish()?;
        Ok(Self { new_password })
    }
}
