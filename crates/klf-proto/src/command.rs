//! The KLF-200 command table.
//!
//! Every gateway message starts with a 16-bit command identifier. Requests
//! end in `Req`, their immediate acknowledgements in `Cfm`, asynchronous
//! notifications in `Ntf`. The table below is the complete catalogue from
//! the Velux technical documentation; only a subset has a typed decoder in
//! [`crate::messages`], the rest decode to the generic unknown-frame value.

/// 16-bit gateway command identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
#[allow(missing_docs)] // names mirror the GW_* catalogue one to one
pub enum Command {
    ErrorNtf = 0x0000,
    RebootReq = 0x0001,
    RebootCfm = 0x0002,
    SetFactoryDefaultReq = 0x0003,
    SetFactoryDefaultCfm = 0x0004,
    GetVersionReq = 0x0008,
    GetVersionCfm = 0x0009,
    GetProtocolVersionReq = 0x000A,
    GetProtocolVersionCfm = 0x000B,
    GetStateReq = 0x000C,
    GetStateCfm = 0x000D,
    LeaveLearnStateReq = 0x000E,
    LeaveLearnStateCfm = 0x000F,
    GetNetworkSetupReq = 0x00E0,
    GetNetworkSetupCfm = 0x00E1,
    SetNetworkSetupReq = 0x00E2,
    SetNetworkSetupCfm = 0x00E3,
    CsGetSystemTableDataReq = 0x0100,
    CsGetSystemTableDataCfm = 0x0101,
    CsGetSystemTableDataNtf = 0x0102,
    CsDiscoverNodesReq = 0x0103,
    CsDiscoverNodesCfm = 0x0104,
    CsDiscoverNodesNtf = 0x0105,
    CsRemoveNodesReq = 0x0106,
    CsRemoveNodesCfm = 0x0107,
    CsVirginStateReq = 0x0108,
    CsVirginStateCfm = 0x0109,
    CsControllerCopyReq = 0x010A,
    CsControllerCopyCfm = 0x010B,
    CsControllerCopyNtf = 0x010C,
    CsControllerCopyCancelNtf = 0x010D,
    CsReceiveKeyReq = 0x010E,
    CsReceiveKeyCfm = 0x010F,
    CsReceiveKeyNtf = 0x0110,
    CsPgcJobNtf = 0x0111,
    CsSystemTableUpdateNtf = 0x0112,
    CsGenerateNewKeyReq = 0x0113,
    CsGenerateNewKeyCfm = 0x0114,
    CsGenerateNewKeyNtf = 0x0115,
    CsRepairKeyReq = 0x0116,
    CsRepairKeyCfm = 0x0117,
    CsRepairKeyNtf = 0x0118,
    CsActivateConfigurationModeReq = 0x0119,
    CsActivateConfigurationModeCfm = 0x011A,
    GetNodeInformationReq = 0x0200,
    GetNodeInformationCfm = 0x0201,
    GetAllNodesInformationReq = 0x0202,
    GetAllNodesInformationCfm = 0x0203,
    GetAllNodesInformationNtf = 0x0204,
    GetAllNodesInformationFinishedNtf = 0x0205,
    SetNodeVariationReq = 0x0206,
    SetNodeVariationCfm = 0x0207,
    SetNodeNameReq = 0x0208,
    SetNodeNameCfm = 0x0209,
    SetNodeVelocityReq = 0x020A,
    SetNodeVelocityCfm = 0x020B,
    NodeInformationChangedNtf = 0x020C,
    SetNodeOrderAndPlacementReq = 0x020D,
    SetNodeOrderAndPlacementCfm = 0x020E,
    NodeStatePositionChangedNtf = 0x0211,
    GetGroupInformationReq = 0x0220,
    GetGroupInformationCfm = 0x0221,
    SetGroupInformationReq = 0x0222,
    SetGroupInformationCfm = 0x0223,
    GroupInformationChangedNtf = 0x0224,
    DeleteGroupReq = 0x0225,
    DeleteGroupCfm = 0x0226,
    NewGroupReq = 0x0227,
    GetAllGroupsInformationReq = 0x0229,
    GetAllGroupsInformationCfm = 0x022A,
    GetAllGroupsInformationNtf = 0x022B,
    GetAllGroupsInformationFinishedNtf = 0x022C,
    GroupDeletedNtf = 0x022D,
    GetGroupInformationNtf = 0x0230,
    HouseStatusMonitorEnableReq = 0x0240,
    HouseStatusMonitorEnableCfm = 0x0241,
    HouseStatusMonitorDisableReq = 0x0242,
    HouseStatusMonitorDisableCfm = 0x0243,
    CommandSendReq = 0x0300,
    CommandSendCfm = 0x0301,
    CommandRunStatusNtf = 0x0302,
    CommandRemainingTimeNtf = 0x0303,
    SessionFinishedNtf = 0x0304,
    StatusRequestReq = 0x0305,
    StatusRequestCfm = 0x0306,
    StatusRequestNtf = 0x0307,
    WinkSendReq = 0x0308,
    WinkSendCfm = 0x0309,
    WinkSendNtf = 0x030A,
    SetLimitationReq = 0x0310,
    SetLimitationCfm = 0x0311,
    GetLimitationStatusReq = 0x0312,
    GetLimitationStatusCfm = 0x0313,
    LimitationStatusNtf = 0x0314,
    ModeSendReq = 0x0320,
    ModeSendCfm = 0x0321,
    ModeSendNtf = 0x0322,
    InitializeSceneReq = 0x0400,
    InitializeSceneCfm = 0x0401,
    InitializeSceneNtf = 0x0402,
    InitializeSceneCancelReq = 0x0403,
    InitializeSceneCancelCfm = 0x0404,
    RecordSceneReq = 0x0405,
    RecordSceneCfm = 0x0406,
    RecordSceneNtf = 0x0407,
    DeleteSceneReq = 0x0408,
    DeleteSceneCfm = 0x0409,
    RenameSceneReq = 0x040A,
    RenameSceneCfm = 0x040B,
    GetSceneListReq = 0x040C,
    GetSceneListCfm = 0x040D,
    GetSceneListNtf = 0x040E,
    GetSceneInformationReq = 0x040F,
    GetSceneInformationCfm = 0x0410,
    GetSceneInformationNtf = 0x0411,
    ActivateSceneReq = 0x0412,
    ActivateSceneCfm = 0x0413,
    StopSceneReq = 0x0415,
    StopSceneCfm = 0x0416,
    SceneInformationChangedNtf = 0x0419,
    ActivateProductGroupReq = 0x0447,
    ActivateProductGroupCfm = 0x0448,
    ActivateProductGroupNtf = 0x0449,
    GetContactInputLinkListReq = 0x0460,
    GetContactInputLinkListCfm = 0x0461,
    SetContactInputLinkReq = 0x0462,
    SetContactInputLinkCfm = 0x0463,
    RemoveContactInputLinkReq = 0x0464,
    RemoveContactInputLinkCfm = 0x0465,
    GetActivationLogHeaderReq = 0x0500,
    GetActivationLogHeaderCfm = 0x0501,
    ClearActivationLogReq = 0x0502,
    ClearActivationLogCfm = 0x0503,
    GetActivationLogLineReq = 0x0504,
    GetActivationLogLineCfm = 0x0505,
    ActivationLogUpdatedNtf = 0x0506,
    GetMultipleActivationLogLinesReq = 0x0507,
    GetMultipleActivationLogLinesNtf = 0x0508,
    GetMultipleActivationLogLinesCfm = 0x0509,
    SetUtcReq = 0x2000,
    SetUtcCfm = 0x2001,
    RtcSetTimeZoneReq = 0x2002,
    RtcSetTimeZoneCfm = 0x2003,
    GetLocalTimeReq = 0x2004,
    GetLocalTimeCfm = 0x2005,
    PasswordEnterReq = 0x3000,
    PasswordEnterCfm = 0x3001,
    PasswordChangeReq = 0x3002,
    PasswordChangeCfm = 0x3003,
    PasswordChangeNtf = 0x3004,
}

impl Command {
    /// Wire representation of the command id.
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Look up a wire command id. Unlisted ids return `None`; callers treat
    /// those frames as unknown, not as errors.
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        let command = match value {
            0x0000 => Self::ErrorNtf,
            0x0001 => Self::RebootReq,
            0x0002 => Self::RebootCfm,
            0x0003 => Self::SetFactoryDefaultReq,
            0x0004 => Self::SetFactoryDefaultCfm,
            0x0008 => Self::GetVersionReq,
            0x0009 => Self::GetVersionCfm,
            0x000A => Self::GetProtocolVersionReq,
            0x000B => Self::GetProtocolVersionCfm,
            0x000C => Self::GetStateReq,
            0x000D => Self::GetStateCfm,
            0x000E => Self::LeaveLearnStateReq,
            0x000F => Self::LeaveLearnStateCfm,
            0x00E0 => Self::GetNetworkSetupReq,
            0x00E1 => Self::GetNetworkSetupCfm,
            0x00E2 => Self::SetNetworkSetupReq,
            0x00E3 => Self::SetNetworkSetupCfm,
            0x0100 => Self::CsGetSystemTableDataReq,
            0x0101 => Self::CsGetSystemTableDataCfm,
            0x0102 => Self::CsGetSystemTableDataNtf,
            0x0103 => Self::CsDiscoverNodesReq,
            0x0104 => Self::CsDiscoverNodesCfm,
            0x0105 => Self::CsDiscoverNodesNtf,
            0x0106 => Self::CsRemoveNodesReq,
            0x0107 => Self::CsRemoveNodesCfm,
            0x0108 => Self::CsVirginStateReq,
            0x0109 => Self::CsVirginStateCfm,
            0x010A => Self::CsControllerCopyReq,
            0x010B => Self::CsControllerCopyCfm,
            0x010C => Self::CsControllerCopyNtf,
            0x010D => Self::CsControllerCopyCancelNtf,
            0x010E => Self::CsReceiveKeyReq,
            0x010F => Self::CsReceiveKeyCfm,
            0x0110 => Self::CsReceiveKeyNtf,
            0x0111 => Self::CsPgcJobNtf,
            0x0112 => Self::CsSystemTableUpdateNtf,
            0x0113 => Self::CsGenerateNewKeyReq,
            0x0114 => Self::CsGenerateNewKeyCfm,
            0x0115 => Self::CsGenerateNewKeyNtf,
            0x0116 => Self::CsRepairKeyReq,
            0x0117 => Self::CsRepairKeyCfm,
            0x0118 => Self::CsRepairKeyNtf,
            0x0119 => Self::CsActivateConfigurationModeReq,
            0x011A => Self::CsActivateConfigurationModeCfm,
            0x0200 => Self::GetNodeInformationReq,
            0x0201 => Self::GetNodeInformationCfm,
            0x0202 => Self::GetAllNodesInformationReq,
            0x0203 => Self::GetAllNodesInformationCfm,
            0x0204 => Self::GetAllNodesInformationNtf,
            0x0205 => Self::GetAllNodesInformationFinishedNtf,
            0x0206 => Self::SetNodeVariationReq,
            0x0207 => Self::SetNodeVariationCfm,
            0x0208 => Self::SetNodeNameReq,
            0x0209 => Self::SetNodeNameCfm,
            0x020A => Self::SetNodeVelocityReq,
            0x020B => Self::SetNodeVelocityCfm,
            0x020C => Self::NodeInformationChangedNtf,
            0x020D => Self::SetNodeOrderAndPlacementReq,
            0x020E => Self::SetNodeOrderAndPlacementCfm,
            0x0211 => Self::NodeStatePositionChangedNtf,
            0x0220 => Self::GetGroupInformationReq,
            0x0221 => Self::GetGroupInformationCfm,
            0x0222 => Self::SetGroupInformationReq,
            0x0223 => Self::SetGroupInformationCfm,
            0x0224 => Self::GroupInformationChangedNtf,
            0x0225 => Self::DeleteGroupReq,
            0x0226 => Self::DeleteGroupCfm,
            0x0227 => Self::NewGroupReq,
            0x0229 => Self::GetAllGroupsInformationReq,
            0x022A => Self::GetAllGroupsInformationCfm,
            0x022B => Self::GetAllGroupsInformationNtf,
            0x022C => Self::GetAllGroupsInformationFinishedNtf,
            0x022D => Self::GroupDeletedNtf,
            0x0230 => Self::GetGroupInformationNtf,
            0x0240 => Self::HouseStatusMonitorEnableReq,
            0x0241 => Self::HouseStatusMonitorEnableCfm,
            0x0242 => Self::HouseStatusMonitorDisableReq,
            0x0243 => Self::HouseStatusMonitorDisableCfm,
            0x0300 => Self::CommandSendReq,
            0x0301 => Self::CommandSendCfm,
            0x0302 => Self::CommandRunStatusNtf,
            0x0303 => Self::CommandRemainingTimeNtf,
            0x0304 => Self::SessionFinishedNtf,
            0x0305 => Self::StatusRequestReq,
            0x0306 => Self::StatusRequestCfm,
            0x0307 => Self::StatusRequestNtf,
            0x0308 => Self::WinkSendReq,
            0x0309 => Self::WinkSendCfm,
            0x030A => Self::WinkSendNtf,
            0x0310 => Self::SetLimitationReq,
            0x0311 => Self::SetLimitationCfm,
            0x0312 => Self::GetLimitationStatusReq,
            0x0313 => Self::GetLimitationStatusCfm,
            0x0314 => Self::LimitationStatusNtf,
            0x0320 => Self::ModeSendReq,
            0x0321 => Self::ModeSendCfm,
            0x0322 => Self::ModeSendNtf,
            0x0400 => Self::InitializeSceneReq,
            0x0401 => Self::InitializeSceneCfm,
            0x0402 => Self::InitializeSceneNtf,
            0x0403 => Self::InitializeSceneCancelReq,
            0x0404 => Self::InitializeSceneCancelCfm,
            0x0405 => Self::RecordSceneReq,
            0x0406 => Self::RecordSceneCfm,
            0x0407 => Self::RecordSceneNtf,
            0x0408 => Self::DeleteSceneReq,
            0x0409 => Self::DeleteSceneCfm,
            0x040A => Self::RenameSceneReq,
            0x040B => Self::RenameSceneCfm,
            0x040C => Self::GetSceneListReq,
            0x040D => Self::GetSceneListCfm,
            0x040E => Self::GetSceneListNtf,
            0x040F => Self::GetSceneInformationReq,
            0x0410 => Self::GetSceneInformationCfm,
            0x0411 => Self::GetSceneInformationNtf,
            0x0412 => Self::ActivateSceneReq,
            0x0413 => Self::ActivateSceneCfm,
            0x0415 => Self::StopSceneReq,
            0x0416 => Self::StopSceneCfm,
            0x0419 => Self::SceneInformationChangedNtf,
            0x0447 => Self::ActivateProductGroupReq,
            0x0448 => Self::ActivateProductGroupCfm,
            0x0449 => Self::ActivateProductGroupNtf,
            0x0460 => Self::GetContactInputLinkListReq,
            0x0461 => Self::GetContactInputLinkListCfm,
            0x0462 => Self::SetContactInputLinkReq,
            0x0463 => Self::SetContactInputLinkCfm,
            0x0464 => Self::RemoveContactInputLinkReq,
            0x0465 => Self::RemoveContactInputLinkCfm,
            0x0500 => Self::GetActivationLogHeaderReq,
            0x0501 => Self::GetActivationLogHeaderCfm,
            0x0502 => Self::ClearActivationLogReq,
            0x0503 => Self::ClearActivationLogCfm,
            0x0504 => Self::GetActivationLogLineReq,
            0x0505 => Self::GetActivationLogLineCfm,
            0x0506 => Self::ActivationLogUpdatedNtf,
            0x0507 => Self::GetMultipleActivationLogLinesReq,
            0x0508 => Self::GetMultipleActivationLogLinesNtf,
            0x0509 => Self::GetMultipleActivationLogLinesCfm,
            0x2000 => Self::SetUtcReq,
            0x2001 => Self::SetUtcCfm,
            0x2002 => Self::RtcSetTimeZoneReq,
            0x2003 => Self::RtcSetTimeZoneCfm,
            0x2004 => Self::GetLocalTimeReq,
            0x2005 => Self::GetLocalTimeCfm,
            0x3000 => Self::PasswordEnterReq,
            0x3001 => Self::PasswordEnterCfm,
            0x3002 => Self::PasswordChangeReq,
            0x3003 => Self::PasswordChangeCfm,
            0x3004 => Self::PasswordChangeNtf,
            _ => return None,
        };
        Some(command)
    }
}
