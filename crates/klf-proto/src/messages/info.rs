//! Node information messages.
//!
//! `GW_GET_ALL_NODES_INFORMATION_REQ` answers with a confirmation carrying
//! the node count, then one notification per node, then a finished
//! notification. The two `*ChangedNtf` messages are unsolicited broadcasts
//! the gateway emits when node state moves.

use bytes::BytesMut;

use super::{GatewayRequest, GatewayResponse, StatusConvention};
use crate::{command::Command, error::ArgumentError, wire::FieldReader};

/// Wire width of a node name field.
const NODE_NAME_LEN: usize = 64;

/// Slots in the node alias table.
const ALIAS_SLOTS: usize = 5;

/// `GW_GET_ALL_NODES_INFORMATION_REQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAllNodesInformationReq;

impl GatewayRequest for GetAllNodesInformationReq {
    const COMMAND: Command = Command::GetAllNodesInformationReq;
    type Cfm = GetAllNodesInformationCfm;

    fn arguments(&self, _dst: &mut BytesMut) {}
}

/// `GW_GET_ALL_NODES_INFORMATION_CFM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAllNodesInformationCfm {
    /// Raw status byte.
    pub status: u8,
    /// Number of node notifications that will follow.
    pub total_nodes: u8,
}

impl GetAllNodesInformationCfm {
    /// Success convention for this confirmation.
    pub const STATUS_CONVENTION: StatusConvention = StatusConvention::SuccessZero;

    /// Whether the enumeration was accepted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        Self::STATUS_CONVENTION.is_success(self.status)
    }
}

impl GatewayResponse for GetAllNodesInformationCfm {
    const COMMAND: Command = Command::GetAllNodesInformationCfm;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let status = reader.u8()?;
        let total_nodes = reader.u8()?;
        reader.finish()?;
        Ok(Self { status, total_nodes })
    }
}

/// One entry of a node's alias table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeAlias {
    /// Alias type code.
    pub alias_type: u16,
    /// Alias value.
    pub value: u16,
}

/// `GW_GET_ALL_NODES_INFORMATION_NTF`: one full node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAllNodesInformationNtf {
    /// Node index in the system table.
    pub node_id: u8,
    /// Sort order.
    pub order: u16,
    /// Room placement.
    pub placement: u8,
    /// UTF-8 node name, NUL padding stripped.
    pub name: String,
    /// Velocity setting.
    pub velocity: u8,
    /// Combined node type and subtype.
    pub node_subtype: u16,
    /// Product group.
    pub product_group: u8,
    /// Product type.
    pub product_type: u8,
    /// Node variation.
    pub node_variation: u8,
    /// Power mode.
    pub power_mode: u8,
    /// Firmware build number.
    pub build_number: u8,
    /// Eight-byte serial number.
    pub serial_number: [u8; 8],
    /// Operating state.
    pub state: u8,
    /// Current position of the main parameter (raw 16-bit code).
    pub current_position: u16,
    /// Target position (raw 16-bit code).
    pub target: u16,
    /// Current positions of functional parameters 1–4.
    pub functional_positions: [u16; 4],
    /// Remaining travel time in seconds.
    pub remaining_time: u16,
    /// Gateway timestamp of the last state change.
    pub timestamp: u32,
    /// Populated alias entries.
    pub aliases: Vec<NodeAlias>,
}

impl GatewayResponse for GetAllNodesInformationNtf {
    const COMMAND: Command = Command::GetAllNodesInformationNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let node_id = reader.u8()?;
        let order = reader.u16()?;
        let placement = reader.u8()?;
        let name = reader.text(NODE_NAME_LEN)?;
        let velocity = reader.u8()?;
        let node_subtype = reader.u16()?;
        let product_group = reader.u8()?;
        let product_type = reader.u8()?;
        let node_variation = reader.u8()?;
        let power_mode = reader.u8()?;
        let build_number = reader.u8()?;
        let serial_number = reader.array()?;
        let state = reader.u8()?;
        let current_position = reader.u16()?;
        let target = reader.u16()?;
        let functional_positions =
            [reader.u16()?, reader.u16()?, reader.u16()?, reader.u16()?];
        let remaining_time = reader.u16()?;
        let timestamp = reader.u32()?;
        let alias_count = reader.u8()?;
        let mut aliases = Vec::new();
        for slot in 0..ALIAS_SLOTS {
            let alias_type = reader.u16()?;
            let value = reader.u16()?;
            if slot < usize::from(alias_count) {
                aliases.push(NodeAlias { alias_type, value });
            }
        }
        reader.finish()?;
        Ok(Self {
            node_id,
            order,
            placement,
            name,
            velocity,
            node_subtype,
            product_group,
            product_type,
            node_variation,
            power_mode,
            build_number,
            serial_number,
            state,
            current_position,
            target,
            functional_positions,
            remaining_time,
            timestamp,
            aliases,
        })
    }
}

/// `GW_GET_ALL_NODES_INFORMATION_FINISHED_NTF`: terminator of the node
/// enumeration stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAllNodesInformationFinishedNtf;

impl GatewayResponse for GetAllNodesInformationFinishedNtf {
    const COMMAND: Command = Command::GetAllNodesInformationFinishedNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        FieldReader::new(arguments).finish()?;
        Ok(Self)
    }
}

/// `GW_NODE_INFORMATION_CHANGED_NTF`: broadcast after node metadata edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInformationChangedNtf {
    /// Node index in the system table.
    pub node_id: u8,
    /// New node name.
    pub name: String,
    /// New sort order.
    pub order: u16,
    /// New room placement.
    pub placement: u8,
    /// New node variation.
    pub node_variation: u8,
}

impl GatewayResponse for NodeInformationChangedNtf {
    const COMMAND: Command = Command::NodeInformationChangedNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let node_id = reader.u8()?;
        let name = reader.text(NODE_NAME_LEN)?;
        let order = reader.u16()?;
        let placement = reader.u8()?;
        let node_variation = reader.u8()?;
        reader.finish()?;
        Ok(Self { node_id, name, order, placement, node_variation })
    }
}

/// `GW_NODE_STATE_POSITION_CHANGED_NTF`: broadcast while a node moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStatePositionChangedNtf {
    /// Node index in the system table.
    pub node_id: u8,
    /// Operating state.
    pub state: u8,
    /// Current position (raw 16-bit code).
    pub current_position: u16,
    /// Target position (raw 16-bit code).
    pub target: u16,
    /// Current positions of functional parameters 1–4.
    pub functional_positions: [u16; 4],
    /// Remaining travel time in seconds.
    pub remaining_time: u16,
    /// Gateway timestamp of the change.
    pub timestamp: u32,
}

impl GatewayResponse for NodeStatePositionChangedNtf {
    const COMMAND: Command = Command::NodeStatePositionChangedNtf;

    fn decode(arguments: &[u8]) -> Result<Self, ArgumentError> {
        let mut reader = FieldReader::new(arguments);
        let node_id = reader.u8()?;
        let state = reader.u8()?;
        let current_position = reader.u16()?;
        let target = reader.u16()?;
        let functional_positions =
            [reader.u16()?, reader.u16()?, reader.u16()?, reader.u16()?];
        let remaining_time = reader.u16()?;
        let timestamp = reader.u32()?;
        reader.finish()?;
        Ok(Self {
            node_id,
            state,
            current_position,
            target,
            functional_positions,
            remaining_time,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;

    /// Build the 124-byte argument tuple of a node record.
    fn node_record(node_id: u8, name: &str, current_position: u16) -> Vec<u8> {
        let mut args = BytesMut::new();
        args.put_u8(node_id);
        args.put_u16(u16::from(node_id)); // order
        args.put_u8(0); // placement
        crate::wire::put_fixed(&mut args, name.as_bytes(), 64);
        args.put_u8(0); // velocity
        args.put_u16(0x0040); // subtype
        args.put_u8(14); // product group
        args.put_u8(3); // product type
        args.put_u8(0); // variation
        args.put_u8(0); // power mode
        args.put_u8(5); // build number
        args.put_slice(&[0x11; 8]); // serial
        args.put_u8(4); // state
        args.put_u16(current_position);
        args.put_u16(current_position); // target
        for _ in 0..4 {
            args.put_u16(0xF7FF); // unused functional positions
        }
        args.put_u16(0); // remaining time
        args.put_u32(1_234_567); // timestamp
        args.put_u8(1); // one alias
        args.put_u16(0xD803);
        args.put_u16(0xBA00);
        for _ in 0..4 {
            args.put_u32(0); // empty alias slots
        }
        args.to_vec()
    }

    #[test]
    fn node_record_decodes() {
        let args = node_record(3, "Bedroom window", 0x6400);
        assert_eq!(args.len(), 124);

        let ntf = GetAllNodesInformationNtf::decode(&args).unwrap();
        assert_eq!(ntf.node_id, 3);
        assert_eq!(ntf.name, "Bedroom window");
        assert_eq!(ntf.current_position, 0x6400);
        assert_eq!(ntf.product_group, 14);
        assert_eq!(ntf.aliases, vec![NodeAlias { alias_type: 0xD803, value: 0xBA00 }]);
    }

    #[test]
    fn truncated_node_record_is_rejected() {
        let args = node_record(3, "Bedroom window", 0x6400);
        assert!(GetAllNodesInformationNtf::decode(&args[..80]).is_err());
    }

    #[test]
    fn finished_ntf_has_no_arguments() {
        assert!(GetAllNodesInformationFinishedNtf::decode(&[]).is_ok());
        assert!(GetAllNodesInformationFinishedNtf::decode(&[0x00]).is_err());
    }

    #[test]
    fn position_change_decodes() {
        let mut args = BytesMut::new();
        args.put_u8(7);
        args.put_u8(4);
        args.put_u16(0x3200);
        args.put_u16(0xC800);
        for _ in 0..4 {
            args.put_u16(0xF7FF);
        }
        args.put_u16(42);
        args.put_u32(99);
        let ntf = NodeStatePositionChangedNtf::decode(&args).unwrap();
        assert_eq!(ntf.node_id, 7);
        assert_eq!(ntf.target, 0xC800);
        assert_eq!(ntf.remaining_time, 42);
    }
}
