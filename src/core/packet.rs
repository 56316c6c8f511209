//! # Packet Tree
//!
//! A decoded transmission is a tree of packets. Every packet starts with a 3-bit
//! version and a 3-bit type ID. Type ID 4 marks a literal carrying one integer;
//! every other type ID marks an operator whose value is computed from its
//! sub-packets.
//!
//! ## Wire Format
//! ```text
//! literal:  [Version(3)] [TypeID=4(3)] [1xxxx]* [0xxxx]
//! operator: [Version(3)] [TypeID(3)] [I=0(1)] [TotalBits(15)] [sub-packets...]
//!           [Version(3)] [TypeID(3)] [I=1(1)] [Count(11)]     [sub-packets...]
//! ```
//!
//! Literal and operator packets are separate variants, so a literal can never own
//! children and an operator can never carry a literal value.

use crate::error::{constants, DecodeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type ID reserved for literal packets
pub const LITERAL_TYPE_ID: u8 = 4;

/// Operation applied by an operator packet to its sub-packets' values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Sum,
    Product,
    Minimum,
    Maximum,
    GreaterThan,
    LessThan,
    EqualTo,
}

impl Operator {
    /// Wire type ID of this operator
    pub fn type_id(self) -> u8 {
        match self {
            Operator::Sum => 0,
            Operator::Product => 1,
            Operator::Minimum => 2,
            Operator::Maximum => 3,
            Operator::GreaterThan => 5,
            Operator::LessThan => 6,
            Operator::EqualTo => 7,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Operator::Sum => "sum",
            Operator::Product => "product",
            Operator::Minimum => "minimum",
            Operator::Maximum => "maximum",
            Operator::GreaterThan => "greater-than",
            Operator::LessThan => "less-than",
            Operator::EqualTo => "equal-to",
        }
    }
}

impl TryFrom<u8> for Operator {
    type Error = DecodeError;

    fn try_from(type_id: u8) -> Result<Self> {
        match type_id {
            0 => Ok(Operator::Sum),
            1 => Ok(Operator::Product),
            2 => Ok(Operator::Minimum),
            3 => Ok(Operator::Maximum),
            5 => Ok(Operator::GreaterThan),
            6 => Ok(Operator::LessThan),
            7 => Ok(Operator::EqualTo),
            LITERAL_TYPE_ID => Err(DecodeError::malformed(constants::ERR_LITERAL_TYPE_ID)),
            other => Err(DecodeError::MalformedPacket(format!(
                "Type ID {other} does not fit in 3 bits"
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an operator packet frames its sub-packets (the length type ID bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthType {
    /// `I = 0`: a 15-bit field gives the total bit length of all sub-packets
    TotalBits,
    /// `I = 1`: an 11-bit field gives the number of immediate sub-packets
    #[default]
    SubPacketCount,
}

impl LengthType {
    /// Width in bits of the field following the length type ID
    pub fn field_width(self) -> usize {
        match self {
            LengthType::TotalBits => 15,
            LengthType::SubPacketCount => 11,
        }
    }

    /// Value of the length type ID bit
    pub fn id(self) -> u8 {
        match self {
            LengthType::TotalBits => 0,
            LengthType::SubPacketCount => 1,
        }
    }

    pub fn from_bit(bit: bool) -> Self {
        if bit {
            LengthType::SubPacketCount
        } else {
            LengthType::TotalBits
        }
    }
}

/// One node of a decoded transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Packet {
    Literal {
        version: u8,
        value: u64,
    },
    Operator {
        version: u8,
        operator: Operator,
        length_type: LengthType,
        children: Vec<Packet>,
    },
}

impl Packet {
    pub fn literal(version: u8, value: u64) -> Self {
        Packet::Literal { version, value }
    }

    /// Operator packet framed by sub-packet count
    pub fn operator(version: u8, operator: Operator, children: Vec<Packet>) -> Self {
        Packet::Operator {
            version,
            operator,
            length_type: LengthType::default(),
            children,
        }
    }

    /// Operator packet with an explicit framing choice
    pub fn operator_with_framing(
        version: u8,
        operator: Operator,
        length_type: LengthType,
        children: Vec<Packet>,
    ) -> Self {
        Packet::Operator {
            version,
            operator,
            length_type,
            children,
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            Packet::Literal { version, .. } | Packet::Operator { version, .. } => *version,
        }
    }

    pub fn type_id(&self) -> u8 {
        match self {
            Packet::Literal { .. } => LITERAL_TYPE_ID,
            Packet::Operator { operator, .. } => operator.type_id(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Packet::Literal { .. })
    }

    pub fn literal_value(&self) -> Option<u64> {
        match self {
            Packet::Literal { value, .. } => Some(*value),
            Packet::Operator { .. } => None,
        }
    }

    pub fn operator_kind(&self) -> Option<Operator> {
        match self {
            Packet::Literal { .. } => None,
            Packet::Operator { operator, .. } => Some(*operator),
        }
    }

    pub fn length_type(&self) -> Option<LengthType> {
        match self {
            Packet::Literal { .. } => None,
            Packet::Operator { length_type, .. } => Some(*length_type),
        }
    }

    /// Immediate sub-packets; always empty for literals
    pub fn children(&self) -> &[Packet] {
        match self {
            Packet::Literal { .. } => &[],
            Packet::Operator { children, .. } => children,
        }
    }

    /// Number of packets in this subtree, including `self`
    pub fn packet_count(&self) -> usize {
        1 + self.children().iter().map(Packet::packet_count).sum::<usize>()
    }

    /// Nesting depth of this subtree; a lone literal has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Packet::depth).max().unwrap_or(0)
    }

    /// Render the tree with one indented line per packet.
    pub fn display_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, indent: usize) {
        use std::fmt::Write;

        let literal = match self.literal_value() {
            Some(value) => value.to_string(),
            None => "N/A".to_string(),
        };
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{:indent$}Version: {}, TypeID : {}, Literal: {}",
            "",
            self.version(),
            self.type_id(),
            literal,
            indent = indent * 2
        );
        for child in self.children() {
            child.write_tree(out, indent + 1);
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Literal { value, .. } => write!(f, "{value}"),
            Packet::Operator {
                operator, children, ..
            } => {
                write!(f, "{operator}(")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}
