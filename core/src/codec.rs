//! ROS parameter document codec.
//!
//! Every document wraps one or more parameter blocks in a fixed envelope:
//!
//! ```yaml
//! /**:
//!   ntrip_client:
//!     ros__parameters:
//!       username: u1
//!       password: p1
//! ```
//!
//! `decode` and `encode` move a single block in and out of that envelope.
//! [`Document`] keeps the whole parsed file so a read-modify-write can
//! touch one block and leave everything else in the file alone.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::error::CodecError;

/// Root key of every parameter document.
pub const WRAPPER_MARKER: &str = "/**";

/// Key between the subsystem name and its parameters.
pub const PARAMS_MARKER: &str = "ros__parameters";

/// A decoded scalar. Values round-trip as read; no type checks here.
pub type ParamValue = Value;

/// The innermost `parameter name -> value` mapping of one subsystem.
pub type ParameterBlock = BTreeMap<String, ParamValue>;


/// Decode the parameter block of `subsystem` from document text.
pub fn decode(text: &str, subsystem: &str) -> Result<ParameterBlock, CodecError> {
    Document::parse(text)?.block(subsystem)
}


/// Wrap `block` in the envelope for `subsystem` and serialise it.
pub fn encode(subsystem: &str, block: &ParameterBlock) -> Result<String, CodecError> {
    Document::wrap(subsystem, block).to_yaml()
}


/// A parsed parameter document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parse document text. Only YAML well-formedness is checked here;
    /// envelope problems surface when a block is accessed.
    pub fn parse(text: &str) -> Result<Document, CodecError> {
        let root: Value = serde_yaml::from_str(text).map_err(CodecError::Parse)?;
        Ok(Document { root })
    }

    /// Build a document holding exactly one subsystem's block.
    pub fn wrap(subsystem: &str, block: &ParameterBlock) -> Document {
        let mut params = Mapping::new();
        for (name, value) in block {
            params.insert(Value::String(name.clone()), value.clone());
        }

        let mut node = Mapping::new();
        node.insert(Value::String(PARAMS_MARKER.into()), Value::Mapping(params));

        let mut wrapper = Mapping::new();
        wrapper.insert(Value::String(subsystem.into()), Value::Mapping(node));

        let mut root = Mapping::new();
        root.insert(Value::String(WRAPPER_MARKER.into()), Value::Mapping(wrapper));

        Document {
            root: Value::Mapping(root),
        }
    }

    /// Names of the subsystems present under the wrapper marker.
    pub fn subsystems(&self) -> Vec<String> {
        match self.root.get(WRAPPER_MARKER).and_then(Value::as_mapping) {
            Some(wrapper) => wrapper
                .keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Copy out the parameter block of `subsystem`.
    pub fn block(&self, subsystem: &str) -> Result<ParameterBlock, CodecError> {
        let wrapper = self
            .root
            .get(WRAPPER_MARKER)
            .ok_or_else(|| missing(WRAPPER_MARKER))?;
        let node = wrapper.get(subsystem).ok_or_else(|| missing(subsystem))?;
        let params = node.get(PARAMS_MARKER).ok_or_else(|| missing(PARAMS_MARKER))?;

        // `ros__parameters:` with nothing under it is an empty block
        if params.is_null() {
            return Ok(ParameterBlock::new());
        }
        let mapping = params
            .as_mapping()
            .ok_or_else(|| not_a_mapping(subsystem))?;

        let mut block = ParameterBlock::new();
        for (name, value) in mapping {
            let name = name.as_str().ok_or_else(|| {
                CodecError::Malformed(format!(
                    "non-string parameter name {:?} in {}",
                    name, subsystem
                ))
            })?;
            block.insert(name.to_string(), value.clone());
        }
        Ok(block)
    }

    /// Borrow the parameter mapping of `subsystem` for in-place edits.
    /// Key order inside the mapping is preserved on write.
    pub fn block_mut(&mut self, subsystem: &str) -> Result<&mut Mapping, CodecError> {
        let wrapper = self
            .root
            .get_mut(WRAPPER_MARKER)
            .ok_or_else(|| missing(WRAPPER_MARKER))?;
        let node = wrapper.get_mut(subsystem).ok_or_else(|| missing(subsystem))?;
        let params = node
            .get_mut(PARAMS_MARKER)
            .ok_or_else(|| missing(PARAMS_MARKER))?;

        if params.is_null() {
            *params = Value::Mapping(Mapping::new());
        }
        params
            .as_mapping_mut()
            .ok_or_else(|| not_a_mapping(subsystem))
    }

    /// Serialise the whole document.
    pub fn to_yaml(&self) -> Result<String, CodecError> {
        serde_yaml::to_string(&self.root).map_err(CodecError::Encode)
    }
}


fn missing(key: &str) -> CodecError {
    CodecError::Malformed(format!("missing key '{}'", key))
}


fn not_a_mapping(subsystem: &str) -> CodecError {
    CodecError::Malformed(format!("{} of {} is not a mapping", PARAMS_MARKER, subsystem))
}
