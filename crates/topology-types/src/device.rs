//! Device and link records
//!
//! These are the canonical shapes produced by the device normalizer. Upstream
//! field-name heuristics never reach this crate.

use serde::{Deserialize, Serialize};

// ============================================================================
// DEVICE
// ============================================================================

/// Kind of network node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Wireless access point
    Ap,
    Switch,
    Router,
    #[default]
    Unknown,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Ap => "ap",
            DeviceType::Switch => "switch",
            DeviceType::Router => "router",
            DeviceType::Unknown => "unknown",
        }
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceType::Ap => "Access Point",
            DeviceType::Switch => "Switch",
            DeviceType::Router => "Router",
            DeviceType::Unknown => "Unknown",
        }
    }
}

/// Reachability as reported by the management cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
    #[default]
    Unknown,
}

/// A network node shown as a graph node
///
/// Identity is by `id`. Ids must be unique within one topology; duplicate ids
/// are not supported (the last record wins wherever devices are keyed by id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub mac_address: String,
}

impl Device {
    /// Minimal device with only identity and kind set
    pub fn new(id: impl Into<String>, device_type: DeviceType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            device_type,
            status: DeviceStatus::Unknown,
            model: String::new(),
            ip_address: String::new(),
            mac_address: String::new(),
        }
    }

    /// Builder: set status
    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder: set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Label for rendering - falls back to the id when the name is blank
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn is_switch(&self) -> bool {
        self.device_type == DeviceType::Switch
    }

    pub fn is_ap(&self) -> bool {
        self.device_type == DeviceType::Ap
    }
}

// ============================================================================
// LINK
// ============================================================================

/// A discovered neighbor relationship (wired LLDP or wireless RF)
///
/// Both endpoints should exist in the current device set, but consumers must
/// tolerate links whose endpoint is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub local_device_id: String,
    pub remote_device_id: String,
    #[serde(default)]
    pub local_port: String,
}

impl Link {
    pub fn new(
        id: impl Into<String>,
        local_device_id: impl Into<String>,
        remote_device_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            local_device_id: local_device_id.into(),
            remote_device_id: remote_device_id.into(),
            local_port: String::new(),
        }
    }

    /// Builder: set the local port label
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.local_port = port.into();
        self
    }

    /// Does this link touch the given device?
    pub fn touches(&self, device_id: &str) -> bool {
        self.local_device_id == device_id || self.remote_device_id == device_id
    }
}

/// Result of one topology fetch for a site
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkTopology {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl NetworkTopology {
    pub fn new(devices: Vec<Device>, links: Vec<Link>) -> Self {
        Self { devices, links }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
