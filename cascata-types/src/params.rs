//! Immutable attribute bundle for one ad request.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Screen orientation at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Taller than wide.
    #[default]
    Portrait,
    /// Wider than tall.
    Landscape,
}

impl Orientation {
    /// Stable identifier used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known device location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Attributes sent with one ad request.
///
/// Values are opaque and pre-hashed by the identity provider; this type only
/// carries them. Fields are private so a value cannot change after
/// [`RequestParamsBuilder::build`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestParams {
    md5_udid: String,
    sha1_udid: String,
    opt_out: bool,
    device_make: String,
    device_model: String,
    carrier: String,
    first_launch: bool,
    location: Option<GeoPoint>,
    user_agent: String,
    orientation: Orientation,
}

impl RequestParams {
    /// Start building a parameter bundle.
    #[must_use]
    pub fn builder() -> RequestParamsBuilder {
        RequestParamsBuilder::default()
    }

    /// MD5 digest of the device id.
    #[must_use]
    pub fn md5_udid(&self) -> &str {
        &self.md5_udid
    }

    /// SHA-1 digest of the device id.
    #[must_use]
    pub fn sha1_udid(&self) -> &str {
        &self.sha1_udid
    }

    /// Whether the user opted out of tracking.
    #[must_use]
    pub const fn opt_out(&self) -> bool {
        self.opt_out
    }

    /// Device manufacturer.
    #[must_use]
    pub fn device_make(&self) -> &str {
        &self.device_make
    }

    /// Device model.
    #[must_use]
    pub fn device_model(&self) -> &str {
        &self.device_model
    }

    /// Mobile carrier name.
    #[must_use]
    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    /// Whether this is the first launch of the host application.
    #[must_use]
    pub const fn first_launch(&self) -> bool {
        self.first_launch
    }

    /// Last known location, if any.
    #[must_use]
    pub const fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    /// User-agent string of the host.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Orientation at request time.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Render as ordered query pairs. Empty string attributes are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut out: Vec<(&'static str, String)> = Vec::with_capacity(10);
        let mut push = |k: &'static str, v: &str| {
            if !v.is_empty() {
                out.push((k, v.to_string()));
            }
        };
        push("md5udid", &self.md5_udid);
        push("sha1udid", &self.sha1_udid);
        push("devmake", &self.device_make);
        push("devmodel", &self.device_model);
        push("carrier", &self.carrier);
        push("ua", &self.user_agent);
        out.push(("optout", self.opt_out.to_string()));
        out.push(("firstlaunch", self.first_launch.to_string()));
        if let Some(loc) = self.location {
            out.push(("loc", format!("{},{}", loc.latitude, loc.longitude)));
        }
        out.push(("orientation", self.orientation.as_str().to_string()));
        out
    }
}

/// Builder for [`RequestParams`].
#[derive(Debug, Clone, Default)]
pub struct RequestParamsBuilder {
    md5_udid: String,
    sha1_udid: String,
    opt_out: bool,
    device_make: String,
    device_model: String,
    carrier: String,
    first_launch: bool,
    location: Option<GeoPoint>,
    user_agent: String,
    orientation: Orientation,
}

impl RequestParamsBuilder {
    /// Set both device-id digests.
    #[must_use]
    pub fn device_id_hashes(mut self, md5: impl Into<String>, sha1: impl Into<String>) -> Self {
        self.md5_udid = md5.into();
        self.sha1_udid = sha1.into();
        self
    }

    /// Set the tracking opt-out flag.
    #[must_use]
    pub const fn opt_out(mut self, yes: bool) -> Self {
        self.opt_out = yes;
        self
    }

    /// Set device make and model.
    #[must_use]
    pub fn device(mut self, make: impl Into<String>, model: impl Into<String>) -> Self {
        self.device_make = make.into();
        self.device_model = model.into();
        self
    }

    /// Set the carrier name.
    #[must_use]
    pub fn carrier(mut self, carrier: impl Into<String>) -> Self {
        self.carrier = carrier.into();
        self
    }

    /// Set the first-launch flag.
    #[must_use]
    pub const fn first_launch(mut self, yes: bool) -> Self {
        self.first_launch = yes;
        self
    }

    /// Set the last known location.
    #[must_use]
    pub const fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some(GeoPoint {
            latitude,
            longitude,
        });
        self
    }

    /// Set the user-agent string.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Set the orientation.
    #[must_use]
    pub const fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Freeze the bundle.
    #[must_use]
    pub fn build(self) -> RequestParams {
        RequestParams {
            md5_udid: self.md5_udid,
            sha1_udid: self.sha1_udid,
            opt_out: self.opt_out,
            device_make: self.device_make,
            device_model: self.device_model,
            carrier: self.carrier,
            first_launch: self.first_launch,
            location: self.location,
            user_agent: self.user_agent,
            orientation: self.orientation,
        }
    }
}
