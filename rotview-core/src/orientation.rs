//! Quaternion component ordering
//!
//! Callers hand quaternions over as plain `[f32; 4]` arrays in either
//! `xyzw` or `wxyz` order. Backends always receive `xyzw` (real part last).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A quaternion as four raw components
pub type Quat = [f32; 4];

/// Function turning caller-ordered components into backend order
pub type Reorder = fn(Quat) -> Quat;

/// The identity orientation in backend order
pub const IDENTITY: Quat = [0.0, 0.0, 0.0, 1.0];

/// Component order of incoming quaternions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AxisOrder {
    /// Real part last, as the backend expects
    #[default]
    Xyzw,
    /// Real part first
    Wxyz,
}

impl AxisOrder {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisOrder::Xyzw => "xyzw",
            AxisOrder::Wxyz => "wxyz",
        }
    }

    /// Pick the reorder function for this order.
    ///
    /// Resolve it once and keep the function pointer; the per-update path
    /// then never branches on the order again.
    pub fn reorder_fn(self) -> Reorder {
        match self {
            AxisOrder::Xyzw => keep_order,
            AxisOrder::Wxyz => wxyz_to_xyzw,
        }
    }

    /// Convert a single quaternion to backend order
    pub fn to_backend(self, quaternion: Quat) -> Quat {
        (self.reorder_fn())(quaternion)
    }
}

fn keep_order(quaternion: Quat) -> Quat {
    quaternion
}

fn wxyz_to_xyzw([w, x, y, z]: Quat) -> Quat {
    [x, y, z, w]
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxisOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xyzw" => Ok(AxisOrder::Xyzw),
            "wxyz" => Ok(AxisOrder::Wxyz),
            other => Err(Error::InvalidConfiguration(format!(
                "unsupported axis order '{}', expected 'xyzw' or 'wxyz'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for AxisOrder {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AxisOrder> for String {
    fn from(order: AxisOrder) -> Self {
        order.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_supported_orders() {
        assert_eq!("xyzw".parse::<AxisOrder>().unwrap(), AxisOrder::Xyzw);
        assert_eq!("wxyz".parse::<AxisOrder>().unwrap(), AxisOrder::Wxyz);
    }

    #[test]
    fn rejects_other_orders() {
        for bad in ["", "zyxw", "XYZW", "wxy", "xyzww"] {
            let err = bad.parse::<AxisOrder>().unwrap_err();
            assert!(matches!(err, Error::InvalidConfiguration(_)), "{bad}");
        }
    }

    #[test]
    fn wxyz_moves_real_part_last() {
        let reorder = AxisOrder::Wxyz.reorder_fn();
        assert_eq!(reorder([0.5, 0.1, 0.2, 0.3]), [0.1, 0.2, 0.3, 0.5]);
    }

    #[test]
    fn xyzw_is_passed_through() {
        let q = [0.1, -0.2, 0.3, 0.9];
        assert_eq!(AxisOrder::Xyzw.to_backend(q), q);
    }

    #[test]
    fn default_is_xyzw() {
        assert_eq!(AxisOrder::default(), AxisOrder::Xyzw);
        assert_eq!(AxisOrder::default().to_string(), "xyzw");
    }
}
