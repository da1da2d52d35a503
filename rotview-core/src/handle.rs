//! Opaque handles handed out by visualization backends

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle!(
    /// A live connection to a backend
    ClientId,
    "client"
);

handle!(
    /// A visual object loaded into a backend scene
    ObjectId,
    "object"
);

handle!(
    /// A debug text item drawn by a backend
    DebugItemId,
    "debug-item"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_display_with_their_kind() {
        assert_eq!(ClientId(3).to_string(), "client#3");
        assert_eq!(ObjectId(0).to_string(), "object#0");
        assert_eq!(DebugItemId(12).to_string(), "debug-item#12");
    }
}
