//! Closed value domains.
//!
//! Every enum here has a canonical wire string.  Parsing an unknown string
//! with [`std::str::FromStr`] fails with
//! [`ValidationError::UnknownVariant`], so once a value exists in typed form
//! it is known to be one of the allowed members.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant,)+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ValidationError::UnknownVariant {
                        field: $field.to_string(),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

closed_enum! {
    /// AR runtime that produced an anchor.
    Platform, field = "platform" {
        ARKit => "ARKit",
        ARCore => "ARCore",
        WebXR => "WebXR",
        /// Hand-placed by an operator.
        Manual => "Manual",
    }
}

closed_enum! {
    /// Where an anchor is in its review lifecycle.
    ValidationStatus, field = "validation_status" {
        Pending => "pending",
        Validated => "validated",
        Rejected => "rejected",
        Expired => "expired",
    }
}

closed_enum! {
    Difficulty, field = "difficulty" {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
}

closed_enum! {
    /// What an AR navigation step asks the user to do.
    InstructionType, field = "type" {
        Move => "move",
        Turn => "turn",
        Stop => "stop",
        Wait => "wait",
        Start => "start",
        Arrival => "arrival",
    }
}

closed_enum! {
    Priority, field = "priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

closed_enum! {
    /// Overlay primitive rendered for an instruction.
    VisualizationType, field = "visualization.type" {
        Arrow => "arrow",
        Circle => "circle",
        Plane => "plane",
        Object => "object",
        Text => "text",
        Icon => "icon",
    }
}

closed_enum! {
    Animation, field = "animation" {
        None => "none",
        Pulse => "pulse",
        Rotate => "rotate",
        Fade => "fade",
        Bounce => "bounce",
        Shake => "shake",
    }
}

closed_enum! {
    /// Device thermal pressure reported at the end of a session.
    ThermalState, field = "thermal_state" {
        Normal => "normal",
        Slight => "slight",
        Intermediate => "intermediate",
        Critical => "critical",
    }
}

impl Default for ValidationStatus {
    fn default() -> Self {
        Self::Pending
    }
}
