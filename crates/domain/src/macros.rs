//! Macro for implementing Display and FromStr for state enums
//!
//! Keeps the wire spelling of a state (`valid_item`, `unhealthy`, ...) in one
//! place so logs, console input, and serde agree.
//!
//! # Example
//!
//! ```rust
//! use rvm_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum DoorState {
//!     Closed,
//!     Open,
//! }
//!
//! impl_domain_status_conversions!(DoorState {
//!     Closed => "closed",
//!     Open => "open",
//! });
//!
//! assert_eq!(DoorState::Open.to_string(), "open");
//! assert_eq!("CLOSED".parse::<DoorState>(), Ok(DoorState::Closed));
//! ```

/// Implements Display and FromStr traits for state enums
///
/// Parsing is case-insensitive; display always emits the given spelling.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum LampState {
        Off,
        Blinking,
        SteadyOn,
    }

    impl_domain_status_conversions!(LampState {
        Off => "off",
        Blinking => "blinking",
        SteadyOn => "steady_on",
    });

    #[test]
    fn display_uses_wire_spelling() {
        assert_eq!(LampState::Off.to_string(), "off");
        assert_eq!(LampState::SteadyOn.to_string(), "steady_on");
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!(LampState::from_str("blinking").unwrap(), LampState::Blinking);
        assert_eq!(LampState::from_str("STEADY_ON").unwrap(), LampState::SteadyOn);
        assert_eq!(LampState::from_str("Off").unwrap(), LampState::Off);
    }

    #[test]
    fn unknown_value_names_the_enum() {
        let err = LampState::from_str("strobe").unwrap_err();
        assert_eq!(err, "Invalid LampState: strobe");
    }
}
