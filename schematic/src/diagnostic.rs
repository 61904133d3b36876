use crate::net::NetId;
use itertools::Itertools;
use log::{error, warn};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Severity {
    Warning,
    Error,
}

/// Something the user should look at.  None of these stop a pass; the
/// engine recovers locally and carries on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    /// Connected nets carry names that cannot both be right
    NameConflict {
        first: String,
        second: String,
        nets: Vec<NetId>,
    },
    /// A symbol pin with no net on it; `assigned` is the placeholder name
    UnconnectedPin {
        instance: String,
        pin: String,
        assigned: String,
    },
    /// A `pinOrder` entry that does not name a pin of the symbol
    UnknownPinInOrder { instance: String, pin: String },
}

impl Diagnostic {
    /// Build and log a conflict
    pub fn name_conflict<A: Into<String>, B: Into<String>>(first: A, second: B, nets: Vec<NetId>) -> Self {
        let diag = Diagnostic::NameConflict {
            first: first.into(),
            second: second.into(),
            nets,
        };
        diag.log();
        diag
    }

    pub fn unconnected_pin(instance: &str, pin: &str, assigned: &str) -> Self {
        let diag = Diagnostic::UnconnectedPin {
            instance: instance.to_owned(),
            pin: pin.to_owned(),
            assigned: assigned.to_owned(),
        };
        diag.log();
        diag
    }

    pub fn unknown_pin_in_order(instance: &str, pin: &str) -> Self {
        let diag = Diagnostic::UnknownPinInOrder {
            instance: instance.to_owned(),
            pin: pin.to_owned(),
        };
        diag.log();
        diag
    }

    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::NameConflict { .. } => Severity::Error,
            Diagnostic::UnconnectedPin { .. } | Diagnostic::UnknownPinInOrder { .. } => Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    fn log(&self) {
        match self.severity() {
            Severity::Error => error!("{}", self),
            Severity::Warning => warn!("{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::NameConflict { first, second, nets } => write!(
                f,
                "Net name conflict: `{}` and `{}` are connected (nets {})",
                first,
                second,
                nets.iter().join(", ")
            ),
            Diagnostic::UnconnectedPin {
                instance,
                pin,
                assigned,
            } => write!(
                f,
                "Pin `{}` of `{}` is not connected to any net; using `{}`",
                pin, instance, assigned
            ),
            Diagnostic::UnknownPinInOrder { instance, pin } => write!(
                f,
                "pinOrder of `{}` names `{}`, which is not one of its pins",
                instance, pin
            ),
        }
    }
}
