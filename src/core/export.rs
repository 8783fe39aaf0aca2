//! # Exports
//!
//! The symbols sapf is expected to export, with their one true signature:
//!
//! | Symbol  | Signature                          |
//! |---------|------------------------------------|
//! | `add`   | `fn(i32) -> i32`                   |
//! | `init`  | `fn(*const c_char)`                |
//! | `reset` | `fn() -> StepResult`               |
//! | `step`  | `fn(i64) -> StepResult`            |
//! | `graph` | `fn() -> *const c_char`            |

use std::fmt;

use serde::{Deserialize, Serialize};

/// A symbol exported by the sapf library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Export {
    Add,
    Init,
    Reset,
    Step,
    Graph,
}

impl Export {
    /// Every known export
    pub const ALL: [Export; 5] = [
        Export::Add,
        Export::Init,
        Export::Reset,
        Export::Step,
        Export::Graph,
    ];

    /// Exports needed to drive an episode
    pub const ENVIRONMENT: [Export; 4] = [
        Export::Init,
        Export::Reset,
        Export::Step,
        Export::Graph,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Export::Add => "add",
            Export::Init => "init",
            Export::Reset => "reset",
            Export::Step => "step",
            Export::Graph => "graph",
        }
    }

    /// NUL-terminated symbol name for dynamic lookup
    pub fn symbol(&self) -> &'static [u8] {
        match self {
            Export::Add => b"add\0",
            Export::Init => b"init\0",
            Export::Reset => b"reset\0",
            Export::Step => b"step\0",
            Export::Graph => b"graph\0",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Export::ALL.into_iter().find(|e| e.name() == name)
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
