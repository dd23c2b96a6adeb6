//! Canvas events
//!
//! Emitted after each successful mutation so a front end can refresh.

use crate::query::Constant;

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    Instantiated {
        id: String,
        source: String,
    },
    Destroyed {
        id: String,
    },
    VariableAdded {
        id: String,
        variable: String,
    },
    ProjectionChanged {
        id: String,
        projections: Vec<String>,
    },
    PatternAdded {
        id: String,
    },
    VariableBound {
        id: String,
        variable: String,
        value: Option<Constant>,
    },
    /// `old_id` now lives on as `new_id`; `removed_id` was absorbed
    Joined {
        old_id: String,
        new_id: String,
        removed_id: String,
    },
}
