//! Computed properties, whose values are produced from the values of other properties.
//!
//! Every computed property caches its value and recomputes it in three steps:
//! 1. run its function, holding no lock;
//! 2. under its own lock, compare the result with the cached value and store it if it differs;
//! 3. with the lock released, notify listeners if the value changed.
//!
//! Recomputation is triggered synchronously by the change events of the properties it depends
//! on. The kinds differ only in how that dependency set is chosen:
//!
//! | Kind                               | Dependencies                                            |
//! |------------------------------------|---------------------------------------------------------|
//! | [`DerivedProperty`]                | a fixed list, given at construction                     |
//! | [`ConnectableProperty`]            | zero or one, rebound with `connect`/`disconnect`        |
//! | [`ManuallyRecalculatedProperty`]   | none; recomputed only by `recalculate`                  |
//! | [`MultiLevelProperty`]             | whatever the last evaluation read, rediscovered each time |
//! | [`TentativeProperty`]              | its parent, unless an override is in effect             |
//! | [`PassthroughProperty`]            | its parent                                              |

#[macro_use]
mod inner;
mod connectable;
mod dependencies;
mod derived;
mod manual;
mod multi_level;
mod passthrough;
mod tentative;

pub use connectable::*;
pub use dependencies::*;
pub use derived::*;
pub use manual::*;
pub use multi_level::*;
pub use passthrough::*;
pub use tentative::*;
