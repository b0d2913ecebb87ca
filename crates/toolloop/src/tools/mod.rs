//! A set of built-in tools that models can use.

mod power;

pub use power::{PowerTool, PowerToolParameters};
