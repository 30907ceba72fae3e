// apps/lf_cli/src/commands/mod.rs

//! 子命令

pub mod solve;
pub mod solvers;
pub mod validate;
