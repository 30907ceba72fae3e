// crates/lf_matrix/src/preconditioners/none.rs

//! 恒等预条件器（无预条件）

use super::LduPreconditioner;

/// 恒等预条件器
///
/// M = I，即 z = r
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreconditioner;

impl LduPreconditioner for NoPreconditioner {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        z.copy_from_slice(r);
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
