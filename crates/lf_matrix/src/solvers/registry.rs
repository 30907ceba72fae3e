// crates/lf_matrix/src/solvers/registry.rs

//! 求解器注册表
//!
//! 两张显式的名称表，按矩阵对称性区分。对角矩阵不查表，总是使用
//! [`DiagonalSolver`]。用户可以在运行期注册新的求解器构造函数。

use std::collections::BTreeMap;
use std::fmt;

use lf_config::SolverControls;

use super::{DiagonalSolver, GamgSolver, LduSolver, PbicgSolver, PbicgStabSolver, PcgSolver, SmoothSolver};
use crate::error::{MatrixError, MatrixResult};
use crate::ldu::LduMatrix;

/// 求解器构造函数：(场名, 控制参数) -> 求解器
pub type SolverConstructor = fn(&str, &SolverControls) -> Box<dyn LduSolver>;

/// 求解器注册表
#[derive(Clone)]
pub struct SolverRegistry {
    symmetric: BTreeMap<String, SolverConstructor>,
    asymmetric: BTreeMap<String, SolverConstructor>,
}

impl fmt::Debug for SolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverRegistry")
            .field("symmetric", &self.names(true))
            .field("asymmetric", &self.names(false))
            .finish()
    }
}

impl Default for SolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverRegistry {
    /// 含全部内置求解器的注册表
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_symmetric("PCG", PcgSolver::boxed);
        registry.register_symmetric("PBiCGStab", PbicgStabSolver::boxed);
        registry.register_symmetric("smoothSolver", SmoothSolver::boxed);
        registry.register_symmetric("GAMG", GamgSolver::boxed);
        registry.register_asymmetric("PBiCG", PbicgSolver::boxed);
        registry.register_asymmetric("PBiCGStab", PbicgStabSolver::boxed);
        registry.register_asymmetric("smoothSolver", SmoothSolver::boxed);
        registry.register_asymmetric("GAMG", GamgSolver::boxed);
        registry
    }

    /// 空注册表
    pub fn empty() -> Self {
        Self {
            symmetric: BTreeMap::new(),
            asymmetric: BTreeMap::new(),
        }
    }

    /// 注册对称矩阵求解器
    pub fn register_symmetric(&mut self, name: impl Into<String>, ctor: SolverConstructor) {
        self.symmetric.insert(name.into(), ctor);
    }

    /// 注册非对称矩阵求解器
    pub fn register_asymmetric(&mut self, name: impl Into<String>, ctor: SolverConstructor) {
        self.asymmetric.insert(name.into(), ctor);
    }

    /// 某一对称性类别下的全部名称
    pub fn names(&self, symmetric: bool) -> Vec<&str> {
        let table = if symmetric { &self.symmetric } else { &self.asymmetric };
        table.keys().map(String::as_str).collect()
    }

    /// 按矩阵对称性选择求解器
    pub fn select(
        &self,
        field_name: &str,
        controls: &SolverControls,
        matrix: &LduMatrix,
    ) -> MatrixResult<Box<dyn LduSolver>> {
        if matrix.diagonal() {
            return Ok(Box::new(DiagonalSolver::new(field_name, controls)));
        }
        let symmetric = matrix.symmetric();
        let table = if symmetric { &self.symmetric } else { &self.asymmetric };
        match table.get(controls.solver.as_str()) {
            Some(ctor) => Ok(ctor(field_name, controls)),
            None => Err(MatrixError::UnsupportedSolver {
                name: controls.solver.clone(),
                symmetry: if symmetric { "对称" } else { "非对称" },
                valid: MatrixError::list(&self.names(symmetric)),
            }),
        }
    }
}
