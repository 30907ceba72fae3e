// crates/lf_config/src/lib.rs

//! LduFlow 配置层
//!
//! 求解控制字典的类型化表示。配置在外层循环开始时解析一次，
//! 然后显式传入 `solve`，不存在按场名的全局查找。
//!
//! # 模块
//!
//! - [`solver_controls`]: 单个场的线性求解器控制参数
//! - [`fv_solution`]: 求解字典（求解器表、松弛因子、算法控制块）
//!
//! # 使用示例
//!
//! ```rust
//! use lf_config::FvSolution;
//!
//! let json = r#"{
//!     "solvers": {
//!         "p": { "solver": "PCG", "preconditioner": "DIC", "tolerance": 1e-8, "relTol": 0.01 },
//!         "(U|k)": { "solver": "smoothSolver", "smoother": "symGaussSeidel" }
//!     },
//!     "relaxationFactors": { "fields": { "p": 0.3 }, "equations": { "U": 0.7 } },
//!     "SIMPLE": { "nNonOrthogonalCorrectors": 1, "pRefCell": 0, "pRefValue": 0.0 }
//! }"#;
//! let sol = FvSolution::from_json_str(json).unwrap();
//! assert_eq!(sol.solver_controls("k").unwrap().solver, "smoothSolver");
//! assert_eq!(sol.relaxation_factors.equation_factor("U"), Some(0.7));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fv_solution;
pub mod solver_controls;

/// 层级标识
pub const LAYER: u8 = 3;

pub use error::{ConfigError, ConfigResult};
pub use fv_solution::{AlgorithmControls, FvSolution, RelaxationFactors};
pub use solver_controls::SolverControls;
