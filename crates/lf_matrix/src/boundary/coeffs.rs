// crates/lf_matrix/src/boundary/coeffs.rs

//! 边界系数存储
//!
//! 每个边界片两组与边界面一一对应的系数：
//!
//! - `internalCoeffs`: 乘以面相邻单元值，折叠进对角元
//! - `boundaryCoeffs`: 显式部分，折叠进右端项；耦合边界片上乘以另一侧的值
//!
//! 两组系数在每次组装时由边界条件重新给出，从不持久化。

use lf_foundation::FieldValue;
use lf_mesh::BoundaryMesh;

use crate::error::{MatrixError, MatrixResult};
use crate::ldu::InterfaceCoeffs;

/// 边界系数存储
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCoeffs<T> {
    internal: Vec<Vec<T>>,
    boundary: Vec<Vec<T>>,
}

impl<T: FieldValue> BoundaryCoeffs<T> {
    /// 按边界片大小创建全零系数
    pub fn new(boundary: &BoundaryMesh) -> Self {
        let zeros: Vec<Vec<T>> = boundary.iter().map(|p| vec![T::zero(); p.size()]).collect();
        Self {
            internal: zeros.clone(),
            boundary: zeros,
        }
    }

    /// 边界片数
    #[inline]
    pub fn n_patches(&self) -> usize {
        self.internal.len()
    }

    /// 全部 `internalCoeffs`
    #[inline]
    pub fn internal_coeffs(&self) -> &[Vec<T>] {
        &self.internal
    }

    /// 全部 `boundaryCoeffs`
    #[inline]
    pub fn boundary_coeffs(&self) -> &[Vec<T>] {
        &self.boundary
    }

    /// 边界片的 `internalCoeffs`
    #[inline]
    pub fn internal(&self, patch: usize) -> &[T] {
        &self.internal[patch]
    }

    /// 边界片的 `boundaryCoeffs`
    #[inline]
    pub fn boundary(&self, patch: usize) -> &[T] {
        &self.boundary[patch]
    }

    /// 可写的 `internalCoeffs`
    #[inline]
    pub fn internal_mut(&mut self, patch: usize) -> &mut [T] {
        &mut self.internal[patch]
    }

    /// 可写的 `boundaryCoeffs`
    #[inline]
    pub fn boundary_mut(&mut self, patch: usize) -> &mut [T] {
        &mut self.boundary[patch]
    }

    /// 替换边界片的两组系数
    pub fn set_patch(&mut self, patch: usize, internal: Vec<T>, boundary: Vec<T>) -> MatrixResult<()> {
        MatrixError::check_len("internalCoeffs", self.internal[patch].len(), internal.len())?;
        MatrixError::check_len("boundaryCoeffs", self.boundary[patch].len(), boundary.len())?;
        self.internal[patch] = internal;
        self.boundary[patch] = boundary;
        Ok(())
    }

    fn check_same(&self, other: &Self) -> MatrixResult<()> {
        MatrixError::check_len("边界片数", self.n_patches(), other.n_patches())?;
        for (a, b) in self.internal.iter().zip(&other.internal) {
            MatrixError::check_len("边界片系数", a.len(), b.len())?;
        }
        Ok(())
    }

    fn zip_apply(&mut self, other: &Self, op: impl Fn(&mut T, T)) -> MatrixResult<()> {
        self.check_same(other)?;
        for (a, b) in self.internal.iter_mut().zip(&other.internal) {
            a.iter_mut().zip(b).for_each(|(x, &y)| op(x, y));
        }
        for (a, b) in self.boundary.iter_mut().zip(&other.boundary) {
            a.iter_mut().zip(b).for_each(|(x, &y)| op(x, y));
        }
        Ok(())
    }

    /// `self += other`
    pub fn add_assign(&mut self, other: &Self) -> MatrixResult<()> {
        self.zip_apply(other, |x, y| *x += y)
    }

    /// `self -= other`
    pub fn sub_assign(&mut self, other: &Self) -> MatrixResult<()> {
        self.zip_apply(other, |x, y| *x -= y)
    }

    /// 所有系数乘以常数
    pub fn scale(&mut self, s: f64) {
        for v in self.internal.iter_mut().chain(self.boundary.iter_mut()).flatten() {
            *v = *v * s;
        }
    }

    /// 取负
    pub fn negate(&mut self) {
        self.scale(-1.0);
    }

    /// `diag[fc] += internalCoeffs[cmpt]`，包括耦合边界片
    pub fn add_boundary_diag(&self, diag: &mut [f64], cmpt: usize, boundary: &BoundaryMesh) {
        for (patch, ic) in boundary.iter().zip(&self.internal) {
            for (&fc, v) in patch.face_cells.iter().zip(ic) {
                diag[fc] += v.component(cmpt);
            }
        }
    }

    /// `diag[fc] += cmptAv(internalCoeffs)`，包括耦合边界片
    pub fn add_cmpt_av_boundary_diag(&self, diag: &mut [f64], boundary: &BoundaryMesh) {
        for (patch, ic) in boundary.iter().zip(&self.internal) {
            for (&fc, v) in patch.face_cells.iter().zip(ic) {
                diag[fc] += v.cmpt_av();
            }
        }
    }

    /// 把 `boundaryCoeffs` 加到右端项
    ///
    /// 非耦合边界片直接相加；耦合边界片仅在 `couples` 为真时加上
    /// `boundaryCoeffs ⊙ 另一侧的值`，`neighbours` 按边界片索引给出。
    pub fn add_boundary_source(
        &self,
        source: &mut [T],
        boundary: &BoundaryMesh,
        neighbours: &[Option<Vec<T>>],
        couples: bool,
    ) -> MatrixResult<()> {
        for (patch, bc) in boundary.iter().zip(&self.boundary) {
            if !patch.coupled() {
                for (&fc, &v) in patch.face_cells.iter().zip(bc) {
                    source[fc] += v;
                }
            }
        }
        if couples {
            self.add_coupled_source(source, boundary, neighbours)?;
        }
        Ok(())
    }

    /// 只加耦合边界片的 `boundaryCoeffs ⊙ 另一侧的值`
    pub fn add_coupled_source(
        &self,
        source: &mut [T],
        boundary: &BoundaryMesh,
        neighbours: &[Option<Vec<T>>],
    ) -> MatrixResult<()> {
        for (i, (patch, bc)) in boundary.iter().zip(&self.boundary).enumerate() {
            if !patch.coupled() {
                continue;
            }
            let nbr = neighbours
                .get(i)
                .and_then(Option::as_ref)
                .ok_or_else(|| MatrixError::patch_field(&patch.name, "缺少耦合边界另一侧的值"))?;
            MatrixError::check_len("耦合边界另一侧的值", patch.size(), nbr.len())?;
            for ((&fc, &v), &pn) in patch.face_cells.iter().zip(bc).zip(nbr) {
                source[fc] += v.cmpt_multiply(pn);
            }
        }
        Ok(())
    }

    fn interface_coeffs(coeffs: &[Vec<T>], cmpt: usize, boundary: &BoundaryMesh) -> InterfaceCoeffs {
        boundary
            .iter()
            .zip(coeffs)
            .map(|(patch, c)| {
                patch
                    .coupled()
                    .then(|| c.iter().map(|v| v.component(cmpt)).collect())
            })
            .collect()
    }

    /// 分量 `cmpt` 的耦合界面 `bouCoeffs`（用于 `A·x`）
    pub fn interface_bou_coeffs(&self, cmpt: usize, boundary: &BoundaryMesh) -> InterfaceCoeffs {
        Self::interface_coeffs(&self.boundary, cmpt, boundary)
    }

    /// 分量 `cmpt` 的耦合界面 `intCoeffs`（用于 `Aᵀ·x`）
    pub fn interface_int_coeffs(&self, cmpt: usize, boundary: &BoundaryMesh) -> InterfaceCoeffs {
        Self::interface_coeffs(&self.internal, cmpt, boundary)
    }

    /// 清零单元所在边界面的两组系数
    pub fn zero_cell(&mut self, cell: usize, boundary: &BoundaryMesh) {
        for (i, patch) in boundary.iter().enumerate() {
            for (j, &fc) in patch.face_cells.iter().enumerate() {
                if fc == cell {
                    self.internal[i][j] = T::zero();
                    self.boundary[i][j] = T::zero();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use lf_mesh::generation::LineMeshGenerator;

    #[test]
    fn test_fold_non_coupled() {
        let mesh = LineMeshGenerator::new(3, 3.0).build().unwrap();
        let mut bc = BoundaryCoeffs::<f64>::new(mesh.boundary());
        bc.set_patch(0, vec![2.0], vec![4.0]).unwrap();
        bc.set_patch(1, vec![1.0], vec![-1.0]).unwrap();
        let mut diag = vec![0.0; 3];
        bc.add_cmpt_av_boundary_diag(&mut diag, mesh.boundary());
        assert_eq!(diag, vec![2.0, 0.0, 1.0]);
        let mut source = vec![0.0; 3];
        bc.add_boundary_source(&mut source, mesh.boundary(), &[], false).unwrap();
        assert_eq!(source, vec![4.0, 0.0, -1.0]);
        assert!(bc.interface_bou_coeffs(0, mesh.boundary()).iter().all(Option::is_none));
        assert!(bc.set_patch(0, vec![1.0, 2.0], vec![0.0]).is_err());
    }

    #[test]
    fn test_coupled_source_only_when_coupling() {
        let mesh = LineMeshGenerator::new(3, 3.0).cyclic(true).build().unwrap();
        let mut bc = BoundaryCoeffs::<f64>::new(mesh.boundary());
        bc.set_patch(0, vec![-1.0], vec![2.0]).unwrap();
        bc.set_patch(1, vec![-1.0], vec![2.0]).unwrap();
        let mut source = vec![0.0; 3];
        bc.add_boundary_source(&mut source, mesh.boundary(), &[], false).unwrap();
        assert_eq!(source, vec![0.0; 3]);
        assert!(bc.add_boundary_source(&mut source, mesh.boundary(), &[], true).is_err());
        let nbr = vec![Some(vec![5.0]), Some(vec![3.0])];
        bc.add_boundary_source(&mut source, mesh.boundary(), &nbr, true).unwrap();
        assert_eq!(source, vec![10.0, 0.0, 6.0]);
        let bou = bc.interface_bou_coeffs(0, mesh.boundary());
        assert_eq!(bou, vec![Some(vec![2.0]), Some(vec![2.0])]);
    }

    #[test]
    fn test_vector_components_and_algebra() {
        let mesh = LineMeshGenerator::new(2, 2.0).build().unwrap();
        let mut a = BoundaryCoeffs::<DVec3>::new(mesh.boundary());
        a.set_patch(0, vec![DVec3::new(1.0, 2.0, 3.0)], vec![DVec3::ONE]).unwrap();
        let mut diag = vec![0.0; 2];
        a.add_boundary_diag(&mut diag, 2, mesh.boundary());
        assert_eq!(diag, vec![3.0, 0.0]);
        let mut diag = vec![0.0; 2];
        a.add_cmpt_av_boundary_diag(&mut diag, mesh.boundary());
        assert_eq!(diag, vec![2.0, 0.0]);

        let b = a.clone();
        a.add_assign(&b).unwrap();
        assert_eq!(a.internal(0)[0], DVec3::new(2.0, 4.0, 6.0));
        a.sub_assign(&b).unwrap();
        a.negate();
        assert_eq!(a.boundary(0)[0], -DVec3::ONE);
        a.zero_cell(0, mesh.boundary());
        assert_eq!(a.internal(0)[0], DVec3::ZERO);
    }
}
