// crates/lf_decompose/src/reconstructor.rs

//! 场重构
//!
//! 分解的逆过程：把各 rank 的本地值按映射写回全局数组。每个全局单元和
//! 全局面必须恰好写入一次，否则返回 [`DecomposeError::Coverage`]。
//! 处理器面只取正向（owner 侧）的副本；周期面对被拆开时两侧都是正向，
//! 各自写回所在的全局周期边界片。

use lf_mesh::{GeoMesh, MeshError};

use crate::decomposition::ProcessorDomain;
use crate::error::{DecomposeError, DecomposeResult};
use crate::field_decomposer::DecomposedSurface;

/// 场重构器
#[derive(Debug)]
pub struct FieldReconstructor<'a> {
    mesh: &'a GeoMesh,
    domains: &'a [ProcessorDomain],
}

/// 带覆盖计数的全局数组
struct Coverage<T> {
    what: &'static str,
    values: Vec<Option<T>>,
    counts: Vec<usize>,
}

impl<T: Copy> Coverage<T> {
    fn new(what: &'static str, n: usize) -> Self {
        Self {
            what,
            values: vec![None; n],
            counts: vec![0; n],
        }
    }

    fn write(&mut self, index: usize, value: T) -> DecomposeResult<()> {
        let Some(count) = self.counts.get_mut(index) else {
            return Err(DecomposeError::Coverage {
                what: self.what,
                index,
                count: 0,
            });
        };
        *count += 1;
        self.values[index] = Some(value);
        Ok(())
    }

    fn finish(self) -> DecomposeResult<Vec<T>> {
        let what = self.what;
        self.values
            .into_iter()
            .zip(self.counts)
            .enumerate()
            .map(|(index, (v, count))| match (v, count) {
                (Some(v), 1) => Ok(v),
                _ => Err(DecomposeError::Coverage { what, index, count }),
            })
            .collect()
    }
}

impl<'a> FieldReconstructor<'a> {
    /// 创建重构器
    pub fn new(mesh: &'a GeoMesh, domains: &'a [ProcessorDomain]) -> Self {
        Self { mesh, domains }
    }

    fn check_parts<V>(&self, parts: &[V]) -> DecomposeResult<()> {
        DecomposeError::check_size("子域数", self.domains.len(), parts.len())
    }

    /// 重构单元值
    pub fn reconstruct_cells<T: Copy>(&self, parts: &[Vec<T>]) -> DecomposeResult<Vec<T>> {
        self.check_parts(parts)?;
        let mut out = Coverage::new("单元", self.mesh.n_cells());
        for (d, values) in self.domains.iter().zip(parts) {
            DecomposeError::check_size(&format!("rank {} 单元值", d.rank()), d.n_cells(), values.len())?;
            for (&g, &v) in d.cell_addressing().iter().zip(values) {
                out.write(g, v)?;
            }
        }
        out.finish()
    }

    /// 重构全局边界片上的值
    pub fn reconstruct_patch<T: Copy>(&self, patch: usize, parts: &[Vec<T>]) -> DecomposeResult<Vec<T>> {
        self.check_parts(parts)?;
        let global = self
            .mesh
            .boundary()
            .patch(patch)
            .ok_or_else(|| MeshError::patch(format!("#{}", patch), "边界片编号超出范围"))?;
        let start = global.start;
        let mut out = Coverage::new("边界面", global.size());
        for (d, values) in self.domains.iter().zip(parts) {
            let Some(local) = d.local_patch(patch) else {
                continue;
            };
            let lp = &d.boundary()[local];
            DecomposeError::check_size(&format!("rank {} 边界片 '{}'", d.rank(), lp.name), lp.size(), values.len())?;
            for (k, &v) in values.iter().enumerate() {
                let (g, _) = d.maps().global_face(lp.start + k);
                out.write(g - start, v)?;
            }
        }
        out.finish()
    }

    /// 重构面值
    pub fn reconstruct_surface<T: Copy>(&self, parts: &[DecomposedSurface<T>]) -> DecomposeResult<DecomposedSurface<T>> {
        self.check_parts(parts)?;
        let n_internal = self.mesh.n_internal_faces();
        let n_faces = n_internal + self.mesh.boundary().n_faces();
        let mut out = Coverage::new("面", n_faces);

        for (d, part) in self.domains.iter().zip(parts) {
            DecomposeError::check_size(&format!("rank {} 内部面值", d.rank()), d.n_internal_faces(), part.internal.len())?;
            DecomposeError::check_size(&format!("rank {} 边界片数", d.rank()), d.boundary().len(), part.boundary.len())?;
            for (p, values) in d.boundary().iter().zip(&part.boundary) {
                DecomposeError::check_size(&format!("rank {} 边界片 '{}'", d.rank(), p.name), p.size(), values.len())?;
            }
            let local_faces = part.internal.iter().enumerate().chain(
                d.boundary()
                    .iter()
                    .zip(&part.boundary)
                    .flat_map(|(p, values)| values.iter().enumerate().map(move |(k, v)| (p.start + k, v))),
            );
            for (f, &v) in local_faces {
                let (g, flipped) = d.maps().global_face(f);
                if !flipped {
                    out.write(g, v)?;
                }
            }
        }

        let mut all = out.finish()?;
        let boundary_values = all.split_off(n_internal);
        let mut boundary = Vec::with_capacity(self.mesh.boundary().len());
        let mut rest = boundary_values.as_slice();
        for p in self.mesh.boundary().iter() {
            let (head, tail) = rest.split_at(p.size());
            boundary.push(head.to_vec());
            rest = tail;
        }
        Ok(DecomposedSurface { internal: all, boundary })
    }
}
