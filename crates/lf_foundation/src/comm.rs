// crates/lf_foundation/src/comm.rs

//! 进程间通信抽象
//!
//! 求解核心本身是单线程的；跨进程并行通过显式的点对点消息传递完成：
//! 处理器边界在每次矩阵-向量乘前交换界面单元值，全局归约用于残差范数。
//!
//! - [`SerialComm`]: 单进程实现，所有归约为恒等操作
//! - [`ThreadComm`]: 进程内多 rank 实现，每个 rank 一个线程，
//!   每对 rank 之间一条 FIFO 通道
//!
//! # 顺序约束
//!
//! 所有 rank 必须以相同顺序调用归约与交换（SPMD），否则会死锁。
//! 发送是非阻塞的，接收是阻塞的。

use std::fmt::Debug;
use std::sync::mpsc::{channel, Receiver, Sender};

use parking_lot::Mutex;

use crate::error::{LfError, LfResult};

/// 通信器 trait
pub trait Communicator: Debug + Send + Sync {
    /// 本进程号
    fn rank(&self) -> usize;

    /// 进程总数
    fn n_procs(&self) -> usize;

    /// 是否并行运行
    fn parallel(&self) -> bool {
        self.n_procs() > 1
    }

    /// 发送数据到目标 rank（非阻塞）
    fn send(&self, to: usize, data: Vec<f64>) -> LfResult<()>;

    /// 从源 rank 接收数据（阻塞）
    fn recv(&self, from: usize) -> LfResult<Vec<f64>>;

    /// 全局求和
    fn all_reduce_sum(&self, value: f64) -> LfResult<f64> {
        Ok(self.all_gather(value)?.into_iter().sum())
    }

    /// 全局最大值
    fn all_reduce_max(&self, value: f64) -> LfResult<f64> {
        Ok(self
            .all_gather(value)?
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max))
    }

    /// 全局逻辑与
    fn all_reduce_and(&self, value: bool) -> LfResult<bool> {
        let flag = if value { 1.0 } else { 0.0 };
        Ok(self.all_gather(flag)?.into_iter().all(|v| v > 0.5))
    }

    /// 收集所有 rank 的值，按 rank 顺序返回
    ///
    /// 各 rank 得到相同序列，因此归约结果逐位一致。
    fn all_gather(&self, value: f64) -> LfResult<Vec<f64>> {
        let n = self.n_procs();
        let me = self.rank();
        for to in (0..n).filter(|&r| r != me) {
            self.send(to, vec![value])?;
        }
        let mut gathered = Vec::with_capacity(n);
        for from in 0..n {
            if from == me {
                gathered.push(value);
            } else {
                let data = self.recv(from)?;
                let v = data
                    .first()
                    .copied()
                    .ok_or_else(|| LfError::communication(me, "归约消息为空"))?;
                gathered.push(v);
            }
        }
        Ok(gathered)
    }
}

/// 单进程通信器
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialComm;

impl SerialComm {
    /// 创建单进程通信器
    pub fn new() -> Self {
        Self
    }
}

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn n_procs(&self) -> usize {
        1
    }

    fn send(&self, to: usize, _data: Vec<f64>) -> LfResult<()> {
        Err(LfError::communication(0, format!("串行运行时无法发送到 rank {}", to)))
    }

    fn recv(&self, from: usize) -> LfResult<Vec<f64>> {
        Err(LfError::communication(0, format!("串行运行时无法从 rank {} 接收", from)))
    }

    fn all_reduce_sum(&self, value: f64) -> LfResult<f64> {
        Ok(value)
    }

    fn all_reduce_max(&self, value: f64) -> LfResult<f64> {
        Ok(value)
    }

    fn all_reduce_and(&self, value: bool) -> LfResult<bool> {
        Ok(value)
    }

    fn all_gather(&self, value: f64) -> LfResult<Vec<f64>> {
        Ok(vec![value])
    }
}

/// 进程内多 rank 通信器
///
/// 通过 [`ThreadComm::create`] 一次性创建全部 rank 的端点，
/// 然后把每个端点移动到各自的线程中。
#[derive(Debug)]
pub struct ThreadComm {
    rank: usize,
    n_procs: usize,
    /// senders[to]: 本 rank -> to
    senders: Vec<Option<Mutex<Sender<Vec<f64>>>>>,
    /// receivers[from]: from -> 本 rank
    receivers: Vec<Option<Mutex<Receiver<Vec<f64>>>>>,
}

impl ThreadComm {
    /// 创建 `n_procs` 个互联的通信端点，下标即 rank
    pub fn create(n_procs: usize) -> Vec<ThreadComm> {
        let mut senders: Vec<Vec<Option<Mutex<Sender<Vec<f64>>>>>> = (0..n_procs)
            .map(|_| (0..n_procs).map(|_| None).collect())
            .collect();
        let mut receivers: Vec<Vec<Option<Mutex<Receiver<Vec<f64>>>>>> = (0..n_procs)
            .map(|_| (0..n_procs).map(|_| None).collect())
            .collect();

        for from in 0..n_procs {
            for to in 0..n_procs {
                if from == to {
                    continue;
                }
                let (tx, rx) = channel();
                senders[from][to] = Some(Mutex::new(tx));
                receivers[to][from] = Some(Mutex::new(rx));
            }
        }

        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (senders, receivers))| ThreadComm {
                rank,
                n_procs,
                senders,
                receivers,
            })
            .collect()
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn n_procs(&self) -> usize {
        self.n_procs
    }

    fn send(&self, to: usize, data: Vec<f64>) -> LfResult<()> {
        let sender = self
            .senders
            .get(to)
            .and_then(|s| s.as_ref())
            .ok_or_else(|| LfError::communication(self.rank, format!("无效的目标 rank {}", to)))?;
        sender
            .lock()
            .send(data)
            .map_err(|_| LfError::communication(self.rank, format!("rank {} 已断开", to)))
    }

    fn recv(&self, from: usize) -> LfResult<Vec<f64>> {
        let receiver = self
            .receivers
            .get(from)
            .and_then(|r| r.as_ref())
            .ok_or_else(|| LfError::communication(self.rank, format!("无效的源 rank {}", from)))?;
        receiver
            .lock()
            .recv()
            .map_err(|_| LfError::communication(self.rank, format!("rank {} 已断开", from)))
    }
}
