//! Host resource monitoring around a benchmark session.
//!
//! The monitor captures one snapshot of /proc counters when constructed and
//! a second one when stopped, then derives utilization deltas: CPU load,
//! memory used, and disk read/write throughput. A counter source that cannot
//! be read degrades to an explicit `None` sample and flips the `degraded`
//! flag in the derived metrics; the monitor itself never fails a run.

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Aggregate CPU tick counters from the `cpu ` line of /proc/stat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuTimes {
    pub total: f64,
    pub idle: f64,
}

/// Cumulative bytes moved through storage-like block devices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskCounters {
    pub read_bytes: u64,
    pub written_bytes: u64,
}

/// Total and used memory in kB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemInfo {
    pub total_kb: u64,
    pub used_kb: u64,
}

/// One point-in-time sample of all counter sources. A `None` field marks a
/// source that was unavailable when the sample was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub taken_at_secs: f64,
    pub cpu: Option<CpuTimes>,
    pub disk: Option<DiskCounters>,
    pub mem: Option<MemInfo>,
}

impl Snapshot {
    /// Capture the current counters. Unreadable sources become `None`.
    pub fn capture() -> Self {
        let taken_at_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let cpu = read_proc("/proc/stat").as_deref().and_then(parse_cpu_times);
        let disk = read_proc("/proc/diskstats").as_deref().and_then(parse_diskstats);
        let mem = read_proc("/proc/meminfo").as_deref().and_then(parse_meminfo);
        Self {
            taken_at_secs,
            cpu,
            disk,
            mem,
        }
    }
}

fn read_proc(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!("Counter source {path} unavailable: {e}");
            None
        }
    }
}

/// Parse the aggregate `cpu ` line of /proc/stat. Load is later derived as
/// `(Δtotal - Δidle) / Δtotal`, with idle at field 4.
pub fn parse_cpu_times(content: &str) -> Option<CpuTimes> {
    let line = content
        .lines()
        .find(|line| line.starts_with("cpu "))?;
    let values: Vec<f64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|v| v.parse().ok())
        .collect();
    if values.len() < 4 {
        return None;
    }
    Some(CpuTimes {
        total: values.iter().sum(),
        idle: values[3],
    })
}

/// Sum sectors read/written (fields 6 and 10 of /proc/diskstats) across
/// storage-like devices, converted to bytes at 512 bytes per sector.
pub fn parse_diskstats(content: &str) -> Option<DiskCounters> {
    let mut read_sectors = 0u64;
    let mut write_sectors = 0u64;
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue;
        }
        if !is_storage_device(parts[2]) {
            continue;
        }
        read_sectors += parts[5].parse::<u64>().unwrap_or(0);
        write_sectors += parts[9].parse::<u64>().unwrap_or(0);
    }
    Some(DiskCounters {
        read_bytes: read_sectors * 512,
        written_bytes: write_sectors * 512,
    })
}

fn is_storage_device(name: &str) -> bool {
    ["nvme", "sd", "vd", "xvd"].iter().any(|p| name.contains(p))
}

/// Parse MemTotal/MemAvailable out of /proc/meminfo.
pub fn parse_meminfo(content: &str) -> Option<MemInfo> {
    let mut total_kb = None;
    let mut available_kb = None;
    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            total_kb = line.split_whitespace().nth(1).and_then(|v| v.parse().ok());
        } else if line.starts_with("MemAvailable:") {
            available_kb = line.split_whitespace().nth(1).and_then(|v| v.parse().ok());
        }
    }
    let total_kb: u64 = total_kb?;
    let available_kb: u64 = available_kb?;
    Some(MemInfo {
        total_kb,
        used_kb: total_kb.saturating_sub(available_kb),
    })
}

/// Derived utilization for the sampled interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemMetrics {
    pub cpu_load_percent: f64,
    pub memory_used_gb: f64,
    pub disk_read_mb_s: f64,
    pub disk_write_mb_s: f64,
    /// True when one or more counter sources were unavailable in either
    /// snapshot; the affected values read as zero.
    pub degraded: bool,
}

/// Two-snapshot resource monitor for one benchmark session.
pub struct ResourceMonitor {
    start: Snapshot,
    end: Option<Snapshot>,
}

impl ResourceMonitor {
    /// Capture the starting snapshot.
    pub fn start() -> Self {
        Self {
            start: Snapshot::capture(),
            end: None,
        }
    }

    /// Capture the ending snapshot. Later calls keep the first one.
    pub fn stop(&mut self) {
        if self.end.is_none() {
            self.end = Some(Snapshot::capture());
        }
    }

    /// Derive metrics from the two snapshots, stopping first if needed.
    pub fn metrics(&mut self) -> SystemMetrics {
        let end = self.end.get_or_insert_with(Snapshot::capture);
        derive_metrics(&self.start, end)
    }
}

/// Compute utilization deltas between two snapshots.
///
/// A non-positive measured duration clamps to one second so throughput never
/// divides by zero; a non-positive CPU tick delta reads as zero load.
pub fn derive_metrics(start: &Snapshot, end: &Snapshot) -> SystemMetrics {
    let mut elapsed = end.taken_at_secs - start.taken_at_secs;
    if elapsed <= 0.0 {
        elapsed = 1.0;
    }

    let cpu_load_percent = match (&start.cpu, &end.cpu) {
        (Some(a), Some(b)) => {
            let delta_total = b.total - a.total;
            let delta_idle = b.idle - a.idle;
            if delta_total > 0.0 {
                100.0 * (1.0 - delta_idle / delta_total)
            } else {
                0.0
            }
        }
        _ => 0.0,
    };

    let (read_bytes, written_bytes) = match (&start.disk, &end.disk) {
        (Some(a), Some(b)) => (
            b.read_bytes.saturating_sub(a.read_bytes),
            b.written_bytes.saturating_sub(a.written_bytes),
        ),
        _ => (0, 0),
    };

    let memory_used_gb = end
        .mem
        .map(|m| m.used_kb as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0);

    let degraded = start.cpu.is_none()
        || start.disk.is_none()
        || start.mem.is_none()
        || end.cpu.is_none()
        || end.disk.is_none()
        || end.mem.is_none();

    const MIB: f64 = 1024.0 * 1024.0;
    SystemMetrics {
        cpu_load_percent: round2(cpu_load_percent),
        memory_used_gb: round2(memory_used_gb),
        disk_read_mb_s: round2(read_bytes as f64 / elapsed / MIB),
        disk_write_mb_s: round2(written_bytes as f64 / elapsed / MIB),
        degraded,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
