//! Performance instrumentation for solver runs.
//!
//! Wraps a call with CPU-time and memory measurements so that instrumentation
//! stays at the call site instead of inside each algorithm. CPU time is used
//! rather than wall-clock time to keep measurements stable under system load.
//!
//! Both measurements are best-effort diagnostics. On non-Unix platforms the
//! process CPU clock is unavailable and the runtime is reported as 0; the
//! memory delta comes from the resident set size in `/proc/self/statm` and is
//! reported as 0 on non-Linux platforms. A memory delta may be negative when
//! the allocator returns pages between the two snapshots.

/// Result of a measured call.
#[derive(Debug, Clone)]
pub struct Measured<T> {
    pub value: T,
    /// CPU seconds consumed by the process during the call.
    pub runtime_seconds: f64,
    /// Resident-set delta in bytes across the call. May be negative.
    pub memory_delta_bytes: i64,
}

/// Run a closure, capturing CPU time and a resident-set delta around it.
pub fn measure<T>(f: impl FnOnce() -> T) -> Measured<T> {
    let memory_before = resident_set_bytes();
    let cpu_before = process_cpu_seconds();

    let value = f();

    let runtime_seconds = (process_cpu_seconds() - cpu_before).max(0.0);
    let memory_delta_bytes = resident_set_bytes() - memory_before;

    Measured {
        value,
        runtime_seconds,
        memory_delta_bytes,
    }
}

/// CPU time consumed by this process, in seconds.
#[cfg(unix)]
fn process_cpu_seconds() -> f64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // Falls back to 0 if the clock is unsupported; the measurement is
    // best-effort by contract.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return 0.0;
    }
    ts.tv_sec as f64 + ts.tv_nsec as f64 * 1e-9
}

#[cfg(not(unix))]
fn process_cpu_seconds() -> f64 {
    0.0
}

/// Current resident set size in bytes, 0 where unavailable.
#[cfg(target_os = "linux")]
fn resident_set_bytes() -> i64 {
    let Ok(statm) = std::fs::read_to_string("/proc/self/statm") else {
        return 0;
    };
    let pages: i64 = statm
        .split_whitespace()
        .nth(1)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as i64;
    pages * page_size
}

#[cfg(not(target_os = "linux"))]
fn resident_set_bytes() -> i64 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_passes_the_value_through() {
        let measured = measure(|| 21 * 2);
        assert_eq!(measured.value, 42);
    }

    #[test]
    fn runtime_is_never_negative() {
        let measured = measure(|| {
            let mut acc = 0u64;
            for i in 0..10_000u64 {
                acc = acc.wrapping_add(i * i);
            }
            acc
        });
        assert!(measured.runtime_seconds >= 0.0);
    }
}
