/// Per-process CPU time split, in seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuTimes {
    pub user: f64,
    pub system: f64,
}

/// User and system CPU time consumed by the process so far, via
/// `getrusage(2)`. Returns zeros if the query fails.
pub fn process_cpu_times() -> CpuTimes {
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return CpuTimes::default();
    }

    CpuTimes {
        user: timeval_seconds(usage.ru_utime),
        system: timeval_seconds(usage.ru_stime),
    }
}

fn timeval_seconds(tv: libc::timeval) -> f64 {
    tv.tv_sec as f64 + tv.tv_usec as f64 * 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_times_are_sane() {
        // burn a little user time so the counter is visibly non-negative
        let mut acc = 0.0f64;
        for i in 0..200_000 {
            acc += (i as f64).sqrt();
        }
        assert!(acc > 0.0);

        let times = process_cpu_times();
        assert!(times.user >= 0.0);
        assert!(times.system >= 0.0);
        assert!(times.user < 3600.0);
    }
}
