use tracing::warn;

/// Resolves a `--threads` spec ("auto" or a count) and sizes the global rayon pool.
///
/// Returns the number of worker threads in effect.
pub fn configure_threads(spec: &str) -> usize {
    let count = if spec.eq_ignore_ascii_case("auto") {
        num_cpus::get()
    } else {
        match spec.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                warn!("invalid thread count '{spec}'; using all cores");
                num_cpus::get()
            }
        }
    };
    #[cfg(feature = "parallel")]
    {
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(count)
            .build_global();
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_count_is_kept() {
        assert_eq!(configure_threads("1"), 1);
    }

    #[test]
    fn garbage_falls_back_to_cores() {
        assert_eq!(configure_threads("many"), num_cpus::get());
        assert_eq!(configure_threads("0"), num_cpus::get());
        assert_eq!(configure_threads("AUTO"), num_cpus::get());
    }
}
