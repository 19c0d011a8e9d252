//! Per-thread allocation config for blocks created through the C ABI.

use std::cell::RefCell;

use tessel_block::BlockConfig;

use crate::status::TesselStatus;

thread_local! {
    /// Config applied by every allocating call on this thread.
    static CONFIG: RefCell<BlockConfig> = const { RefCell::new(BlockConfig::new()) };
}

/// Snapshot of this thread's config.
pub(crate) fn current() -> BlockConfig {
    CONFIG.with(|c| c.borrow().clone())
}

/// Set this thread's single-allocation budget in bytes; `0` removes it.
///
/// Affects `tessel_block_alloc`, `tessel_block_from_f64` and
/// `tessel_block_cast` calls made afterwards on the same thread.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_config_set_max_bytes(max_bytes: usize) -> i32 {
    ffi_guard!({
        let config = match max_bytes {
            0 => BlockConfig::new(),
            n => BlockConfig::with_max_bytes(n),
        };
        tracing::debug!(max_bytes = ?config.max_bytes, "set block allocation budget");
        CONFIG.with(|c| *c.borrow_mut() = config);
        TesselStatus::Ok as i32
    })
}

/// Read this thread's allocation budget into `*out` (`0` = unlimited).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_config_get_max_bytes(out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        write_out!(out, current().max_bytes.unwrap_or(0));
        TesselStatus::Ok as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_round_trips_per_thread() {
        let mut out = 1usize;
        assert_eq!(tessel_config_get_max_bytes(&mut out), 0);
        assert_eq!(out, 0);

        assert_eq!(tessel_config_set_max_bytes(64), 0);
        assert_eq!(tessel_config_get_max_bytes(&mut out), 0);
        assert_eq!(out, 64);
        assert_eq!(current().max_bytes, Some(64));

        let other = std::thread::spawn(|| current().max_bytes).join().unwrap();
        assert_eq!(other, None);

        assert_eq!(tessel_config_set_max_bytes(0), 0);
        assert_eq!(current(), BlockConfig::default());
    }

    #[test]
    fn null_out_is_rejected() {
        assert_eq!(
            tessel_config_get_max_bytes(std::ptr::null_mut()),
            TesselStatus::InvalidArgument as i32
        );
    }
}
