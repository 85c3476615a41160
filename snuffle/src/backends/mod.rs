//======================================================================
// src/backends/mod.rs
// Keystream engine tiers and the dispatcher that picks one per core.
//======================================================================

use crate::rounds::Rounds;
use crate::state::CipherState;
use crate::variant::Variant;
use cfg_if::cfg_if;
use cipher::consts::U64;
use cipher::StreamClosure;

pub(crate) mod soft;

cfg_if! {
    if #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(snuffle_force_soft)))] {
        mod avx2;
        mod simd;
        mod sse2;

        cpufeatures::new!(avx2_cpuid, "avx2");
        cpufeatures::new!(sse2_cpuid, "sse2");
    }
}

/// Keystream engine width. Every tier produces identical bytes; they differ
/// only in how many blocks one call generates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BackendTier {
    /// Portable `u32` arithmetic, one block per call.
    Scalar,
    /// 128-bit SSE2 registers, four blocks per call.
    Vector128,
    /// 256-bit AVX2 registers, eight blocks per call.
    Vector256,
}

impl BackendTier {
    /// All tiers, narrowest first.
    pub const ALL: [BackendTier; 3] = [
        BackendTier::Scalar,
        BackendTier::Vector128,
        BackendTier::Vector256,
    ];

    /// The widest tier the running CPU supports.
    ///
    /// Feature detection is cached by `cpufeatures`, so repeated calls are
    /// cheap and always agree.
    pub fn detect() -> Self {
        #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(snuffle_force_soft)))]
        {
            if avx2_cpuid::get() {
                return BackendTier::Vector256;
            }
            if sse2_cpuid::get() {
                return BackendTier::Vector128;
            }
        }
        BackendTier::Scalar
    }

    /// Whether this tier can run on the current CPU.
    pub fn is_supported(self) -> bool {
        self <= Self::detect()
    }

    /// Blocks generated per engine call.
    pub const fn par_blocks(self) -> usize {
        match self {
            BackendTier::Scalar => 1,
            BackendTier::Vector128 => 4,
            BackendTier::Vector256 => 8,
        }
    }

    /// Clamps `self` to the widest tier the CPU supports, logging the
    /// fallback when one happens.
    pub fn resolve(self) -> Self {
        let available = Self::detect();
        if self > available {
            tracing::debug!(requested = ?self, selected = ?available, "keystream backend unavailable, falling back");
            available
        } else {
            self
        }
    }
}

/// Runs `f` against the engine for `tier`.
///
/// `tier` must have come through [`BackendTier::resolve`].
#[inline]
pub(crate) fn process<V, R, F>(tier: BackendTier, state: &mut CipherState, f: F)
where
    V: Variant,
    R: Rounds,
    F: StreamClosure<BlockSize = U64>,
{
    match tier {
        #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(snuffle_force_soft)))]
        // SAFETY: resolved tiers never exceed the detected CPU features.
        BackendTier::Vector256 => unsafe { avx2::inner::<V, R, F>(state, f) },
        #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(snuffle_force_soft)))]
        // SAFETY: as above.
        BackendTier::Vector128 => unsafe { sse2::inner::<V, R, F>(state, f) },
        _ => f.call(&mut soft::Backend::<V, R>::new(state)),
    }
}
