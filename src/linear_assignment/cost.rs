use crate::linear_assignment::error::{AssignmentError, AssignmentResult};
use num_traits::{Bounded, CheckedAdd, CheckedMul, CheckedSub, FromPrimitive, NumAssign};
use std::fmt::Debug;
use std::ops::Neg;

/// Numeric bound shared by every solver: a signed primitive integer.
pub trait Cost: NumAssign + Neg<Output = Self> + Ord + Copy + Bounded + CheckedAdd + CheckedSub + CheckedMul + FromPrimitive + Debug + 'static {}

impl<T> Cost for T where T: NumAssign + Neg<Output = T> + Ord + Copy + Bounded + CheckedAdd + CheckedSub + CheckedMul + FromPrimitive + Debug + 'static {}

/// Sentinel stored in a matrix cell whose pairing is disallowed.
#[inline]
pub fn infeasible<C: Cost>() -> C {
    C::max_value()
}

#[inline]
pub fn is_infeasible<C: Cost>(cost: C) -> bool {
    cost == C::max_value()
}

/// A matrix cell as the solvers see it. The sentinel never reaches solver arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Entry<C> {
    Finite(C),
    Infeasible,
    Padding,
}

impl<C> Entry<C>
where
    C: Cost,
{
    /// `None` is an absent edge. Padding costs a constant zero: every padded line is matched
    /// exactly once, so the constant never changes which real pairs win.
    #[inline]
    pub fn working_cost(self) -> Option<C> {
        match self {
            Entry::Finite(cost) => Some(cost),
            Entry::Padding => Some(C::zero()),
            Entry::Infeasible => None,
        }
    }
}

// dual potentials and path costs stay within a small multiple of n * max_cost
pub(crate) fn check_headroom<C: Cost>(max_cost: C, n: usize) -> AssignmentResult<()> {
    let factor = n
        .checked_mul(4)
        .and_then(|f| f.checked_add(4))
        .and_then(C::from_usize)
        .ok_or_else(|| AssignmentError::NumericOverflow(format!("size {} does not fit the cost type", n)))?;

    match max_cost.checked_mul(&factor) {
        Some(_) => Ok(()),
        None => Err(AssignmentError::NumericOverflow(format!("largest cost {:?} leaves no headroom for size {}", max_cost, n))),
    }
}
