/*
    ArcProp, orbit propagation and reference frame engine
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::time::{Duration, Unit};

use typed_builder::TypedBuilder;

/// PropOpts stores the integrator options: the fixed integration sub-step and an optional cancellation flag.
///
/// Setting the cancellation flag to `true` from another thread stops the propagation before the next sub-step.
#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct PropOpts {
    #[builder(default = 15.0 * Unit::Second)]
    pub step: Duration,
    #[builder(default, setter(strip_option))]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl PropOpts {
    /// `with_fixed_step` initializes an `PropOpts` with the provided integration step.
    pub fn with_fixed_step(step: Duration) -> Self {
        Self { step, cancel: None }
    }

    pub fn with_fixed_step_s(step: f64) -> Self {
        Self::with_fixed_step(step * Unit::Second)
    }

    /// Returns a string with the information about these options
    pub fn info(&self) -> String {
        format!("{self}")
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

impl fmt::Display for PropOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixed step: {}", self.step)
    }
}

impl Default for PropOpts {
    /// `default` returns the options with a 15 second step.
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod ut_opts {
    use super::*;

    #[test]
    fn test_options() {
        let opts = PropOpts::default();
        assert_eq!(opts.step, 15.0 * Unit::Second);
        assert!(!opts.is_cancelled());

        let flag = Arc::new(AtomicBool::new(false));
        let opts = PropOpts::builder()
            .step(1.0 * Unit::Minute)
            .cancel(flag.clone())
            .build();
        assert_eq!(opts.step, 60.0 * Unit::Second);
        flag.store(true, Ordering::Relaxed);
        assert!(opts.is_cancelled());

        assert_eq!(PropOpts::with_fixed_step_s(10.0).step, 10.0 * Unit::Second);
    }
}
