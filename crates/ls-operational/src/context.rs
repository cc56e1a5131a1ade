//! Read-only state shared by every planning call.

use ls_core::PlannerConfig;
use ls_network::LaneNetwork;

/// The lane network and planner tunables, borrowed for one planning call.
///
/// Built by [`OperationalPlanBuilder`](crate::OperationalPlanBuilder) on each
/// call and passed down to the path builders and the lane-change tracker.
#[derive(Copy, Clone)]
pub struct PlanningContext<'a> {
    pub network: &'a LaneNetwork,
    pub config:  &'a PlannerConfig,
}

impl<'a> PlanningContext<'a> {
    #[inline]
    pub fn new(network: &'a LaneNetwork, config: &'a PlannerConfig) -> Self {
        Self { network, config }
    }
}
